use crate::config::RagConfig;
use anyhow::{bail, Context, Result};
use ragdesk_extractor::DocumentKind;
use ragdesk_indexer::{DocumentIndexer, IndexerOptions};
use ragdesk_search::{Assistant, AssistantOptions, OpenAiCompleter};
use ragdesk_vector_store::{build_embedder, RestoreOutcome, SearchHit, VectorStore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct StatusReport {
    store_dir: PathBuf,
    dimension: usize,
    generation: u64,
    chunks: usize,
    sources: BTreeMap<String, usize>,
    restore: RestoreOutcome,
}

async fn open_indexer(config: &RagConfig) -> Result<DocumentIndexer> {
    let embedder = build_embedder(&config.embedding)?;
    let options = IndexerOptions {
        chunker: config.chunking,
        embed_timeout: Duration::from_secs(config.indexing.embed_timeout_secs),
    };
    let (indexer, outcome) = DocumentIndexer::open(&config.store.dir, embedder, options)
        .await
        .with_context(|| format!("Failed to open store {}", config.store.dir.display()))?;
    log_restore(&config.store.dir, &outcome);
    Ok(indexer)
}

async fn open_assistant(config: &RagConfig) -> Result<Assistant> {
    let indexer = open_indexer(config).await?;
    let completer = Arc::new(OpenAiCompleter::new(&config.completion)?);
    let options = AssistantOptions {
        top_k: config.retrieval.top_k,
        query_embed_timeout: Duration::from_secs(config.retrieval.embed_timeout_secs),
        completion_timeout: Duration::from_secs(config.completion.timeout_secs),
    };
    Ok(Assistant::new(indexer, completer, options))
}

fn log_restore(dir: &Path, outcome: &RestoreOutcome) {
    match outcome {
        RestoreOutcome::Fresh => log::info!("Starting a new store in {}", dir.display()),
        RestoreOutcome::Loaded { chunks } => {
            log::info!("Loaded {chunks} chunks from {}", dir.display());
        }
        RestoreOutcome::Reset { reason } => {
            log::warn!("Store in {} was reset: {reason}", dir.display());
        }
    }
}

/// Copy `path` into the uploads directory, returning the copy's path.
async fn stage_upload(uploads_dir: &Path, path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let target = uploads_dir.join(name);

    let same_file = match (
        tokio::fs::canonicalize(path).await,
        tokio::fs::canonicalize(&target).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_file {
        tokio::fs::copy(path, &target)
            .await
            .with_context(|| format!("Failed to copy {}", path.display()))?;
        log::debug!("Copied {} to {}", path.display(), target.display());
    }
    Ok(target)
}

pub async fn run_ingest(
    config: &RagConfig,
    files: &[PathBuf],
    kind: Option<DocumentKind>,
    json: bool,
) -> Result<()> {
    let uploads_dir = &config.store.uploads_dir;
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .with_context(|| format!("Failed to create {}", uploads_dir.display()))?;

    // A file that cannot be copied is ingested from where it is; a missing one then fails there.
    let mut batch = Vec::with_capacity(files.len());
    for file in files {
        let path = match stage_upload(uploads_dir, file).await {
            Ok(staged) => staged,
            Err(err) => {
                log::warn!("{err:#}");
                file.clone()
            }
        };
        batch.push((path, kind));
    }

    let indexer = open_indexer(config).await?;
    let report = indexer.ingest_all(&batch).await;
    let failed = report.stats.failed;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            println!("{outcome}");
        }
        let stats = &report.stats;
        println!(
            "{} indexed, {} skipped, {} failed ({} chunks, {} ms)",
            stats.indexed, stats.skipped, stats.failed, stats.chunks, stats.time_ms
        );
    }

    if failed > 0 {
        bail!("{failed} document(s) failed to ingest");
    }
    Ok(())
}

pub async fn run_ask(config: &RagConfig, question: &str) -> Result<()> {
    let assistant = open_assistant(config).await?;
    let answer = assistant.answer(question).await;
    println!("{answer}");
    Ok(())
}

pub async fn run_search(config: &RagConfig, query: &str, limit: usize, json: bool) -> Result<()> {
    let indexer = open_indexer(config).await?;
    let retriever = ragdesk_search::Retriever::new(indexer.store(), indexer.embedder())
        .with_embed_timeout(Duration::from_secs(config.retrieval.embed_timeout_secs));
    let hits = retriever.retrieve_scored(query, limit).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        println!("No results.");
    }
    for (rank, hit) in hits.iter().enumerate() {
        print_hit(rank + 1, hit);
    }
    Ok(())
}

fn print_hit(rank: usize, hit: &SearchHit) {
    println!("{rank}. {} (distance {:.4})", hit.chunk.source, hit.distance);
    let preview: String = hit.chunk.text.chars().take(200).collect();
    println!("   {}", preview.replace('\n', " "));
}

pub async fn run_status(config: &RagConfig, json: bool) -> Result<()> {
    let dir = &config.store.dir;
    let (store, restore) = VectorStore::open(dir, config.embedding.dimension).await;
    let report = StatusReport {
        store_dir: dir.clone(),
        dimension: store.dimension(),
        generation: store.generation(),
        chunks: store.len(),
        sources: store.sources(),
        restore,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Store:      {}", report.store_dir.display());
    println!("Dimension:  {}", report.dimension);
    println!("Generation: {}", report.generation);
    println!("Chunks:     {}", report.chunks);
    for (source, count) in &report.sources {
        println!("  {source}: {count}");
    }
    if let RestoreOutcome::Reset { reason } = &report.restore {
        println!("Note: stored artifacts were unusable ({reason})");
    }
    Ok(())
}

pub async fn run_reset(config: &RagConfig) -> Result<()> {
    let indexer = open_indexer(config).await?;
    indexer.reset().await?;
    println!("Store in {} reset.", config.store.dir.display());
    Ok(())
}
