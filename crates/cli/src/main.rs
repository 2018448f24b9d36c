use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ragdesk_extractor::DocumentKind;
use std::path::PathBuf;

mod commands;
mod config;

use config::RagConfig;

#[derive(Parser)]
#[command(name = "ragdesk")]
#[command(about = "Ask questions about your documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (default: ./ragdesk.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector store directory (overrides RAGDESK_STORE_DIR)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Embedding backend: hash|openai (overrides RAGDESK_EMBEDDING_MODE)
    #[arg(long, global = true)]
    embed_mode: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy documents into the uploads directory and index them
    Ingest(IngestArgs),

    /// Answer a question from the indexed documents
    Ask(AskArgs),

    /// Show the chunks nearest to a query
    Search(SearchArgs),

    /// Show what the store holds
    Status(StatusArgs),

    /// Delete the persisted store
    Reset,
}

#[derive(Args)]
struct IngestArgs {
    /// Documents to ingest
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Document kind (txt|pdf); inferred from the extension when omitted
    #[arg(long)]
    kind: Option<DocumentKind>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    question: String,

    /// Chunks of context to retrieve
    #[arg(long, short = 'k')]
    top_k: Option<usize>,
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    /// Number of results
    #[arg(short = 'k', long, default_value_t = ragdesk_search::DEFAULT_TOP_K)]
    limit: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = RagConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(dir) = cli.store_dir {
        config.store.dir = dir;
    }
    if let Some(mode) = &cli.embed_mode {
        config.embedding.mode = ragdesk_vector_store::EmbeddingMode::parse(mode)?;
    }

    if let Commands::Ask(AskArgs {
        top_k: Some(top_k), ..
    }) = &cli.command
    {
        config.retrieval.top_k = *top_k;
    }
    config.validate()?;

    match cli.command {
        Commands::Ingest(args) => {
            commands::run_ingest(&config, &args.files, args.kind, args.json).await?;
        }
        Commands::Ask(args) => commands::run_ask(&config, &args.question).await?,
        Commands::Search(args) => {
            commands::run_search(&config, &args.query, args.limit, args.json).await?;
        }
        Commands::Status(args) => commands::run_status(&config, args.json).await?,
        Commands::Reset => commands::run_reset(&config).await?,
    }

    Ok(())
}
