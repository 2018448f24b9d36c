use async_trait::async_trait;
use pretty_assertions::assert_eq;
use ragdesk_chunker::ChunkerConfig;
use ragdesk_extractor::DocumentKind;
use ragdesk_indexer::{DocumentIndexer, IndexerOptions, IngestOutcome};
use ragdesk_vector_store::{
    Embedder, HashEmbedder, RestoreOutcome, StorePaths, VectorStore, VectorStoreError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DIM: usize = 32;

enum Behavior {
    Fail,
    WrongDimension,
    Hang,
}

struct BrokenEmbedder(Behavior);

#[async_trait]
impl Embedder for BrokenEmbedder {
    fn model_id(&self) -> &str {
        "broken"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed_batch(&self, texts: &[&str]) -> ragdesk_vector_store::Result<Vec<Vec<f32>>> {
        match self.0 {
            Behavior::Fail => Err(VectorStoreError::embedding("model offline")),
            Behavior::WrongDimension => Ok(texts.iter().map(|_| vec![0.0; DIM + 1]).collect()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![])
            }
        }
    }
}

async fn indexer_with(dir: &Path, embedder: Arc<dyn Embedder>) -> DocumentIndexer {
    let options = IndexerOptions {
        chunker: ChunkerConfig::default(),
        embed_timeout: Duration::from_millis(200),
    };
    let (indexer, _) = DocumentIndexer::open(dir, embedder, options)
        .await
        .expect("open indexer");
    indexer
}

async fn hash_indexer(dir: &Path) -> DocumentIndexer {
    indexer_with(dir, Arc::new(HashEmbedder::new(DIM))).await
}

async fn write_doc(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, body).await.expect("write doc");
    path
}

fn sample_text(len: usize) -> String {
    (0..len)
        .map(|i| if i % 7 == 6 { ' ' } else { char::from(b'a' + (i % 26) as u8) })
        .collect()
}

#[tokio::test]
async fn twelve_hundred_chars_index_as_three_chunks_and_persist() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = hash_indexer(&store_dir).await;
    let doc = write_doc(temp.path(), "long.txt", &sample_text(1200)).await;

    let outcome = indexer.ingest(&doc, DocumentKind::Text).await;
    assert_eq!(
        outcome,
        IngestOutcome::Indexed {
            source: "long.txt".into(),
            chunks: 3
        }
    );

    {
        let store = indexer.store();
        let store = store.read().await;
        let lengths: Vec<usize> = store.chunks().iter().map(|c| c.char_len()).collect();
        assert_eq!(lengths, vec![500, 500, 300]);
        assert!(store.chunks().iter().all(|c| c.source == "long.txt"));
    }

    let (reopened, outcome) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(outcome, RestoreOutcome::Loaded { chunks: 3 });
    assert_eq!(reopened.len(), 3);
}

#[tokio::test]
async fn unsupported_and_empty_documents_are_skipped() {
    let temp = TempDir::new().expect("tempdir");
    let indexer = hash_indexer(&temp.path().join("store")).await;
    let deck = write_doc(temp.path(), "deck.pptx", "slides").await;
    let blank = write_doc(temp.path(), "blank.txt", "").await;

    assert!(matches!(
        indexer.ingest_path(&deck).await,
        IngestOutcome::Skipped { .. }
    ));
    assert!(matches!(
        indexer.ingest_path(&blank).await,
        IngestOutcome::Skipped { .. }
    ));
    assert!(indexer.store().read().await.is_empty());
}

#[tokio::test]
async fn unreadable_document_fails_without_touching_the_store() {
    let temp = TempDir::new().expect("tempdir");
    let indexer = hash_indexer(&temp.path().join("store")).await;
    let good = write_doc(temp.path(), "good.txt", "some useful words").await;
    assert!(indexer.ingest_path(&good).await.is_indexed());

    let outcome = indexer
        .ingest(&temp.path().join("missing.txt"), DocumentKind::Text)
        .await;
    assert!(matches!(outcome, IngestOutcome::Failed { .. }));
    assert_eq!(indexer.store().read().await.len(), 1);
}

#[tokio::test]
async fn embedding_failures_leave_store_and_disk_untouched() {
    for behavior in [Behavior::Fail, Behavior::WrongDimension, Behavior::Hang] {
        let temp = TempDir::new().expect("tempdir");
        let store_dir = temp.path().join("store");
        let indexer = indexer_with(&store_dir, Arc::new(BrokenEmbedder(behavior))).await;
        let doc = write_doc(temp.path(), "doc.txt", "hello there").await;

        let outcome = indexer.ingest_path(&doc).await;
        assert!(matches!(outcome, IngestOutcome::Failed { .. }), "{outcome}");
        assert!(indexer.store().read().await.is_empty());
        assert!(!StorePaths::new(&store_dir).index.exists());
    }
}

#[tokio::test]
async fn failed_persist_rolls_back_the_append() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = hash_indexer(&store_dir).await;
    let first = write_doc(temp.path(), "first.txt", "first document").await;
    assert!(indexer.ingest_path(&first).await.is_indexed());

    // A directory squatting on the temp file makes the next persist fail.
    let squatter = store_dir.join("index.bin.tmp");
    tokio::fs::create_dir_all(&squatter).await.expect("squat");

    let second = write_doc(temp.path(), "second.txt", "second document").await;
    let outcome = indexer.ingest_path(&second).await;
    assert!(matches!(outcome, IngestOutcome::Failed { .. }), "{outcome}");
    assert_eq!(indexer.store().read().await.len(), 1);

    tokio::fs::remove_dir(&squatter).await.expect("unsquat");
    let (reopened, _) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.chunks()[0].source, "first.txt");
}

#[tokio::test]
async fn failed_chunk_list_write_keeps_the_previous_pair() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = hash_indexer(&store_dir).await;
    let first = write_doc(temp.path(), "first.txt", "first document").await;
    assert!(indexer.ingest_path(&first).await.is_indexed());

    // The index blob stages fine; the chunk list cannot.
    let squatter = store_dir.join("chunks.json.tmp");
    tokio::fs::create_dir_all(&squatter).await.expect("squat");

    let second = write_doc(temp.path(), "second.txt", "second document").await;
    let outcome = indexer.ingest_path(&second).await;
    assert!(matches!(outcome, IngestOutcome::Failed { .. }), "{outcome}");
    assert_eq!(indexer.store().read().await.len(), 1);

    let (reopened, restored) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(restored, RestoreOutcome::Loaded { chunks: 1 });
    assert_eq!(reopened.chunks()[0].source, "first.txt");
    assert!(!store_dir.join("index.bin.tmp").exists());

    tokio::fs::remove_dir(&squatter).await.expect("unsquat");
    let third = write_doc(temp.path(), "third.txt", "third document").await;
    assert!(indexer.ingest_path(&third).await.is_indexed());
    let (reopened, _) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(reopened.len(), 2);
}

#[tokio::test]
async fn concurrent_ingestions_do_not_clobber_each_other() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = Arc::new(hash_indexer(&store_dir).await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let doc = write_doc(temp.path(), &format!("doc{i}.txt"), &format!("document {i}")).await;
        let indexer = indexer.clone();
        handles.push(tokio::spawn(async move { indexer.ingest_path(&doc).await }));
    }
    for handle in handles {
        assert!(handle.await.expect("join").is_indexed());
    }

    let (reopened, _) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(reopened.len(), 8);
    assert_eq!(reopened.sources().len(), 8);
}

#[tokio::test]
async fn second_writer_on_same_directory_keeps_first_writers_chunks() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let first = hash_indexer(&store_dir).await;
    let second = hash_indexer(&store_dir).await;

    let a = write_doc(temp.path(), "a.txt", "alpha words").await;
    let b = write_doc(temp.path(), "b.txt", "beta words").await;
    assert!(first.ingest_path(&a).await.is_indexed());
    assert!(second.ingest_path(&b).await.is_indexed());

    let (reopened, _) = VectorStore::open(&store_dir, DIM).await;
    let sources: Vec<String> = reopened.sources().into_keys().collect();
    assert_eq!(sources, vec!["a.txt".to_string(), "b.txt".to_string()]);
}

#[tokio::test]
async fn reset_empties_store_and_disk() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = hash_indexer(&store_dir).await;
    let doc = write_doc(temp.path(), "doc.txt", "to be forgotten").await;
    assert!(indexer.ingest_path(&doc).await.is_indexed());

    indexer.reset().await.expect("reset");
    assert!(indexer.store().read().await.is_empty());
    let (_, outcome) = VectorStore::open(&store_dir, DIM).await;
    assert_eq!(outcome, RestoreOutcome::Fresh);
}

#[tokio::test]
async fn batch_ingest_reports_each_document_in_order() {
    let temp = TempDir::new().expect("tempdir");
    let store_dir = temp.path().join("store");
    let indexer = hash_indexer(&store_dir).await;
    let notes = write_doc(temp.path(), "notes.txt", &sample_text(1200)).await;
    let slides = write_doc(temp.path(), "slides.pptx", "not slides").await;
    let forced = write_doc(temp.path(), "readme.md", "plain text under another name").await;

    let report = indexer
        .ingest_all(&[
            (notes, None),
            (slides, None),
            (temp.path().join("gone.txt"), None),
            (forced, Some(DocumentKind::Text)),
        ])
        .await;

    let statuses: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.to_string())
        .collect();
    assert!(statuses[0].starts_with("indexed notes.txt (3 chunks)"));
    assert!(statuses[1].starts_with("skipped slides.pptx"));
    assert!(statuses[2].starts_with("failed gone.txt"));
    assert!(statuses[3].starts_with("indexed readme.md"));
    assert_eq!(
        (report.stats.indexed, report.stats.skipped, report.stats.failed),
        (2, 1, 1)
    );
    assert_eq!(report.stats.chunks, 4);
    assert_eq!(indexer.store().read().await.len(), 4);
}
