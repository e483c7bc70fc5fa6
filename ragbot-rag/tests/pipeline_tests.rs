//! End-to-end tests for index build, collection access, and retrieval.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragbot_rag::{
    CollectionMetadata, DistanceMetric, EmbeddingProvider, HashEmbeddingProvider,
    InMemoryVectorStore, RagConfig, RagError, RagPipeline, VectorStore,
};

/// Hash embedder that counts how many batches it was asked to embed.
struct CountingEmbedder {
    inner: HashEmbeddingProvider,
    batches: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    fn new(dimensions: usize, batches: Arc<AtomicUsize>) -> Self {
        Self { inner: HashEmbeddingProvider::new(dimensions), batches }
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> ragbot_rag::Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Hash embedder reporting another model's name at the same length.
struct RenamedEmbedder {
    inner: HashEmbeddingProvider,
    name: &'static str,
}

#[async_trait]
impl EmbeddingProvider for RenamedEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> ragbot_rag::Result<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.name
    }
}

fn config(root: &Path) -> RagConfig {
    RagConfig::builder()
        .corpus_dir(root.join("data"))
        .index_dir(root.join("index"))
        .build()
        .unwrap()
}

fn pipeline(config: RagConfig, dims: usize, batches: &Arc<AtomicUsize>) -> RagPipeline {
    RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(CountingEmbedder::new(dims, batches.clone())))
        .build()
        .unwrap()
}

fn write_corpus(root: &Path, files: &[(&str, &str)]) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    for (name, text) in files {
        fs::write(data.join(name), text).unwrap();
    }
}

#[tokio::test]
async fn hello_world_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", &"hello world".repeat(100))]);
    let batches = Arc::new(AtomicUsize::new(0));

    let built = pipeline(config(temp.path()), 64, &batches).build_index().await.unwrap();
    assert!(built.count().await.unwrap() >= 2);
    assert_eq!(batches.load(Ordering::SeqCst), 1);

    // A fresh process opens the persisted index without rebuilding.
    let fresh = pipeline(config(temp.path()), 64, &batches);
    let collection = fresh.get_collection().await.unwrap();
    assert_eq!(batches.load(Ordering::SeqCst), 1);
    assert_eq!(collection.count().await.unwrap(), built.count().await.unwrap());

    let retrieval = fresh.retrieve("hello", &collection, Some(1)).await.unwrap();
    assert_eq!(retrieval.results.len(), 1);
    assert_eq!(retrieval.results[0].source, "a.txt");
}

#[tokio::test]
async fn two_document_corpus_returns_k_ranked_results() {
    let temp = tempfile::tempdir().unwrap();
    let rust = "Rust guarantees memory safety through ownership and the borrow checker. ".repeat(12);
    let python = "Python manages memory with reference counting and a garbage collector. ".repeat(12);
    write_corpus(temp.path(), &[("rust.md", &rust), ("python.txt", &python)]);
    let batches = Arc::new(AtomicUsize::new(0));

    let pipeline = pipeline(config(temp.path()), 384, &batches);
    let collection = pipeline.build_index().await.unwrap();
    let total = collection.count().await.unwrap();
    assert!(total >= 4);

    for k in 1..=total {
        let retrieval = pipeline.retrieve("borrow checker", &collection, Some(k)).await.unwrap();
        assert_eq!(retrieval.results.len(), k);
        for pair in retrieval.results.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }

    let top = pipeline.retrieve("borrow checker ownership", &collection, Some(1)).await.unwrap();
    assert_eq!(top.results[0].source, "rust.md");
}

#[tokio::test]
async fn records_are_keyed_and_ordered_per_source() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("b.txt", &"b ".repeat(700)), ("a.txt", &"a ".repeat(700))]);
    let batches = Arc::new(AtomicUsize::new(0));
    let cfg = RagConfig::builder()
        .corpus_dir(temp.path().join("data"))
        .index_dir(temp.path().join("index"))
        .chunk_size(600)
        .chunk_overlap(100)
        .build()
        .unwrap();

    let pipeline = pipeline(cfg, 16, &batches);
    let collection = pipeline.build_index().await.unwrap();
    let hits = collection.query(&vec![0.0; 16], 100).await.unwrap();

    let mut ids: Vec<String> = hits.iter().map(|h| h.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, ["a.txt_0", "a.txt_1", "a.txt_2", "b.txt_0", "b.txt_1", "b.txt_2"]);
    for hit in &hits {
        assert_eq!(hit.id, format!("{}_{}", hit.metadata.source, hit.metadata.chunk_id));
    }
}

#[tokio::test]
async fn get_collection_builds_missing_index() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", "some text about indexing")]);
    let batches = Arc::new(AtomicUsize::new(0));

    let collection = pipeline(config(temp.path()), 32, &batches).get_collection().await.unwrap();
    assert_eq!(batches.load(Ordering::SeqCst), 1);
    assert_eq!(collection.count().await.unwrap(), 1);
    assert!(temp.path().join("index").join("rag").join("collection.json").exists());
}

#[tokio::test]
async fn corrupt_index_is_reported_not_rebuilt() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", "text")]);
    let collection_dir = temp.path().join("index").join("rag");
    fs::create_dir_all(&collection_dir).unwrap();
    fs::write(collection_dir.join("collection.json"), "[1, 2").unwrap();
    let batches = Arc::new(AtomicUsize::new(0));

    let err = pipeline(config(temp.path()), 32, &batches).get_collection().await.unwrap_err();
    assert!(matches!(err, RagError::CorruptCollection { .. }), "{err:?}");
    assert_eq!(batches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn index_from_another_model_is_a_dimension_mismatch() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", "text")]);
    let batches = Arc::new(AtomicUsize::new(0));
    pipeline(config(temp.path()), 32, &batches).build_index().await.unwrap();

    let err = pipeline(config(temp.path()), 64, &batches).get_collection().await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 64, actual: 32 }));
}

#[tokio::test]
async fn index_from_another_model_of_equal_length_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", "text")]);
    let batches = Arc::new(AtomicUsize::new(0));
    pipeline(config(temp.path()), 384, &batches).build_index().await.unwrap();

    let other = RagPipeline::builder()
        .config(config(temp.path()))
        .embedding_provider(Arc::new(RenamedEmbedder {
            inner: HashEmbeddingProvider::new(384),
            name: "all-minilm",
        }))
        .build()
        .unwrap();

    let err = other.get_collection().await.unwrap_err();
    match err {
        RagError::EmbeddingModelMismatch { stored, current } => {
            assert_eq!(stored, "hash-384");
            assert_eq!(current, "all-minilm");
        }
        other => panic!("expected model mismatch, got {other:?}"),
    }
    // The stored index is left as it was.
    let original = pipeline(config(temp.path()), 384, &batches).get_collection().await.unwrap();
    assert_eq!(original.metadata().embedding_model, "hash-384");
    assert_eq!(batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn build_reports_configuration_errors() {
    let temp = tempfile::tempdir().unwrap();
    let batches = Arc::new(AtomicUsize::new(0));

    let err = pipeline(config(temp.path()), 8, &batches).build_index().await.unwrap_err();
    assert!(matches!(err, RagError::CorpusNotFound { .. }));

    write_corpus(temp.path(), &[("skip.csv", "a,b"), ("blank.md", "   ")]);
    let err = pipeline(config(temp.path()), 8, &batches).build_index().await.unwrap_err();
    assert!(matches!(err, RagError::NoDocuments { .. }));
    assert_eq!(batches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rebuild_replaces_previous_records() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("a.txt", "first"), ("b.txt", "second")]);
    let batches = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline(config(temp.path()), 16, &batches);

    assert_eq!(pipeline.build_index().await.unwrap().count().await.unwrap(), 2);

    fs::remove_file(temp.path().join("data").join("b.txt")).unwrap();
    let rebuilt = pipeline.build_index().await.unwrap();
    assert_eq!(rebuilt.count().await.unwrap(), 1);
    let hits = rebuilt.query(&vec![0.0; 16], 10).await.unwrap();
    assert_eq!(hits[0].metadata.source, "a.txt");
}

#[tokio::test]
async fn retrieve_defaults_and_validates_top_k() {
    let temp = tempfile::tempdir().unwrap();
    let files: Vec<(String, String)> =
        (0..6).map(|i| (format!("doc{i}.txt"), format!("document number {i}"))).collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(n, t)| (n.as_str(), t.as_str())).collect();
    write_corpus(temp.path(), &refs);
    let batches = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline(config(temp.path()), 32, &batches);
    let collection = pipeline.build_index().await.unwrap();

    let retrieval = pipeline.retrieve("document", &collection, None).await.unwrap();
    assert_eq!(retrieval.results.len(), 4);

    let err = pipeline.retrieve("document", &collection, Some(0)).await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn empty_collection_yields_empty_results() {
    let temp = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let metadata = CollectionMetadata::new(16, DistanceMetric::SquaredL2, "hash-16");
    store.create_collection("rag", &metadata).await.unwrap();

    let pipeline = RagPipeline::builder()
        .config(config(temp.path()))
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(16)))
        .vector_store(store)
        .build()
        .unwrap();

    let collection = pipeline.get_collection().await.unwrap();
    let retrieval = pipeline.retrieve("anything", &collection, Some(3)).await.unwrap();
    assert!(retrieval.results.is_empty());

    let prompt = pipeline.build_prompt("anything", &retrieval.results);
    assert!(prompt.contains("say you have no context"));
}

#[tokio::test]
async fn default_pipeline_uses_hash_embedder_and_file_store() {
    let temp = tempfile::tempdir().unwrap();
    write_corpus(temp.path(), &[("notes.md", "# Notes\n\nchunking splits documents")]);

    let pipeline = RagPipeline::from_config(config(temp.path())).unwrap();
    assert_eq!(pipeline.embedding_provider().dimensions(), 384);

    let collection = pipeline.get_collection().await.unwrap();
    assert_eq!(collection.metadata().embedding_model, "hash-384");
    let retrieval = pipeline.retrieve("chunking", &collection, None).await.unwrap();
    assert_eq!(retrieval.results.len(), 1);

    let prompt = pipeline.build_prompt("What does chunking do?", &retrieval.results);
    assert!(prompt.contains("[Source: notes.md | Chunk #0]"));
    assert!(prompt.ends_with("Answer (end with Sources: notes.md):"));
}
