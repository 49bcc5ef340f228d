//! Knowledge store for retrieval-augmented replies.
//!
//! Documents are embedded through the OpenAI embeddings API and kept in a flat
//! index scanned exhaustively by L2 distance. The index is persisted as JSON so
//! it survives restarts. Without a usable OpenAI key the store is disabled:
//! ingestion indexes nothing and searches return no context.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::config::{KnowledgeConfig, OpenAiConfig};
use crate::pipeline::llm::is_plausible_key;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const INDEX_FILE: &str = "index.json";
const INDEX_TMP_FILE: &str = "index.json.tmp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    document: Document,
    vector: Vec<f32>,
}

/// Exhaustive L2 index.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    entries: Vec<Entry>,
}

impl FlatIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, document: Document, vector: Vec<f32>) -> usize {
        self.entries.push(Entry { document, vector });
        self.entries.len()
    }

    /// The `k` nearest documents, closest first. Vectors of another dimension are ignored.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&Document> {
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .filter(|e| e.vector.len() == query.len())
            .map(|e| (l2_squared(&e.vector, query), &e.document))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().take(k).map(|(_, doc)| doc).collect()
    }
}

fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Documents rendered as `[title]: content`, separated by blank lines.
pub fn format_context(documents: &[&Document]) -> String {
    documents
        .iter()
        .map(|d| format!("[{}]: {}", d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// OpenAI embeddings client.
pub struct EmbeddingClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let resp = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": &self.model, "input": text }))
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EmbeddingError::Parse("No embedding in response".into()))
    }
}

pub struct KnowledgeStore {
    embedder: Option<EmbeddingClient>,
    index: RwLock<FlatIndex>,
    /// Serializes snapshot and file write so the newest index lands last.
    persist: tokio::sync::Mutex<()>,
    dir: PathBuf,
    top_k: usize,
}

impl KnowledgeStore {
    /// Open the store, loading a previously persisted index if one exists.
    pub fn open(config: &KnowledgeConfig, openai: &OpenAiConfig) -> Self {
        let embedder = is_plausible_key(&openai.api_key)
            .then(|| EmbeddingClient::new(openai.api_key.clone(), openai.embedding_model.clone()));
        if embedder.is_none() {
            tracing::warn!("No OpenAI key configured, knowledge search disabled");
        }

        let index = match load_index(&config.store_path) {
            Ok(Some(index)) => {
                tracing::info!(documents = index.len(), "Loaded knowledge index");
                index
            }
            Ok(None) => FlatIndex::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable knowledge index: {e}");
                FlatIndex::default()
            }
        };

        Self::with_index(embedder, index, config.store_path.clone(), config.top_k)
    }

    pub fn with_index(
        embedder: Option<EmbeddingClient>,
        index: FlatIndex,
        dir: PathBuf,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index: RwLock::new(index),
            persist: tokio::sync::Mutex::new(()),
            dir,
            top_k,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.embedder.is_some()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Embed and index a document. Returns the new index size, 0 when disabled.
    pub async fn ingest(&self, document: Document) -> Result<usize, KnowledgeError> {
        let Some(embedder) = &self.embedder else {
            tracing::warn!(title = %document.title, "Knowledge store disabled, skipping ingestion");
            return Ok(0);
        };

        let vector = embedder.embed(&document.content).await?;
        let title = document.title.clone();
        let size = self.insert(document, vector).await?;

        tracing::info!(title = %title, size, "Ingested document");
        Ok(size)
    }

    /// Add an embedded document and persist the whole index.
    ///
    /// The file is replaced by rename, so a crash leaves the previous index intact.
    async fn insert(&self, document: Document, vector: Vec<f32>) -> Result<usize, KnowledgeError> {
        let _persist = self.persist.lock().await;

        let (size, snapshot) = {
            let mut index = self.index.write();
            let size = index.add(document, vector);
            (size, serde_json::to_vec(&*index)?)
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self.dir.join(INDEX_TMP_FILE);
        tokio::fs::write(&tmp, snapshot).await?;
        tokio::fs::rename(&tmp, self.dir.join(INDEX_FILE)).await?;
        Ok(size)
    }

    /// Context for `query`: the nearest documents formatted for the model, or empty.
    pub async fn search(&self, query: &str) -> String {
        let Some(embedder) = &self.embedder else {
            return String::new();
        };
        if self.index.read().is_empty() {
            return String::new();
        }

        match embedder.embed(query).await {
            Ok(vector) => {
                let index = self.index.read();
                format_context(&index.search(&vector, self.top_k))
            }
            Err(e) => {
                tracing::error!("Knowledge search error: {e}");
                String::new()
            }
        }
    }
}

fn load_index(dir: &Path) -> Result<Option<FlatIndex>, KnowledgeError> {
    let path = dir.join(INDEX_FILE);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Failed to parse embedding response: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("Failed to persist index: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode index: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str) -> Document {
        Document {
            title: title.to_string(),
            content: format!("{title} content"),
            category: "general".to_string(),
        }
    }

    #[test]
    fn nearest_documents_come_first() {
        let mut index = FlatIndex::default();
        index.add(doc("far"), vec![10.0, 10.0]);
        index.add(doc("near"), vec![1.0, 1.0]);
        index.add(doc("middle"), vec![3.0, 3.0]);
        index.add(doc("wrong-dim"), vec![1.0]);

        let hits = index.search(&[0.0, 0.0], 2);
        let titles: Vec<&str> = hits.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["near", "middle"]);
    }

    #[test]
    fn context_format() {
        let a = doc("Returns");
        let b = doc("Shipping");
        assert_eq!(
            format_context(&[&a, &b]),
            "[Returns]: Returns content\n\n[Shipping]: Shipping content"
        );
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn index_survives_json() {
        let mut index = FlatIndex::default();
        index.add(doc("Returns"), vec![0.5, 0.25]);
        let bytes = serde_json::to_vec(&index).unwrap();
        let loaded: FlatIndex = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.search(&[0.5, 0.25], 1)[0].title, "Returns");
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voicebot-{name}-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_all_reach_disk() {
        let dir = temp_dir("knowledge-concurrent");
        let store = std::sync::Arc::new(KnowledgeStore::with_index(
            None,
            FlatIndex::default(),
            dir.clone(),
            3,
        ));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert(doc(&format!("doc-{i}")), vec![i as f32, 0.0]).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.len(), 16);
        let on_disk = load_index(&dir).unwrap().unwrap();
        assert_eq!(on_disk.len(), 16);
        assert!(!dir.join(INDEX_TMP_FILE).exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn persisted_index_reloads_on_open() {
        let dir = temp_dir("knowledge-reload");
        let store = KnowledgeStore::with_index(None, FlatIndex::default(), dir.clone(), 3);
        store.insert(doc("Returns"), vec![0.5, 0.25]).await.unwrap();
        // A stale temp file from an interrupted write is never read.
        std::fs::write(dir.join(INDEX_TMP_FILE), b"{ truncated").unwrap();

        let config = KnowledgeConfig {
            store_path: dir.clone(),
            ..KnowledgeConfig::default()
        };
        let reopened = KnowledgeStore::open(&config, &OpenAiConfig::default());
        assert_eq!(reopened.len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn disabled_store_ingests_nothing() {
        let store = KnowledgeStore::with_index(
            None,
            FlatIndex::default(),
            std::env::temp_dir().join("voicebot-disabled-store"),
            3,
        );
        assert!(!store.is_enabled());
        assert_eq!(store.ingest(doc("Returns")).await.unwrap(), 0);
        assert_eq!(store.len(), 0);
        assert_eq!(store.search("returns").await, "");
    }
}
