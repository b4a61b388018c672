//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. The `video_id`
//! filter is applied in SQL, so other videos' rows are never loaded for a search.

use super::{cosine_similarity, rank, Document, IndexedVideo, SearchFilter, SearchResult, VectorStore};
use crate::error::{Result, VidchatError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        video_id TEXT NOT NULL,
        content TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_video_id ON documents(video_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets readers proceed while a batch insert is running
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VidchatError::Index(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let indexed_at_str: String = row.get(5)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            video_id: row.get(1)?,
            content: row.get(2)?,
            chunk_order: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: Self::parse_timestamp(&indexed_at_str),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn add_documents(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            tx.execute(
                r#"
                INSERT INTO documents (id, video_id, content, chunk_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    doc.id.to_string(),
                    doc.video_id,
                    doc.content,
                    doc.chunk_order,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Inserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, video_id, content, chunk_order, embedding, indexed_at
            FROM documents
            WHERE video_id = ?1
            "#,
        )?;

        let docs = stmt.query_map(params![filter.video_id], Self::row_to_document)?;

        let results: Vec<SearchResult> = docs
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc,
            })
            .collect();

        let results = rank(results, k);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM documents WHERE video_id = ?1", params![video_id])?;

        info!("Deleted {} documents for video {}", deleted, video_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT video_id, COUNT(*) as chunk_count, MAX(indexed_at) as indexed_at
            FROM documents
            GROUP BY video_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let videos = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(IndexedVideo {
                video_id: row.get(0)?,
                chunk_count: row.get(1)?,
                indexed_at: Self::parse_timestamp(&indexed_at_str),
            })
        })?;

        Ok(videos.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn count_for_video(&self, video_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE video_id = ?1",
            params![video_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = Document::new("video1".to_string(), "This is test content".to_string(), 0, vec![1.0, 0.0, 0.0]);
        let other = Document::new("video2".to_string(), "Other video".to_string(), 0, vec![1.0, 0.0, 0.0]);

        store.add_documents(&[doc, other]).await.unwrap();

        let videos = store.list_videos().await.unwrap();
        assert_eq!(videos.len(), 2);

        let results = store
            .similarity_search(&[1.0, 0.0, 0.0], 10, &SearchFilter::video("video1"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.video_id, "video1");
        assert!((results[0].score - 1.0).abs() < 0.001);

        let deleted = store.delete_by_video_id("video1").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embeddings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            let doc = Document::new("abc123".to_string(), "persisted".to_string(), 3, vec![0.25, -0.5]);
            store.add_documents(&[doc]).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        let results = store
            .similarity_search(&[0.25, -0.5], 1, &SearchFilter::video("abc123"))
            .await
            .unwrap();
        assert_eq!(results[0].document.embedding, vec![0.25, -0.5]);
        assert_eq!(results[0].document.chunk_order, 3);
        assert_eq!(store.count_for_video("abc123").await.unwrap(), 1);
    }
}
