use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use crate::application::SharedSession;
use crate::domain::{
    chunk_words,
    ports::{EmbeddingService, TextExtractor},
    ChunkSize, Document, DocumentChunk, DomainError, Embedding,
};

/// Output of the extract → chunk → embed pipeline for one upload.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub text: String,
    pub chunks: Vec<DocumentChunk>,
    pub embeddings: Vec<Embedding>,
    /// Set when the file could not be read; text, chunks and embeddings are
    /// then empty.
    pub extraction_error: Option<String>,
}

pub struct DocumentService {
    extractor: Arc<dyn TextExtractor>,
    embedding: Arc<dyn EmbeddingService>,
    chunk_size: ChunkSize,
}

impl DocumentService {
    pub fn new(extractor: Arc<dyn TextExtractor>, embedding: Arc<dyn EmbeddingService>) -> Self {
        Self::with_chunk_size(extractor, embedding, ChunkSize::default())
    }

    pub fn with_chunk_size(
        extractor: Arc<dyn TextExtractor>,
        embedding: Arc<dyn EmbeddingService>,
        chunk_size: ChunkSize,
    ) -> Self {
        Self {
            extractor,
            embedding,
            chunk_size,
        }
    }

    /// Runs the pipeline. An unreadable file is not an error here: it yields
    /// empty text with `extraction_error` set. Embedding failures are errors.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(&self, name: &str, bytes: &[u8]) -> Result<IngestedDocument, DomainError> {
        let started = Instant::now();
        let document = Document::new(name, bytes.len());

        let (text, extraction_error) = match self.extractor.extract(bytes).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!(error = %e, "text extraction failed");
                (String::new(), Some(e.to_string()))
            }
        };

        let chunks = chunk_words(document.id, &text, self.chunk_size);
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = self.embedding.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.dimension() != dimension) {
            return Err(DomainError::embedding(format!(
                "expected {dimension}-dimensional vectors, got {}",
                bad.dimension()
            )));
        }

        tracing::info!(
            chars = text.len(),
            chunks = chunks.len(),
            elapsed_ms = %started.elapsed().as_millis(),
            "document ingested"
        );

        Ok(IngestedDocument {
            document,
            text,
            chunks,
            embeddings,
            extraction_error,
        })
    }

    /// Ingests the upload and, only if that succeeds, swaps it into the
    /// session.
    #[instrument(skip(self, session, bytes))]
    pub async fn upload(
        &self,
        session: &SharedSession,
        name: &str,
        bytes: &[u8],
    ) -> Result<IngestedDocument, DomainError> {
        let ingested = self.ingest(name, bytes).await?;
        session.lock().await.load_document(ingested.clone());
        Ok(ingested)
    }
}
