use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::services::IngestedDocument;
use crate::domain::{ChatHistory, Document, DocumentChunk, DomainError, Embedding};

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderState {
    #[default]
    Idle,
    Streaming,
}

/// Everything one user's interaction keeps between requests: the current
/// document with its text, chunks and embeddings, and the chat transcript.
///
/// Only document uploads and question handling mutate it.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    text: String,
    chunks: Vec<DocumentChunk>,
    embeddings: Vec<Embedding>,
    extraction_error: Option<String>,
    history: ChatHistory,
    responder: ResponderState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Replaces the current document and everything derived from it. The
    /// chat history is kept.
    pub fn load_document(&mut self, ingested: IngestedDocument) {
        self.document = Some(ingested.document);
        self.text = ingested.text;
        self.chunks = ingested.chunks;
        self.embeddings = ingested.embeddings;
        self.extraction_error = ingested.extraction_error;
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    pub fn extraction_error(&self) -> Option<&str> {
        self.extraction_error.as_deref()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn responder(&self) -> ResponderState {
        self.responder
    }

    pub(crate) fn begin_response(&mut self) -> Result<(), DomainError> {
        match self.responder {
            ResponderState::Streaming => Err(DomainError::Busy),
            ResponderState::Idle => {
                self.responder = ResponderState::Streaming;
                Ok(())
            }
        }
    }

    /// Returns to idle, recording the exchange when the answer completed.
    pub(crate) fn finish_response(&mut self, exchange: Option<(String, String)>) {
        if let Some((question, answer)) = exchange {
            self.history.record_exchange(question, answer);
        }
        self.responder = ResponderState::Idle;
    }
}
