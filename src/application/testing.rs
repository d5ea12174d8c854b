//! In-memory stand-ins for the ports, shared by service and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{ChatModel, EmbeddingService, FragmentStream, TextExtractor};
use crate::domain::{ChatTurn, DocumentChunk, DomainError, Embedding};

pub struct FakeExtractor {
    result: Result<String, String>,
}

impl FakeExtractor {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, _bytes: &[u8]) -> Result<String, DomainError> {
        self.result.clone().map_err(DomainError::extraction)
    }
}

pub struct FakeEmbedding {
    fail: bool,
    reported_dimension: usize,
    calls: AtomicUsize,
}

impl FakeEmbedding {
    pub const DIMENSION: usize = 4;

    pub fn new() -> Self {
        Self {
            fail: false,
            reported_dimension: Self::DIMENSION,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Still returns `DIMENSION`-long vectors but claims another length.
    pub fn reporting_dimension(dimension: usize) -> Self {
        Self {
            reported_dimension: dimension,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail && !texts.is_empty() {
            return Err(DomainError::embedding("model weights unavailable"));
        }
        Ok(texts
            .iter()
            .map(|t| Embedding::new(vec![t.len() as f32; Self::DIMENSION]))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.reported_dimension
    }
}

enum Script {
    Answer(Vec<String>),
    FailAfter(Vec<String>, String),
    Unavailable(String),
    Stalled,
    NeverOpens,
}

pub struct FakeChatModel {
    script: Script,
    history_lens: Mutex<Vec<usize>>,
}

impl FakeChatModel {
    fn scripted(script: Script) -> Self {
        Self {
            script,
            history_lens: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(fragments: &[&str]) -> Self {
        Self::scripted(Script::Answer(owned(fragments)))
    }

    pub fn failing_after(fragments: &[&str], error: &str) -> Self {
        Self::scripted(Script::FailAfter(owned(fragments), error.to_string()))
    }

    pub fn unavailable(error: &str) -> Self {
        Self::scripted(Script::Unavailable(error.to_string()))
    }

    /// Opens a stream that never yields or ends.
    pub fn stalled() -> Self {
        Self::scripted(Script::Stalled)
    }

    /// Never finishes opening the stream.
    pub fn never_opening() -> Self {
        Self::scripted(Script::NeverOpens)
    }

    pub fn calls(&self) -> usize {
        self.history_lens.lock().unwrap().len()
    }

    pub fn seen_history_lens(&self) -> Vec<usize> {
        self.history_lens.lock().unwrap().clone()
    }
}

fn owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|f| f.to_string()).collect()
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        _question: &str,
        _context: &[DocumentChunk],
    ) -> Result<FragmentStream, DomainError> {
        self.history_lens.lock().unwrap().push(history.len());

        let items: Vec<Result<String, DomainError>> = match &self.script {
            Script::Answer(fragments) => fragments.iter().cloned().map(Ok).collect(),
            Script::FailAfter(fragments, error) => fragments
                .iter()
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(DomainError::external(error.clone()))))
                .collect(),
            Script::Unavailable(error) => return Err(DomainError::external(error.clone())),
            Script::Stalled => return Ok(Box::pin(futures::stream::pending())),
            Script::NeverOpens => return std::future::pending().await,
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
