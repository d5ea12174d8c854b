use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::instrument;

use crate::application::SharedSession;
use crate::domain::ports::{ChatModel, FragmentStream};
use crate::domain::DomainError;

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnswerEvent {
    Fragment(String),
    Done { answer: String },
    Error(String),
}

/// Fragments of one answer, terminated by a single `Done` or `Error`.
pub type AnswerStream = ReceiverStream<AnswerEvent>;

pub struct ChatService {
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Starts answering `question` against the session's history.
    ///
    /// The model stream is drained on a background task whether or not the
    /// returned stream is read; a completed answer is appended to the
    /// history before `Done` is emitted.
    #[instrument(skip(self, session, question), fields(question_len = question.len()))]
    pub async fn ask(
        &self,
        session: &SharedSession,
        question: &str,
    ) -> Result<AnswerStream, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::EmptyQuestion);
        }

        let (history, chunks) = {
            let mut session = session.lock().await;
            session.begin_response()?;
            (
                session.history().turns().to_vec(),
                session.chunks().to_vec(),
            )
        };
        let pending = PendingResponse::new(session.clone());

        let fragments = match self.model.stream_chat(&history, question, &chunks).await {
            Ok(fragments) => fragments,
            Err(e) => {
                tracing::error!(error = %e, "failed to open model stream");
                pending.release().await;
                return Err(e);
            }
        };
        pending.hand_off();

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(relay(fragments, session.clone(), question.to_string(), tx));

        Ok(ReceiverStream::new(rx))
    }
}

/// Holds the responder in `Streaming` while the model stream is being opened.
///
/// Dropping it without `hand_off` (the `ask` future was cancelled) returns
/// the responder to idle.
struct PendingResponse {
    session: Option<SharedSession>,
}

impl PendingResponse {
    fn new(session: SharedSession) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The relay task now owns the responder state.
    fn hand_off(mut self) {
        self.session = None;
    }

    async fn release(mut self) {
        if let Some(session) = self.session.take() {
            session.lock().await.finish_response(None);
        }
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        tracing::warn!("question abandoned before the model stream opened");
        if let Ok(mut guard) = session.try_lock() {
            guard.finish_response(None);
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                session.lock().await.finish_response(None);
            });
        }
    }
}

async fn relay(
    mut fragments: FragmentStream,
    session: SharedSession,
    question: String,
    tx: mpsc::Sender<AnswerEvent>,
) {
    let mut answer = String::new();
    let mut failure = None;
    let mut count = 0usize;

    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                count += 1;
                answer.push_str(&text);
                // A gone reader does not stop the answer from completing.
                let _ = tx.send(AnswerEvent::Fragment(text)).await;
            }
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        }
    }

    let event = match failure {
        None => {
            tracing::info!(fragments = count, chars = answer.len(), "answer completed");
            session
                .lock()
                .await
                .finish_response(Some((question, answer.clone())));
            AnswerEvent::Done { answer }
        }
        Some(message) => {
            tracing::error!(error = %message, "answer stream failed");
            session.lock().await.finish_response(None);
            AnswerEvent::Error(message)
        }
    };

    let _ = tx.send(event).await;
}
