use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::application::{AnswerEvent, ResponderState};
use crate::domain::{ChatTurn, DomainError};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<ChatTurn>,
    pub responder: ResponderState,
}

/// Streams the answer as SSE: `fragment` events in model order, then one
/// `done` (full answer) or `error` event.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let answers = state
        .chat_service
        .ask(&state.session, &request.question)
        .await
        .map_err(|e| match e {
            DomainError::EmptyQuestion => {
                ApiError::warning(state.config.prompts.assistant.empty_question_warning.clone())
            }
            other => ApiError::from(other),
        })?;

    let events = answers.map(|answer| Ok(to_sse_event(&answer)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_sse_event(answer: &AnswerEvent) -> Event {
    let name = match answer {
        AnswerEvent::Fragment(_) => "fragment",
        AnswerEvent::Done { .. } => "done",
        AnswerEvent::Error(_) => "error",
    };
    let data = serde_json::to_string(answer).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(name).data(data)
}

pub async fn chat_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let session = state.session.lock().await;
    Json(HistoryResponse {
        turns: session.history().turns().to_vec(),
        responder: session.responder(),
    })
}
