use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::application::ResponderState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub document_loaded: bool,
    pub responder: ResponderState,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        document_loaded: session.document().is_some(),
        responder: session.responder(),
    })
}
