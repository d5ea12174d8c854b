use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Document, DocumentChunk};

const FILE_FIELD: &str = "file";
const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/pdf", "application/octet-stream"];

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Document> for DocumentResponse {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            content_type: doc.content_type.clone(),
            size_bytes: doc.size_bytes,
            uploaded_at: doc.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document: DocumentResponse,
    pub message: String,
    pub text: String,
    pub chunk_count: usize,
    pub embedding_count: usize,
    pub embedding_dimension: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub index: usize,
    pub word_count: usize,
    pub content: String,
}

impl From<&DocumentChunk> for ChunkResponse {
    fn from(chunk: &DocumentChunk) -> Self {
        Self {
            index: chunk.chunk_index,
            word_count: chunk.word_count,
            content: chunk.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentDocumentResponse {
    pub document: DocumentResponse,
    pub text: String,
    pub chunks: Vec<ChunkResponse>,
    pub embedding_count: usize,
    pub error: Option<String>,
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::error(e.status(), format!("Multipart error: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::error(e.status(), format!("Failed to read file: {}", e.body_text()))
        })?;

        return Ok(UploadedFile {
            name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::error(StatusCode::BAD_REQUEST, "No file provided"))
}

pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_field(&mut multipart).await?;

    if let Some(content_type) = &file.content_type {
        if !ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Only PDF files are accepted, got {content_type}"),
            ));
        }
    }

    let max_bytes = state.config.config.upload.max_bytes;
    if file.bytes.len() > max_bytes {
        return Err(ApiError::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File is {} bytes, the limit is {max_bytes}", file.bytes.len()),
        ));
    }

    let ingested = state
        .document_service
        .upload(&state.session, &file.name, &file.bytes)
        .await?;

    let message = match &ingested.extraction_error {
        None => format!(
            "PDF '{}' uploaded and text extracted successfully!",
            ingested.document.name
        ),
        Some(error) => error.clone(),
    };

    Ok(Json(UploadResponse {
        document: DocumentResponse::from(&ingested.document),
        message,
        chunk_count: ingested.chunks.len(),
        embedding_count: ingested.embeddings.len(),
        embedding_dimension: ingested.embeddings.first().map(|e| e.dimension()),
        error: ingested.extraction_error,
        text: ingested.text,
    }))
}

pub async fn current_document(
    State(state): State<AppState>,
) -> Result<Json<CurrentDocumentResponse>, ApiError> {
    let session = state.session.lock().await;
    let document = session
        .document()
        .ok_or_else(|| ApiError::error(StatusCode::NOT_FOUND, "No PDF file selected."))?;

    Ok(Json(CurrentDocumentResponse {
        document: DocumentResponse::from(document),
        text: session.text().to_string(),
        chunks: session.chunks().iter().map(ChunkResponse::from).collect(),
        embedding_count: session.embeddings().len(),
        error: session.extraction_error().map(str::to_string),
    }))
}
