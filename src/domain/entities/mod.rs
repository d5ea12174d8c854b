mod conversation;
mod document;
mod embedding;

pub use conversation::{ChatHistory, ChatRole, ChatTurn};
pub use document::{chunk_words, ChunkSize, Document, DocumentChunk, DEFAULT_CHUNK_SIZE};
pub use embedding::Embedding;
