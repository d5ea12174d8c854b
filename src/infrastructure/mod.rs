pub mod config;
pub mod embedding;
pub mod extraction;
pub mod llm;

pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::LocalEmbedding;
pub use extraction::PdfTextExtractor;
pub use llm::GeminiChat;
