mod embedding;
mod extractor;
mod llm;

pub use embedding::EmbeddingService;
pub use extractor::TextExtractor;
pub use llm::{ChatModel, FragmentStream};
