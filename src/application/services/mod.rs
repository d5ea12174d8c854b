mod chat;
mod document;

pub use chat::{AnswerEvent, AnswerStream, ChatService};
pub use document::{DocumentService, IngestedDocument};
