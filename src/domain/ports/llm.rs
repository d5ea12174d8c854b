use std::pin::Pin;

use crate::domain::{errors::DomainError, ChatTurn, DocumentChunk};
use async_trait::async_trait;
use futures::Stream;

/// Answer text fragments in the order the model emits them. Ends when the
/// model signals end of output.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        question: &str,
        context: &[DocumentChunk],
    ) -> Result<FragmentStream, DomainError>;
}
