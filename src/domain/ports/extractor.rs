use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Turns raw document bytes into one plain-text string.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<String, DomainError>;
}
