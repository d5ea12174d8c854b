use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>, size_bytes: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content_type: "application/pdf".to_string(),
            size_bytes,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub document_id: Uuid,
    pub chunk_index: usize,
    pub content: String,
    pub word_count: usize,
}

impl DocumentChunk {
    pub fn new(document_id: Uuid, chunk_index: usize, words: &[&str]) -> Self {
        Self {
            document_id,
            chunk_index,
            content: words.join(" "),
            word_count: words.len(),
        }
    }
}

/// Number of words per chunk. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ChunkSize(usize);

impl ChunkSize {
    pub fn new(words: usize) -> Result<Self, DomainError> {
        if words == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }
        Ok(Self(words))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(DEFAULT_CHUNK_SIZE)
    }
}

impl TryFrom<usize> for ChunkSize {
    type Error = DomainError;

    fn try_from(words: usize) -> Result<Self, Self::Error> {
        Self::new(words)
    }
}

impl From<ChunkSize> for usize {
    fn from(size: ChunkSize) -> Self {
        size.0
    }
}

/// Splits text on whitespace and groups the words into consecutive,
/// non-overlapping windows of `chunk_size` words.
///
/// The final window may be shorter. Joining the chunk contents with single
/// spaces yields the text's word sequence.
pub fn chunk_words(document_id: Uuid, text: &str, chunk_size: ChunkSize) -> Vec<DocumentChunk> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(chunk_size.get())
        .enumerate()
        .map(|(index, window)| DocumentChunk::new(document_id, index, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_chunk_words_250_words_by_100() {
        let chunks = chunk_words(Uuid::new_v4(), &words(250), ChunkSize::default());

        let sizes: Vec<usize> = chunks.iter().map(|c| c.word_count).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(chunks[2].chunk_index, 2);
        assert!(chunks[2].content.starts_with("w200 "));
    }

    #[test]
    fn test_chunk_words_reconstructs_word_sequence() {
        let text = "  Lorem ipsum\tdolor\n\nsit amet,\r\nconsectetur   adipiscing elit ";
        let chunks = chunk_words(Uuid::new_v4(), text, ChunkSize::new(3).unwrap());

        let rebuilt = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let expected: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt.split(' ').collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_chunk_count_is_ceiling() {
        let doc_id = Uuid::new_v4();
        for (word_count, size, expected) in [(0, 5, 0), (1, 5, 1), (5, 5, 1), (6, 5, 2), (99, 10, 10)] {
            let chunks = chunk_words(doc_id, &words(word_count), ChunkSize::new(size).unwrap());
            assert_eq!(chunks.len(), expected, "{word_count} words / {size}");
        }
    }

    #[test]
    fn test_chunk_words_is_deterministic() {
        let doc_id = Uuid::new_v4();
        let text = words(42);
        let size = ChunkSize::new(8).unwrap();
        assert_eq!(chunk_words(doc_id, &text, size), chunk_words(doc_id, &text, size));
    }

    #[test]
    fn test_chunk_words_empty_and_blank() {
        let doc_id = Uuid::new_v4();
        assert!(chunk_words(doc_id, "", ChunkSize::default()).is_empty());
        assert!(chunk_words(doc_id, " \n\t ", ChunkSize::default()).is_empty());
    }

    #[test]
    fn test_chunk_size_rejects_zero() {
        assert!(matches!(ChunkSize::new(0), Err(DomainError::Validation(_))));
        assert_eq!(ChunkSize::default().get(), 100);
        assert!(serde_json::from_str::<ChunkSize>("0").is_err());
        assert_eq!(serde_json::from_str::<ChunkSize>("25").unwrap().get(), 25);
    }
}
