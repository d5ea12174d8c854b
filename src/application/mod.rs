//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete
//! implementations, and act on the explicit per-process [`Session`].

pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use services::{AnswerEvent, AnswerStream, ChatService, DocumentService, IngestedDocument};
pub use session::{ResponderState, Session, SharedSession};
