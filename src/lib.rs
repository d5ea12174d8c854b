//! Single-session PDF question answering: upload a PDF, extract and chunk its
//! text, embed the chunks, and chat about it with a hosted model.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
