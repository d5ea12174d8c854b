mod local;

pub use local::LocalEmbedding;
