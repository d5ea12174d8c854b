mod gemini;

pub use gemini::GeminiChat;
