//! Explanation Adapters - Text-generation Collaborators
//!
//! - `gemini`: Google Gemini `generateContent` REST client

pub mod gemini;

pub use gemini::GeminiExplainer;
