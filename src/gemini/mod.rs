//! Gemini `generateContent` client with Google Search grounding.

pub(crate) mod client;
pub(crate) mod grounding;
pub(crate) mod types;

pub use client::{CompletionClient, GeminiClient, GeminiError};
