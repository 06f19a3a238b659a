//! OpenAI provider implementation
//!
//! This module provides GPT-based completion for intent extraction.

pub mod client;
pub mod completion;
pub mod types;

pub use client::OpenAIClient;
pub use completion::OpenAICompletionProvider;
