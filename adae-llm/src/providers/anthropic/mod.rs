//! Anthropic (Claude) provider implementation
//!
//! This module provides Claude-based completion for intent extraction.

pub mod client;
pub mod completion;
pub mod types;

pub use client::AnthropicClient;
pub use completion::AnthropicCompletionProvider;
