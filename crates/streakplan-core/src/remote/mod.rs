//! Remote text generation.
//!
//! The planner only needs "prompt in, text out", so the seam is a single
//! async method. [`HttpGenerativeClient`] speaks a Messages-style HTTP API;
//! tests substitute their own implementations.

mod error;
mod http;

use async_trait::async_trait;

pub use error::RemoteError;
pub use http::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_MODEL_MAX_OUTPUT_TOKENS, HttpClientConfig,
    HttpGenerativeClient,
};

/// One prompt sent to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Complete `request`, returning the generated text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, RemoteError>;
}
