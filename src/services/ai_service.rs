use crate::error::Result;

/// A single prompt for the model backend, built fresh for each estimate.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    /// Image URI (`https://...` or a `data:` URI) attached alongside the prompt
    pub image_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat-completion backend (OpenRouter, or a test double)
#[async_trait::async_trait]
pub trait ModelBackend: Send + Sync {
    /// Returns the text content of the first choice in the reply.
    async fn complete(&self, request: ModelRequest) -> Result<String>;
}
