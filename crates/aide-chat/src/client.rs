//! Completion collaborator trait

use async_trait::async_trait;

use aide_api::{CompletionRequest, RefineClient, Result};

/// The LLM completion collaborator.
///
/// Implementations return the raw response body text; tolerant decoding is
/// done by the prompt layer, and any failure here is absorbed by the
/// coordinator's fallbacks.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// HTTP-backed completion collaborator.
pub struct HttpCompletion {
    client: RefineClient,
}

impl HttpCompletion {
    pub fn new(client: RefineClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Completion for HttpCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.client.complete(request).await
    }
}
