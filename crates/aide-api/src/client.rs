//! HTTP clients for the completion and persistence collaborators

use crate::error::{Error, Result};
use crate::types::{CompletionRequest, NewSubtask, NewTask, Subtask, Task};

/// Client for the LLM completion collaborator.
///
/// Returns the raw response body text; decoding it (including tolerating
/// prose around JSON) is the caller's job, so a malformed body is never an
/// error at this layer.
pub struct RefineClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RefineClient {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            api_key: None,
        }
    }

    /// Set a bearer API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Create from `AIDE_API_URL` / `AIDE_API_KEY` environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("AIDE_API_URL")
            .map_err(|_| Error::InvalidConfig("AIDE_API_URL is not set".into()))?;
        let mut client = Self::new(base_url);
        if let Ok(key) = std::env::var("AIDE_API_KEY") {
            client = client.with_api_key(key);
        }
        Ok(client)
    }

    /// Send a completion request and return the raw response body on 2xx.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/api/ai", self.base_url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "completion request failed");
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(body)
    }
}

/// Client for the task/subtask persistence collaborator.
///
/// Both operations are simple create-and-return; there is no batch or
/// transactional variant, so callers own any partial-failure policy.
pub struct TaskClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TaskClient {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            api_key: None,
        }
    }

    /// Set a bearer API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Create a parent task record.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let url = format!("{}/api/tasks", self.base_url);
        self.post_json(&url, task).await
    }

    /// Create a subtask record linked to an existing task.
    pub async fn create_subtask(&self, parent_task_id: &str, subtask: &NewSubtask) -> Result<Subtask> {
        let url = format!("{}/api/tasks/{}/subtasks", self.base_url, parent_task_id);
        self.post_json(&url, subtask).await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let mut builder = self.client.post(url).json(body);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), text));
        }

        Ok(response.json().await?)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_slash() {
        assert_eq!(trim_trailing_slash("http://x/".into()), "http://x");
        assert_eq!(trim_trailing_slash("http://x//".into()), "http://x");
        assert_eq!(trim_trailing_slash("http://x".into()), "http://x");
    }
}
