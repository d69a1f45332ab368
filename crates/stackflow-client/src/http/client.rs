//! Reqwest client for the stackflow service.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use stackflow_graph::validate::ValidationResult;
use stackflow_graph::workflow::Workflow;

use super::HttpConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    ChatRecord, ExecutionRequest, ExecutionResponse, NewStack, Stack, StackId, StackPatch,
    UploadReceipt,
};
use crate::{StackBackend, TRACING_TARGET};

/// Inner client that holds the HTTP client and configuration.
struct HttpBackendInner {
    http: Client,
    config: HttpConfig,
}

/// HTTP backend for the stackflow service.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Creates an HTTP backend with the given configuration.
    pub fn new(config: HttpConfig) -> Self {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = timeout.as_millis(),
            "Creating HTTP backend"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(HttpBackendInner { http, config }),
        }
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.inner.config
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.inner.config.base_url.join(path)?)
    }

    /// Decodes a response body, or maps a non-success status to
    /// [`ClientError::Status`] carrying the service's detail text.
    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        Err(Self::status_error(status, response).await)
    }

    async fn status_error(status: StatusCode, response: Response) -> ClientError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("detail")?.as_str().map(str::to_owned))
            .unwrap_or(body);

        ClientError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(HttpConfig::default())
    }
}

#[async_trait::async_trait]
impl StackBackend for HttpBackend {
    async fn create_stack(&self, stack: NewStack) -> ClientResult<Stack> {
        let url = self.url("/stacks/")?;
        let response = self.inner.http.post(url).json(&stack).send().await?;
        Self::decode(response).await
    }

    async fn list_stacks(&self) -> ClientResult<Vec<Stack>> {
        let url = self.url("/stacks/")?;
        let response = self.inner.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn get_stack(&self, id: StackId) -> ClientResult<Stack> {
        let url = self.url(&format!("/stacks/{id}"))?;
        let response = self.inner.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn update_stack(&self, id: StackId, patch: StackPatch) -> ClientResult<Stack> {
        let url = self.url(&format!("/stacks/{id}"))?;

        tracing::debug!(target: TRACING_TARGET, stack_id = %id, "Updating stack");

        let response = self.inner.http.put(url).json(&patch).send().await?;
        Self::decode(response).await
    }

    async fn delete_stack(&self, id: StackId) -> ClientResult<()> {
        let url = self.url(&format!("/stacks/{id}"))?;
        let response = self.inner.http.delete(url).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::status_error(status, response).await)
    }

    async fn validate_workflow(&self, workflow: &Workflow) -> ClientResult<ValidationResult> {
        let url = self.url("/workflows/validate")?;

        tracing::debug!(
            target: TRACING_TARGET,
            nodes = workflow.node_count(),
            edges = workflow.edge_count(),
            "Validating workflow"
        );

        let response = self.inner.http.post(url).json(workflow).send().await?;
        Self::decode(response).await
    }

    async fn execute_workflow(&self, request: ExecutionRequest) -> ClientResult<ExecutionResponse> {
        let url = self.url("/workflows/execute")?;

        tracing::debug!(target: TRACING_TARGET, stack_id = %request.stack_id, "Executing workflow");

        let response = self.inner.http.post(url).json(&request).send().await?;
        Self::decode(response).await
    }

    async fn upload_document(
        &self,
        filename: &str,
        content: Vec<u8>,
        stack_id: Option<StackId>,
    ) -> ClientResult<UploadReceipt> {
        let url = self.url("/documents/upload")?;

        let part = Part::bytes(content)
            .file_name(filename.to_owned())
            .mime_str("application/pdf")?;
        let mut form = Form::new().part("file", part);
        if let Some(id) = stack_id {
            form = form.text("stack_id", id.to_string());
        }

        tracing::debug!(target: TRACING_TARGET, filename, "Uploading document");

        let response = self.inner.http.post(url).multipart(form).send().await?;
        Self::decode(response).await
    }

    async fn chat_history(&self, id: StackId) -> ClientResult<Vec<ChatRecord>> {
        let url = self.url(&format!("/stacks/{id}/chat-history"))?;
        let response = self.inner.http.get(url).send().await?;
        Self::decode(response).await
    }
}
