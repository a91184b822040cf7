//! Adapter for a hosted graph server's thread API.
//!
//! Endpoints used:
//!
//! - `POST /threads` creates the thread if it does not exist yet
//! - `POST /threads/{id}/runs/wait` runs until interrupt or completion
//! - `POST /threads/{id}/state` writes values as a given node
//! - `GET /threads/{id}/state` reads values and the next nodes
//! - `DELETE /threads/{id}` drops the thread

use crate::error::{GraphError, GraphResult};
use crate::ResearchGraph;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use research_types::{ResearchState, SessionId, StateSnapshot, StateUpdate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";
const MAX_ERROR_BODY_CHARS: usize = 320;

/// Connection settings for [`RemoteGraph`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteGraphConfig {
    /// Base URL of the graph server, e.g. `http://127.0.0.1:2024`
    pub base_url: String,
    /// Graph or assistant to run on each thread
    pub assistant_id: String,
    /// Optional API key sent as `x-api-key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteGraphConfig {
    pub fn new(base_url: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            assistant_id: assistant_id.into(),
            api_key: None,
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Research graph hosted behind an HTTP thread API
#[derive(Debug, Clone)]
pub struct RemoteGraph {
    client: Client,
    config: RemoteGraphConfig,
}

impl RemoteGraph {
    pub fn new(config: RemoteGraphConfig) -> GraphResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(GraphError::Config("remote engine url is empty".to_string()));
        }
        if config.assistant_id.trim().is_empty() {
            return Err(GraphError::Config(
                "remote engine assistant id is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteGraphConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.config.api_key.as_deref() {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn ensure_thread(&self, thread: &SessionId) -> GraphResult<()> {
        let builder = self.request(Method::POST, "/threads").json(&json!({
            "thread_id": thread.as_str(),
            "if_exists": "do_nothing",
        }));
        send::<Value>(builder).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    assistant_id: &'a str,
    input: Option<ResearchState>,
}

#[derive(Debug, Serialize)]
struct UpdateStateRequest<'a> {
    values: StateUpdate,
    as_node: &'a str,
}

#[async_trait]
impl ResearchGraph for RemoteGraph {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn invoke(
        &self,
        thread: &SessionId,
        input: Option<ResearchState>,
    ) -> GraphResult<ResearchState> {
        if input.is_some() {
            self.ensure_thread(thread).await?;
        }

        tracing::debug!(thread = %thread, resume = input.is_none(), "running remote thread");
        let builder = self
            .request(Method::POST, &format!("/threads/{}/runs/wait", thread))
            .json(&RunRequest {
                assistant_id: &self.config.assistant_id,
                input,
            });
        send(builder).await
    }

    async fn update_state(
        &self,
        thread: &SessionId,
        update: StateUpdate,
        as_node: &str,
    ) -> GraphResult<()> {
        let builder = self
            .request(Method::POST, &format!("/threads/{}/state", thread))
            .json(&UpdateStateRequest {
                values: update,
                as_node,
            });
        send::<Value>(builder).await?;
        Ok(())
    }

    async fn get_state(&self, thread: &SessionId) -> GraphResult<StateSnapshot> {
        let builder = self.request(Method::GET, &format!("/threads/{}/state", thread));
        send(builder).await
    }

    async fn release(&self, thread: &SessionId) -> GraphResult<()> {
        let builder = self.request(Method::DELETE, &format!("/threads/{}", thread));
        let response = builder
            .send()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            tracing::debug!(thread = %thread, status = status.as_u16(), "remote thread released");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(GraphError::Engine {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY_CHARS),
        })
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> GraphResult<T> {
    let response = builder
        .send()
        .await
        .map_err(|e| GraphError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GraphError::Engine {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY_CHARS),
        });
    }

    response
        .json()
        .await
        .map_err(|e| GraphError::Decode(e.to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
