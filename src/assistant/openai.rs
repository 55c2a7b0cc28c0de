//! HTTP implementation of [`AssistantApi`] for the OpenAI Assistants v2 API.

use crate::assistant::client::AssistantApi;
use crate::assistant::types::{
    Assistant, AssistantSpec, List, Message, NewMessage, NewRun, Role, Run, Thread,
};
use crate::error::{Result, TrsuError};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VERSION: &str = "assistants=v2";

/// Assistant API client over `reqwest`.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Client whose requests each give up after `timeout`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(http, base_url, api_key))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TrsuError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw
/// body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AssistantApi for OpenAiClient {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant> {
        self.send(self.request(Method::POST, "/assistants").json(spec))
            .await
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.send(
            self.request(Method::POST, "/threads")
                .json(&serde_json::json!({})),
        )
        .await
    }

    async fn post_message(&self, thread_id: &str, role: Role, content: &str) -> Result<Message> {
        self.send(
            self.request(Method::POST, &format!("/threads/{thread_id}/messages"))
                .json(&NewMessage { role, content }),
        )
        .await
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        self.send(
            self.request(Method::POST, &format!("/threads/{thread_id}/runs"))
                .json(&NewRun { assistant_id }),
        )
        .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.send(self.request(Method::GET, &format!("/threads/{thread_id}/runs/{run_id}")))
            .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let list: List<Message> = self
            .send(self.request(
                Method::GET,
                &format!("/threads/{thread_id}/messages?order=desc"),
            ))
            .await?;
        Ok(list.data)
    }
}
