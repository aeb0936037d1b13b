//! `reqwest` implementation of the backend surface.
//!
//! The client facade stays small:
//! - URL building, dispatch and decoding are delegated to `transport`.
//! - when and how long to back off is decided by `retry`, which never
//!   replays anything but a `GET`.

mod retry;
mod transport;

use super::Backend;
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::types::{
    ChatRequest, ChatResponse, DeleteRunResponse, ModelCatalog, RunDetail, RunQuery, RunStats,
    RunSummary, ToolDescriptor,
};
use async_trait::async_trait;
use reqwest::Method;
use retry::RetryPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use transport::Outgoing;

/// Client for the agent backend's JSON API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved backend configuration.
    pub fn new(config: &BackendConfig) -> Self {
        Self::new_with_retry_policy(config, RetryPolicy::default())
    }

    fn new_with_retry_policy(config: &BackendConfig, retry_policy: RetryPolicy) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self {
            http: transport::build_http_client(timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = transport::endpoint_url(&self.base_url, segments)?;
        let outgoing = Outgoing::<()> {
            method: Method::GET,
            url: &url,
            query,
            body: None,
        };
        let body = self.dispatch_with_retries(&outgoing).await?;
        transport::decode(&body, &format!("GET {}", url.path()))
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = transport::endpoint_url(&self.base_url, segments)?;
        let label = format!("{method} {}", url.path());
        let outgoing = Outgoing {
            method,
            url: &url,
            query: &[],
            body,
        };
        let body = self.dispatch_with_retries(&outgoing).await?;
        transport::decode(&body, &label)
    }

    async fn dispatch_with_retries<B: Serialize + ?Sized>(
        &self,
        outgoing: &Outgoing<'_, B>,
    ) -> Result<String, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            tracing::debug!(method = %outgoing.method, url = %outgoing.url, attempt, "backend request");
            match transport::dispatch(&self.http, outgoing).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    let next = self.retry_policy.next_delay(&outgoing.method, attempt, &err);
                    let Some(delay) = next else {
                        return Err(transport::with_diagnostic_hints(&self.base_url, err));
                    };
                    tracing::warn!(
                        url = %outgoing.url,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retrying backend request"
                    );
                    attempt = attempt.saturating_add(1);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.send(Method::POST, &["chat"], Some(request)).await
    }

    async fn list_runs(&self, query: &RunQuery) -> Result<Vec<RunSummary>, ApiError> {
        self.get(&["runs"], &query.to_pairs()).await
    }

    async fn get_run(&self, id: &str) -> Result<RunDetail, ApiError> {
        self.get(&["runs", id], &[]).await
    }

    async fn delete_run(&self, id: &str) -> Result<DeleteRunResponse, ApiError> {
        self.send::<(), _>(Method::DELETE, &["runs", id], None)
            .await
    }

    async fn run_stats(&self) -> Result<RunStats, ApiError> {
        self.get(&["runs", "stats", "summary"], &[]).await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ApiError> {
        self.get(&["tools"], &[]).await
    }

    async fn get_tool(&self, id: &str) -> Result<ToolDescriptor, ApiError> {
        self.get(&["tools", id], &[]).await
    }

    async fn list_models(&self) -> Result<ModelCatalog, ApiError> {
        self.get(&["models"], &[]).await
    }
}
