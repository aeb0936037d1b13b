//! HTTP client for the agent backend.
//!
//! The API layer is split into:
//! - `client`: `ApiClient`, the `reqwest` implementation of [`Backend`].
//! - `client::transport`: request building, status handling, body decoding.
//! - `client::retry`: bounded retries for idempotent GETs.

use crate::error::ApiError;
use crate::types::{
    ChatRequest, ChatResponse, DeleteRunResponse, ModelCatalog, RunDetail, RunQuery, RunStats,
    RunSummary, ToolDescriptor,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;

pub use client::ApiClient;

/// Backend surface consumed by the console.
///
/// Components take this trait instead of [`ApiClient`] so tests can drive
/// them with scripted responses and controlled completion order.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Submit one chat turn. Creates a run server-side; never retried.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
    async fn list_runs(&self, query: &RunQuery) -> Result<Vec<RunSummary>, ApiError>;
    async fn get_run(&self, id: &str) -> Result<RunDetail, ApiError>;
    /// Delete a run and its steps. Never retried.
    async fn delete_run(&self, id: &str) -> Result<DeleteRunResponse, ApiError>;
    async fn run_stats(&self) -> Result<RunStats, ApiError>;
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ApiError>;
    async fn get_tool(&self, id: &str) -> Result<ToolDescriptor, ApiError>;
    async fn list_models(&self) -> Result<ModelCatalog, ApiError>;
}

/// Parse a `Retry-After` header given as delta-seconds or an HTTP date.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(seconds);
    }
    let at = httpdate::parse_http_date(raw).ok()?;
    Some(
        at.duration_since(SystemTime::now())
            .map(|delta| delta.as_secs())
            .unwrap_or(0),
    )
}
