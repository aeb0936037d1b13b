//! Shared test fixtures for client, registry, catalog and session tests.
//!
//! Two doubles live here:
//! - a scripted HTTP server on a local `TcpListener` for transport tests;
//! - [`MockBackend`], a [`Backend`] whose replies are queued per endpoint and
//!   may be gated so a test decides the order in which futures complete.

use crate::api::Backend;
use crate::error::ApiError;
use crate::types::{
    ChatRequest, ChatResponse, DeleteRunResponse, ModelCatalog, RawStep, RunDetail, RunQuery,
    RunStats, RunStatus, RunSummary, ToolDescriptor,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// One canned HTTP response.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    status: u16,
    body: String,
}

impl ScriptedResponse {
    pub fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Local server answering one connection per scripted response, in order.
pub struct ScriptedServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedServer {
    /// Raw text (request line, headers, body) of every request served so far.
    pub async fn requests(&self) -> Vec<String> {
        // Let the accept loop record a request the client has already sent.
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_scripted_server(script: Vec<ScriptedResponse>) -> ScriptedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    tokio::spawn(async move {
        for response in script {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let raw = read_request(&mut stream).await;
            recorded.lock().unwrap().push(raw);
            let reason = if response.status < 400 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                response.status,
                response.body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(response.body.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    ScriptedServer { addr, requests }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Sender half of a gated reply; the paired call blocks until it fires.
pub type Gate<T> = oneshot::Sender<Result<T, ApiError>>;

enum Reply<T> {
    Now(Result<T, ApiError>),
    Gated(oneshot::Receiver<Result<T, ApiError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, ApiError> {
        match self {
            Self::Now(result) => result,
            Self::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::InvalidResponse("gate dropped".into()))),
        }
    }
}

fn nothing_queued() -> ApiError {
    ApiError::InvalidResponse("no mock response queued".into())
}

struct Script<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    fn push(&self, result: Result<T, ApiError>) {
        self.queue.lock().unwrap().push_back(Reply::Now(result));
    }

    fn gate(&self) -> Gate<T> {
        let (tx, rx) = oneshot::channel();
        self.queue.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    async fn next(&self) -> Result<T, ApiError> {
        let reply = self.queue.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(nothing_queued()),
        }
    }
}

struct KeyedScript<T> {
    queues: Mutex<HashMap<String, VecDeque<Reply<T>>>>,
}

impl<T> Default for KeyedScript<T> {
    fn default() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> KeyedScript<T> {
    fn push(&self, key: &str, result: Result<T, ApiError>) {
        self.queues
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Reply::Now(result));
    }

    fn gate(&self, key: &str) -> Gate<T> {
        let (tx, rx) = oneshot::channel();
        self.queues
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Reply::Gated(rx));
        tx
    }

    async fn next(&self, key: &str) -> Result<T, ApiError> {
        let reply = self
            .queues
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(nothing_queued()),
        }
    }
}

/// Scripted [`Backend`] recording what the code under test asked for.
#[derive(Default)]
pub struct MockBackend {
    chat: Script<ChatResponse>,
    runs: Script<Vec<RunSummary>>,
    run_detail: KeyedScript<RunDetail>,
    delete: KeyedScript<DeleteRunResponse>,
    stats: Script<RunStats>,
    tools: Script<Vec<ToolDescriptor>>,
    tool_detail: KeyedScript<ToolDescriptor>,
    models: Script<ModelCatalog>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    run_queries: Mutex<Vec<RunQuery>>,
    run_fetches: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chat(&self, result: Result<ChatResponse, ApiError>) {
        self.chat.push(result);
    }

    pub fn gate_chat(&self) -> Gate<ChatResponse> {
        self.chat.gate()
    }

    pub fn push_runs(&self, result: Result<Vec<RunSummary>, ApiError>) {
        self.runs.push(result);
    }

    pub fn gate_runs(&self) -> Gate<Vec<RunSummary>> {
        self.runs.gate()
    }

    pub fn push_run(&self, id: &str, result: Result<RunDetail, ApiError>) {
        self.run_detail.push(id, result);
    }

    pub fn gate_run(&self, id: &str) -> Gate<RunDetail> {
        self.run_detail.gate(id)
    }

    pub fn push_delete(&self, id: &str, result: Result<DeleteRunResponse, ApiError>) {
        self.delete.push(id, result);
    }

    pub fn push_stats(&self, result: Result<RunStats, ApiError>) {
        self.stats.push(result);
    }

    pub fn push_tools(&self, result: Result<Vec<ToolDescriptor>, ApiError>) {
        self.tools.push(result);
    }

    pub fn push_tool(&self, id: &str, result: Result<ToolDescriptor, ApiError>) {
        self.tool_detail.push(id, result);
    }

    pub fn gate_tool(&self, id: &str) -> Gate<ToolDescriptor> {
        self.tool_detail.gate(id)
    }

    pub fn push_models(&self, result: Result<ModelCatalog, ApiError>) {
        self.models.push(result);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn run_queries(&self) -> Vec<RunQuery> {
        self.run_queries.lock().unwrap().clone()
    }

    pub fn run_fetches(&self) -> Vec<String> {
        self.run_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chat.next().await
    }

    async fn list_runs(&self, query: &RunQuery) -> Result<Vec<RunSummary>, ApiError> {
        self.run_queries.lock().unwrap().push(query.clone());
        self.runs.next().await
    }

    async fn get_run(&self, id: &str) -> Result<RunDetail, ApiError> {
        self.run_fetches.lock().unwrap().push(id.to_string());
        self.run_detail.next(id).await
    }

    async fn delete_run(&self, id: &str) -> Result<DeleteRunResponse, ApiError> {
        self.delete.next(id).await
    }

    async fn run_stats(&self) -> Result<RunStats, ApiError> {
        self.stats.next().await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ApiError> {
        self.tools.next().await
    }

    async fn get_tool(&self, id: &str) -> Result<ToolDescriptor, ApiError> {
        self.tool_detail.next(id).await
    }

    async fn list_models(&self) -> Result<ModelCatalog, ApiError> {
        self.models.next().await
    }
}

/// 503 from the backend, as seen after retries are exhausted.
pub fn unavailable() -> ApiError {
    ApiError::status(503, "{\"detail\":\"down\"}".into(), None)
}

pub fn summary(id: &str, status: RunStatus) -> RunSummary {
    RunSummary {
        id: id.to_string(),
        name: format!("Run {}", id.chars().take(8).collect::<String>()),
        status,
        time: "10:42 AM".into(),
        user_query: format!("query for {id}"),
    }
}

pub fn detail(id: &str, status: RunStatus, steps: Vec<RawStep>) -> RunDetail {
    RunDetail {
        id: id.to_string(),
        status,
        user_query: format!("query for {id}"),
        created_at: Some("2026-03-02T10:42:00".into()),
        completed_at: None,
        steps,
    }
}

pub fn tool(id: &str, enabled: bool) -> ToolDescriptor {
    ToolDescriptor {
        id: id.to_string(),
        name: id.replace('-', " "),
        description: format!("{id} tool"),
        enabled,
        icon_ref: Some("Wrench".into()),
        schema: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_replies_in_queue_order_then_reports_empty_queue() {
        let mock = MockBackend::new();
        mock.push_runs(Ok(vec![summary("a", RunStatus::Running)]));
        mock.push_runs(Err(unavailable()));

        assert_eq!(mock.list_runs(&RunQuery::default()).await.unwrap().len(), 1);
        assert!(mock.list_runs(&RunQuery::default()).await.is_err());
        let err = mock.list_runs(&RunQuery::default()).await.unwrap_err();
        assert!(err.to_string().contains("no mock response queued"));
        assert_eq!(mock.run_queries().len(), 3);
    }

    #[tokio::test]
    async fn gated_reply_waits_for_its_sender() {
        let mock = MockBackend::new();
        let gate = mock.gate_run("r1");
        let (result, ()) = tokio::join!(mock.get_run("r1"), async {
            gate.send(Ok(detail("r1", RunStatus::Completed, Vec::new())))
                .ok();
        });
        assert_eq!(result.unwrap().id, "r1");
        assert_eq!(mock.run_fetches(), vec!["r1".to_string()]);
    }

    #[tokio::test]
    async fn scripted_server_records_raw_requests() {
        let server = spawn_scripted_server(vec![ScriptedResponse::json("{}")]).await;
        let mut stream = TcpStream::connect(server.addr).await.unwrap();
        stream
            .write_all(b"POST /x HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");

        let requests = server.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /x "));
        assert!(requests[0].ends_with("hi"));
    }
}
