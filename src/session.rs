//! Chat playground session: one turn at a time against the backend.
//!
//! A turn appends the operator's message as a `Pending` entry before the
//! request is sent, then settles it and appends the assistant's reply (or a
//! diagnostic) when the backend answers. Backend failures never escape a
//! turn; they become transcript entries.

use crate::api::Backend;
use crate::error::FetchFailure;
use crate::tools::ToolSelection;
use crate::types::ChatRequest;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Whether an entry's turn has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    /// Shown optimistically; the backend has not answered yet.
    Pending,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Operator input, the greeting, or a backend reply.
    Message,
    /// Locally synthesized from a failed turn.
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub run_id: Option<String>,
    pub phase: EntryPhase,
    pub kind: EntryKind,
}

impl TranscriptEntry {
    fn settled(role: Role, content: String, kind: EntryKind) -> Self {
        Self {
            role,
            content,
            run_id: None,
            phase: EntryPhase::Settled,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    TurnInFlight,
}

/// Result of [`SessionCoordinator::submit_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed { run_id: String, response: String },
    /// The backend call failed; a diagnostic entry was appended.
    Failed(FetchFailure),
    /// Nothing was sent and the transcript is unchanged.
    Rejected(RejectReason),
}

#[derive(Default)]
struct SessionState {
    transcript: Vec<TranscriptEntry>,
    in_flight: bool,
}

pub struct SessionCoordinator<B: Backend> {
    backend: Arc<B>,
    state: Mutex<SessionState>,
}

impl<B: Backend> SessionCoordinator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Start a session whose transcript opens with an assistant greeting.
    /// A blank greeting starts an empty transcript.
    pub fn with_greeting(backend: Arc<B>, greeting: &str) -> Self {
        let session = Self::new(backend);
        if !greeting.trim().is_empty() {
            session.lock().transcript.push(TranscriptEntry::settled(
                Role::Assistant,
                greeting.to_string(),
                EntryKind::Message,
            ));
        }
        session
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Send one chat turn with the given model and the current tool selection.
    pub async fn submit_turn(
        &self,
        text: &str,
        model: Option<&str>,
        selection: &ToolSelection,
    ) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Rejected(RejectReason::EmptyInput);
        }

        let pending_index = {
            let mut state = self.lock();
            if state.in_flight {
                tracing::debug!("turn rejected: previous turn still in flight");
                return TurnOutcome::Rejected(RejectReason::TurnInFlight);
            }
            state.in_flight = true;
            state.transcript.push(TranscriptEntry {
                role: Role::User,
                content: text.to_string(),
                run_id: None,
                phase: EntryPhase::Pending,
                kind: EntryKind::Message,
            });
            state.transcript.len() - 1
        };

        let request = ChatRequest {
            message: text.to_string(),
            model: model.map(str::to_string),
            tools: selection.to_request_tools(),
        };
        tracing::info!(
            model = request.model.as_deref().unwrap_or("<backend default>"),
            tools = %selection,
            "submitting turn"
        );
        let result = self.backend.chat(&request).await;

        let mut state = self.lock();
        state.in_flight = false;
        if let Some(entry) = state.transcript.get_mut(pending_index) {
            entry.phase = EntryPhase::Settled;
        }
        match result {
            Ok(reply) => {
                tracing::debug!(run_id = %reply.run_id, "turn completed");
                state.transcript.push(TranscriptEntry {
                    role: Role::Assistant,
                    content: reply.response.clone(),
                    run_id: Some(reply.run_id.clone()),
                    phase: EntryPhase::Settled,
                    kind: EntryKind::Message,
                });
                TurnOutcome::Completed {
                    run_id: reply.run_id,
                    response: reply.response,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "turn failed");
                state.transcript.push(TranscriptEntry::settled(
                    Role::Assistant,
                    format!("Error: {err}. Ensure backend is running."),
                    EntryKind::Diagnostic,
                ));
                TurnOutcome::Failed(FetchFailure::from(err))
            }
        }
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.lock().transcript.clone()
    }

    pub fn is_awaiting(&self) -> bool {
        self.lock().in_flight
    }

    /// Run id of the most recent completed turn.
    pub fn last_run_id(&self) -> Option<String> {
        self.lock()
            .transcript
            .iter()
            .rev()
            .find_map(|entry| entry.run_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, FailureKind};
    use crate::testsupport::{unavailable, MockBackend};
    use crate::types::ChatResponse;

    fn session() -> (Arc<MockBackend>, SessionCoordinator<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        (Arc::clone(&backend), SessionCoordinator::new(backend))
    }

    fn reply(run_id: &str, text: &str) -> ChatResponse {
        ChatResponse {
            response: text.into(),
            run_id: run_id.into(),
        }
    }

    #[tokio::test]
    async fn blank_input_leaves_transcript_unchanged() {
        let backend = Arc::new(MockBackend::new());
        let session = SessionCoordinator::with_greeting(Arc::clone(&backend), "Hello!");
        let before = session.transcript();

        for text in ["", "   ", "\n\t"] {
            let outcome = session.submit_turn(text, None, &ToolSelection::default()).await;
            assert_eq!(outcome, TurnOutcome::Rejected(RejectReason::EmptyInput));
        }
        assert_eq!(session.transcript(), before);
        assert!(backend.chat_requests().is_empty());
    }

    #[tokio::test]
    async fn successful_turn_appends_settled_pair() {
        let (backend, session) = session();
        backend.push_chat(Ok(reply("run-1", "Deployed.")));

        let selection = ToolSelection::explicit(["web-search", "calculator"]);
        let outcome = session
            .submit_turn("deploy the agent", Some("GPT-5.1"), &selection)
            .await;
        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                run_id: "run-1".into(),
                response: "Deployed.".into()
            }
        );

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].phase, EntryPhase::Settled);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].run_id.as_deref(), Some("run-1"));
        assert_eq!(session.last_run_id().as_deref(), Some("run-1"));

        let sent = &backend.chat_requests()[0];
        assert_eq!(sent.message, "deploy the agent");
        assert_eq!(sent.model.as_deref(), Some("GPT-5.1"));
        assert_eq!(
            sent.tools,
            Some(vec!["web-search".to_string(), "calculator".to_string()])
        );
        assert_eq!(selection.tool_ids().len(), 2);
    }

    #[tokio::test]
    async fn auto_mode_omits_tools_from_request() {
        let (backend, session) = session();
        backend.push_chat(Ok(reply("run-2", "ok")));
        session
            .submit_turn("hi", None, &ToolSelection::AutoOnly)
            .await;
        let sent = &backend.chat_requests()[0];
        assert_eq!(sent.tools, None);
        assert_eq!(sent.model, None);
    }

    #[tokio::test]
    async fn failure_becomes_diagnostic_entry() {
        let (backend, session) = session();
        backend.push_chat(Err(unavailable()));

        let outcome = session
            .submit_turn("hello", None, &ToolSelection::default())
            .await;
        match outcome {
            TurnOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::NetworkUnavailable)
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].phase, EntryPhase::Settled);
        let diagnostic = &transcript[1];
        assert_eq!(diagnostic.kind, EntryKind::Diagnostic);
        assert!(diagnostic.content.starts_with("Error: status 503"), "{}", diagnostic.content);
        assert!(diagnostic.content.ends_with(". Ensure backend is running."));
        assert!(!session.is_awaiting());
    }

    #[tokio::test]
    async fn second_turn_is_rejected_while_first_is_pending() {
        let (backend, session) = session();
        let gate = backend.gate_chat();
        let selection = ToolSelection::default();

        let (first, ()) = tokio::join!(session.submit_turn("first", None, &selection), async {
            assert!(session.is_awaiting());
            let transcript = session.transcript();
            assert_eq!(transcript.len(), 1);
            assert_eq!(transcript[0].phase, EntryPhase::Pending);

            let second = session.submit_turn("second", None, &selection).await;
            assert_eq!(second, TurnOutcome::Rejected(RejectReason::TurnInFlight));
            assert_eq!(session.transcript().len(), 1);

            gate.send(Ok(reply("run-3", "done"))).ok();
        });

        assert!(matches!(first, TurnOutcome::Completed { .. }));
        assert_eq!(backend.chat_requests().len(), 1);
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn malformed_reply_is_reported_as_such() {
        let (backend, session) = session();
        backend.push_chat(Err(ApiError::InvalidResponse(
            "POST /api/chat: missing field `run_id`".into(),
        )));
        let outcome = session
            .submit_turn("hello", None, &ToolSelection::default())
            .await;
        assert!(matches!(
            outcome,
            TurnOutcome::Failed(FetchFailure {
                kind: FailureKind::MalformedResponse,
                ..
            })
        ));
    }

    #[test]
    fn blank_greeting_starts_empty() {
        let session = SessionCoordinator::with_greeting(Arc::new(MockBackend::new()), " ");
        assert!(session.transcript().is_empty());
    }
}
