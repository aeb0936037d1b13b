//! Run registry: the run list and the active run's detail.
//!
//! Both resources are fetched through a [`Backend`] and exposed as
//! [`Loadable`] states. Each resource has its own [`Generation`] so that when
//! fetches overlap only the most recently issued one is applied; a response
//! that arrives for a superseded fetch is logged and dropped.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`, so the registry can be shared by reference between futures
//! driven concurrently on one task.

use crate::api::Backend;
use crate::error::{ApiError, FetchFailure};
use crate::state::{Generation, Loadable};
use crate::trace::{Step, TraceView};
use crate::types::{RunDetail, RunQuery, RunStats, RunStatus, RunSummary};
use std::sync::{Arc, Mutex, MutexGuard};

/// Snapshot of one run with its interpreted trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: String,
    pub name: String,
    pub status: RunStatus,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
    pub user_query: String,
    pub steps: Vec<Step>,
}

impl Run {
    fn from_detail(detail: &RunDetail, name: Option<String>, steps: Vec<Step>) -> Self {
        Self {
            id: detail.id.clone(),
            name: name.unwrap_or_else(|| fallback_name(&detail.id)),
            status: detail.status.clone(),
            created_at: detail.created_at.clone(),
            completed_at: detail.completed_at.clone(),
            user_query: detail.user_query.clone(),
            steps,
        }
    }
}

/// Display name used when the backend provides none.
pub fn fallback_name(id: &str) -> String {
    let short: String = id.chars().take(8).collect();
    format!("Run {short}")
}

#[derive(Default)]
struct RegistryState {
    runs: Loadable<Vec<RunSummary>>,
    runs_generation: Generation,
    active_id: Option<String>,
    detail: Loadable<Run>,
    detail_generation: Generation,
    trace: TraceView,
}

impl RegistryState {
    fn known_name(&self, id: &str) -> Option<String> {
        self.runs
            .ready()?
            .iter()
            .find(|summary| summary.id == id)
            .map(|summary| summary.name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn clear_active(&mut self) {
        self.active_id = None;
        self.detail = Loadable::Idle;
        self.detail_generation.invalidate();
        self.trace = TraceView::new();
    }
}

pub struct RunRegistry<B: Backend> {
    backend: Arc<B>,
    state: Mutex<RegistryState>,
}

impl<B: Backend> RunRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(RegistryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // State stays consistent across a poisoning panic; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch run summaries. Returns the list state after this fetch settles,
    /// which is a newer fetch's state if this one was superseded.
    pub async fn list_runs(&self, query: &RunQuery) -> Loadable<Vec<RunSummary>> {
        let ticket = {
            let mut state = self.lock();
            state.runs = Loadable::Loading;
            state.runs_generation.begin()
        };

        let result = self.backend.list_runs(query).await;

        let mut state = self.lock();
        if !state.runs_generation.is_current(ticket) {
            tracing::debug!(ticket, "discarding stale run list response");
            return state.runs.clone();
        }
        state.runs = match result {
            Ok(runs) => {
                tracing::debug!(count = runs.len(), "run list loaded");
                Loadable::from_list(runs)
            }
            Err(err) => {
                tracing::warn!(error = %err, "run list fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        };
        state.runs.clone()
    }

    /// Make `id` the active run and load its detail.
    ///
    /// The detail state becomes `Loading` before the request is sent, so the
    /// previous run's detail is never shown under the new id.
    pub async fn select_run(&self, id: &str) -> Loadable<Run> {
        let ticket = {
            let mut state = self.lock();
            state.active_id = Some(id.to_string());
            state.detail = Loadable::Loading;
            state.trace = TraceView::new();
            state.detail_generation.begin()
        };

        let result = self.backend.get_run(id).await;
        self.apply_detail(ticket, id, result)
    }

    /// Re-fetch the active run and extend its trace with any new steps.
    ///
    /// Unlike [`RunRegistry::select_run`] the current detail stays visible
    /// while the request is in flight.
    pub async fn refresh_active(&self) -> Loadable<Run> {
        let (ticket, id) = {
            let mut state = self.lock();
            let Some(id) = state.active_id.clone() else {
                return state.detail.clone();
            };
            (state.detail_generation.begin(), id)
        };

        let result = self.backend.get_run(&id).await;
        self.apply_detail(ticket, &id, result)
    }

    fn apply_detail(
        &self,
        ticket: u64,
        id: &str,
        result: Result<RunDetail, ApiError>,
    ) -> Loadable<Run> {
        let mut state = self.lock();
        if !state.detail_generation.is_current(ticket) {
            tracing::debug!(run_id = id, ticket, "discarding stale run detail response");
            return state.detail.clone();
        }
        state.detail = match result {
            Ok(detail) => {
                let added = state.trace.refresh(&detail.steps);
                tracing::debug!(run_id = id, added, total = state.trace.len(), "run detail loaded");
                let name = state.known_name(&detail.id);
                Loadable::Ready(Run::from_detail(&detail, name, state.trace.steps().to_vec()))
            }
            Err(err) => {
                tracing::warn!(run_id = id, error = %err, "run detail fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        };
        state.detail.clone()
    }

    /// Delete a run on the backend, then forget it locally.
    ///
    /// Sent once; a failure leaves local state untouched.
    pub async fn delete_run(&self, id: &str) -> Result<String, ApiError> {
        let response = self.backend.delete_run(id).await?;
        tracing::info!(run_id = id, "run deleted");

        let mut state = self.lock();
        if let Loadable::Ready(runs) = &state.runs {
            let remaining: Vec<RunSummary> =
                runs.iter().filter(|run| run.id != id).cloned().collect();
            state.runs = Loadable::from_list(remaining);
        }
        if state.active_id.as_deref() == Some(id) {
            state.clear_active();
        }
        Ok(response.message)
    }

    /// Aggregate counts across all runs.
    pub async fn stats(&self) -> Loadable<RunStats> {
        match self.backend.run_stats().await {
            Ok(stats) if stats.total == 0 => Loadable::Empty,
            Ok(stats) => Loadable::Ready(stats),
            Err(err) => {
                tracing::warn!(error = %err, "run stats fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        }
    }

    pub fn active_run_detail(&self) -> Option<Run> {
        self.lock().detail.ready().cloned()
    }

    pub fn active_id(&self) -> Option<String> {
        self.lock().active_id.clone()
    }

    pub fn runs_state(&self) -> Loadable<Vec<RunSummary>> {
        self.lock().runs.clone()
    }

    pub fn detail_state(&self) -> Loadable<Run> {
        self.lock().detail.clone()
    }
}
