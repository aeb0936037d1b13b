//! Tool and model catalogs fetched from the backend.
//!
//! Same load-state contract as the run registry: `Loading`, `Empty`,
//! `Ready` and `Unavailable` are distinct, and a tool detail that arrives
//! after the operator has moved on to another tool is dropped.

use super::selection::{ToolSelection, AUTO_TOOL_ID};
use crate::api::Backend;
use crate::error::FetchFailure;
use crate::state::{Generation, Loadable};
use crate::types::{ModelCatalog, ToolDescriptor};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct CatalogState {
    tools: Loadable<Vec<ToolDescriptor>>,
    tools_generation: Generation,
    detail: Loadable<ToolDescriptor>,
    detail_generation: Generation,
    models: Loadable<ModelCatalog>,
}

pub struct ToolCatalog<B: Backend> {
    backend: Arc<B>,
    state: Mutex<CatalogState>,
}

impl<B: Backend> ToolCatalog<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(CatalogState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch every tool the backend knows about, enabled or not.
    pub async fn load_tools(&self) -> Loadable<Vec<ToolDescriptor>> {
        let ticket = {
            let mut state = self.lock();
            state.tools = Loadable::Loading;
            state.tools_generation.begin()
        };

        let result = self.backend.list_tools().await;

        let mut state = self.lock();
        if !state.tools_generation.is_current(ticket) {
            tracing::debug!(ticket, "discarding stale tool list response");
            return state.tools.clone();
        }
        state.tools = match result {
            Ok(tools) => Loadable::from_list(tools),
            Err(err) => {
                tracing::warn!(error = %err, "tool list fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        };
        state.tools.clone()
    }

    /// Tools the playground may attach to a turn.
    pub fn enabled_tools(&self) -> Vec<ToolDescriptor> {
        self.lock()
            .tools
            .ready()
            .map(|tools| tools.iter().filter(|tool| tool.enabled).cloned().collect())
            .unwrap_or_default()
    }

    /// Reuse a loaded tool list, fetching it otherwise.
    pub async fn ensure_tools(&self) -> Loadable<Vec<ToolDescriptor>> {
        match self.tools_state() {
            Loadable::Ready(tools) => Loadable::Ready(tools),
            _ => self.load_tools().await,
        }
    }

    /// Toggle `id` in `selection`, refusing ids the loaded catalog does not
    /// list as enabled. `auto` and removing an existing pick always pass, as
    /// does anything while the catalog cannot be loaded.
    ///
    /// On refusal the trimmed id is returned and `selection` is untouched.
    pub async fn toggle_checked(
        &self,
        selection: &mut ToolSelection,
        id: &str,
    ) -> Result<(), String> {
        let id = id.trim();
        if !id.is_empty() && id != AUTO_TOOL_ID && !selection.contains(id) {
            if let Loadable::Ready(_) = self.ensure_tools().await {
                if !self.enabled_tools().iter().any(|tool| tool.id == id) {
                    tracing::debug!(tool_id = id, "refusing unknown or disabled tool");
                    return Err(id.to_string());
                }
            }
        }
        selection.toggle(id);
        Ok(())
    }

    /// Apply tool ids given up front (`chat -t`), stopping at the first one
    /// that is refused.
    pub async fn apply_tool_flags(
        &self,
        selection: &mut ToolSelection,
        ids: &[String],
    ) -> Result<(), String> {
        for id in ids {
            self.toggle_checked(selection, id)
                .await
                .map_err(|id| format!("no enabled tool `{id}`; see `runlens tools list`"))?;
        }
        Ok(())
    }

    /// Load one tool with its parameter schema.
    pub async fn select_tool(&self, id: &str) -> Loadable<ToolDescriptor> {
        let ticket = {
            let mut state = self.lock();
            state.detail = Loadable::Loading;
            state.detail_generation.begin()
        };

        let result = self.backend.get_tool(id).await;

        let mut state = self.lock();
        if !state.detail_generation.is_current(ticket) {
            tracing::debug!(tool_id = id, "discarding stale tool detail response");
            return state.detail.clone();
        }
        state.detail = match result {
            Ok(tool) => Loadable::Ready(tool),
            Err(err) => {
                tracing::warn!(tool_id = id, error = %err, "tool detail fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        };
        state.detail.clone()
    }

    pub async fn load_models(&self) -> Loadable<ModelCatalog> {
        self.lock().models = Loadable::Loading;
        let models = match self.backend.list_models().await {
            Ok(catalog) if catalog.models.is_empty() => Loadable::Empty,
            Ok(catalog) => Loadable::Ready(catalog),
            Err(err) => {
                tracing::warn!(error = %err, "model catalog fetch failed");
                Loadable::Unavailable(FetchFailure::from(err))
            }
        };
        self.lock().models = models.clone();
        models
    }

    /// Model to send with a turn: the requested one, else the catalog
    /// default once loaded, else none (backend default).
    pub fn resolve_model(&self, requested: Option<&str>) -> Option<String> {
        let state = self.lock();
        match requested.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                if let Some(catalog) = state.models.ready() {
                    if !catalog.contains(name) {
                        tracing::warn!(model = name, "model not in backend catalog");
                    }
                }
                Some(name.to_string())
            }
            None => state.models.ready().map(|catalog| catalog.default.clone()),
        }
    }

    pub fn tools_state(&self) -> Loadable<Vec<ToolDescriptor>> {
        self.lock().tools.clone()
    }

    pub fn detail_state(&self) -> Loadable<ToolDescriptor> {
        self.lock().detail.clone()
    }

    pub fn models_state(&self) -> Loadable<ModelCatalog> {
        self.lock().models.clone()
    }
}
