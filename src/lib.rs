//! runlens: an operator console for agent runs.
//!
//! The crate drives an agent backend over its JSON API: a chat playground
//! that submits turns with a chosen model and tool selection, a run inspector
//! that replays a run's heterogeneous step trace, and catalog views for tools,
//! models and run statistics.
//!
//! # Quick start
//!
//! ```no_run
//! use runlens::api::ApiClient;
//! use runlens::config::load_config;
//! use runlens::runs::RunRegistry;
//! use runlens::types::RunQuery;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let loaded = load_config(None).unwrap();
//! let backend = Arc::new(ApiClient::new(&loaded.config.backend));
//! let registry = RunRegistry::new(backend);
//! registry.list_runs(&RunQuery::default()).await;
//! if let Some(run) = registry.active_run_detail() {
//!     println!("{} steps", run.steps.len());
//! }
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod repl;
pub mod runs;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod testsupport;
pub mod tools;
pub mod trace;
pub mod types;
