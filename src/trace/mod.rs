//! Run-trace model and interpreter.
//!
//! - `step`: typed steps and raw-record normalization.
//! - `interpret`: total raw-to-typed mapping plus the incremental `TraceView`.

mod interpret;
mod step;

pub use interpret::{interpret, project, TraceView};
pub use step::{normalize_text, Step, StepBody, StepKind};
