//! Tool selection for chat turns and the backend's tool catalog.

mod catalog;
mod selection;

pub use catalog::ToolCatalog;
pub use selection::{PickedTools, ToolSelection, AUTO_TOOL_ID};
