//! Which tools are attached to the next chat turn.
//!
//! The selection is either auto mode, where the backend picks tools itself,
//! or an explicit list of tool ids. The list is only built through
//! [`ToolSelection::explicit`] and [`ToolSelection::toggle`], which keep it
//! free of blanks, duplicates and the auto id.

use std::fmt;

/// Reserved id of the auto-mode switch in the tool list.
pub const AUTO_TOOL_ID: &str = "auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSelection {
    AutoOnly,
    /// Operator-pinned tools in the order they were picked. May be empty.
    Explicit(PickedTools),
}

/// Distinct concrete tool ids in pick order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickedTools(Vec<String>);

impl PickedTools {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, tool_id: &str) -> bool {
        self.0.iter().any(|id| id == tool_id)
    }
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self::Explicit(PickedTools::default())
    }
}

impl ToolSelection {
    /// Initial selection for a new session.
    pub fn initial(auto: bool) -> Self {
        if auto {
            Self::AutoOnly
        } else {
            Self::default()
        }
    }

    /// Explicit selection of `ids` in order. Blank ids, repeats and the auto
    /// id are skipped.
    pub fn explicit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut picked = PickedTools::default();
        for id in ids {
            let id = id.as_ref().trim();
            if !id.is_empty() && id != AUTO_TOOL_ID && !picked.contains(id) {
                picked.0.push(id.to_string());
            }
        }
        Self::Explicit(picked)
    }

    /// Flip one tool id, or the auto switch for [`AUTO_TOOL_ID`].
    ///
    /// Turning auto on drops explicit picks; turning it off leaves an empty
    /// explicit list rather than restoring the earlier picks. Picking a
    /// concrete tool while in auto mode leaves auto mode. Blank ids are
    /// ignored.
    pub fn toggle(&mut self, tool_id: &str) {
        let tool_id = tool_id.trim();
        if tool_id.is_empty() {
            return;
        }
        if tool_id == AUTO_TOOL_ID {
            *self = match self {
                Self::AutoOnly => Self::default(),
                Self::Explicit(_) => Self::AutoOnly,
            };
            return;
        }
        match self {
            Self::AutoOnly => *self = Self::explicit([tool_id]),
            Self::Explicit(PickedTools(ids)) => match ids.iter().position(|id| id == tool_id) {
                Some(index) => {
                    ids.remove(index);
                }
                None => ids.push(tool_id.to_string()),
            },
        }
    }

    /// Drop every pick and leave auto mode.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AutoOnly)
    }

    /// Whether `tool_id` is currently switched on; `"auto"` reports auto mode.
    pub fn contains(&self, tool_id: &str) -> bool {
        match self {
            Self::AutoOnly => tool_id == AUTO_TOOL_ID,
            Self::Explicit(picked) => picked.contains(tool_id),
        }
    }

    /// Explicitly picked ids; empty in auto mode.
    pub fn tool_ids(&self) -> &[String] {
        match self {
            Self::AutoOnly => &[],
            Self::Explicit(picked) => picked.as_slice(),
        }
    }

    /// Value of the outgoing request's `tools` field.
    ///
    /// Auto mode and an empty explicit list both omit the field and leave the
    /// choice to the backend. Only a non-empty explicit list is sent.
    pub fn to_request_tools(&self) -> Option<Vec<String>> {
        match self {
            Self::Explicit(picked) if !picked.is_empty() => Some(picked.as_slice().to_vec()),
            _ => None,
        }
    }
}

impl fmt::Display for ToolSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoOnly => write!(f, "auto"),
            Self::Explicit(picked) if picked.is_empty() => write!(f, "no tools"),
            Self::Explicit(picked) => write!(f, "{}", picked.as_slice().join(", ")),
        }
    }
}
