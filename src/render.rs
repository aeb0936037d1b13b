//! Terminal rendering for traces, runs, tools and the chat transcript.
//!
//! Every function returns a `String` so output can be asserted in tests and
//! written to stdout by the caller. Color is applied with `crossterm` styling
//! only when the [`Palette`] enables it.

use crate::runs::Run;
use crate::session::{EntryKind, EntryPhase, Role, TranscriptEntry};
use crate::state::Loadable;
use crate::tools::{ToolSelection, AUTO_TOOL_ID};
use crate::trace::{Step, StepBody};
use crate::types::{ModelCatalog, RunStats, RunStatus, RunSummary, ToolDescriptor};
use crossterm::style::{Color, Stylize};
use serde_json::Value;
use std::fmt::Write as _;

/// Tool output beyond this many lines is cut with a marker.
const MAX_RESULT_LINES: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Color::DarkGrey)
    }
}

fn status_color(status: &RunStatus) -> Color {
    match status {
        RunStatus::Running => Color::Yellow,
        RunStatus::Completed => Color::Green,
        RunStatus::Failed => Color::Red,
        RunStatus::Other(_) => Color::Grey,
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn clip_lines(text: &str, max_lines: usize) -> String {
    let total = text.lines().count();
    if total <= max_lines {
        return text.to_string();
    }
    let mut kept: Vec<&str> = text.lines().take(max_lines).collect();
    let marker = format!("... ({} more lines)", total - max_lines);
    kept.push(marker.as_str());
    kept.join("\n")
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render one trace step with the handler for its kind.
pub fn step(palette: &Palette, index: usize, step: &Step) -> String {
    let title = format!("{:>2}. {}", index + 1, step.kind().title());
    let body = match &step.body {
        StepBody::UserRequest { text } => user_request(palette, &title, text),
        StepBody::AgentThought { text } => agent_thought(palette, &title, text),
        StepBody::ToolCall { tool_name, params } => tool_call(palette, &title, tool_name, params),
        StepBody::ToolResult { tool_name, result } => {
            tool_result(palette, &title, tool_name, result)
        }
        StepBody::AgentResponse { text } => agent_response(palette, &title, text),
    };
    match &step.timestamp {
        Some(ts) => format!("{body}\n{}", indent(&palette.dim(ts), "    ")),
        None => body,
    }
}

fn user_request(palette: &Palette, title: &str, text: &str) -> String {
    format!(
        "{}\n{}",
        palette.paint(title, Color::Cyan),
        indent(text, "    ")
    )
}

fn agent_thought(palette: &Palette, title: &str, text: &str) -> String {
    format!(
        "{}\n{}",
        palette.paint(title, Color::Magenta),
        palette.dim(&indent(text, "    "))
    )
}

fn tool_call(palette: &Palette, title: &str, tool_name: &str, params: &Value) -> String {
    let name = if tool_name.is_empty() {
        "(unnamed tool)"
    } else {
        tool_name
    };
    format!(
        "{} {}\n{}",
        palette.paint(title, Color::Blue),
        palette.heading(name),
        indent(&pretty_json(params), "    ")
    )
}

fn tool_result(palette: &Palette, title: &str, tool_name: &str, result: &str) -> String {
    let mut out = palette.paint(title, Color::DarkCyan);
    if !tool_name.is_empty() {
        let _ = write!(out, " {}", palette.heading(tool_name));
    }
    if !result.is_empty() {
        let _ = write!(out, "\n{}", indent(&clip_lines(result, MAX_RESULT_LINES), "    "));
    }
    out
}

fn agent_response(palette: &Palette, title: &str, text: &str) -> String {
    format!(
        "{}\n{}",
        palette.paint(title, Color::Green),
        indent(text, "    ")
    )
}

/// Full run view: header, query, then every step in order.
pub fn run_detail(palette: &Palette, run: &Run) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        palette.heading(&run.name),
        palette.paint(run.status.as_str(), status_color(&run.status))
    );
    let _ = writeln!(out, "{}", palette.dim(&format!("id: {}", run.id)));
    if let Some(created) = &run.created_at {
        let _ = writeln!(out, "{}", palette.dim(&format!("created: {created}")));
    }
    if let Some(completed) = &run.completed_at {
        let _ = writeln!(out, "{}", palette.dim(&format!("completed: {completed}")));
    }
    if !run.user_query.is_empty() {
        let _ = writeln!(out, "query: {}", run.user_query);
    }
    out.push('\n');
    if run.steps.is_empty() {
        out.push_str("No steps recorded.");
    } else {
        let blocks: Vec<String> = run
            .steps
            .iter()
            .enumerate()
            .map(|(index, s)| step(palette, index, s))
            .collect();
        out.push_str(&blocks.join("\n\n"));
    }
    out
}

pub fn run_list(palette: &Palette, runs: &[RunSummary]) -> String {
    runs.iter()
        .map(|run| {
            let status = format!("{:<10}", run.status.as_str());
            format!(
                "{}  {}  {:<8}  {}  {}",
                palette.dim(&run.id),
                palette.paint(&status, status_color(&run.status)),
                run.time,
                run.name,
                palette.dim(&run.user_query)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stats(palette: &Palette, stats: &RunStats) -> String {
    format!(
        "{}\ntotal:     {}\nrunning:   {}\ncompleted: {}\nfailed:    {}\nsuccess:   {:.1}%",
        palette.heading("Run statistics"),
        stats.total,
        stats.running,
        stats.completed,
        stats.failed,
        stats.success_rate()
    )
}

/// Tool picker listing with the auto switch first and `[x]` marks for the
/// current selection.
pub fn tool_list(palette: &Palette, tools: &[ToolDescriptor], selection: &ToolSelection) -> String {
    let mark = |on: bool| if on { "[x]" } else { "[ ]" };
    let mut rows = vec![format!(
        "{} {:<16} {}",
        mark(selection.is_auto()),
        AUTO_TOOL_ID,
        palette.dim("let the agent choose")
    )];
    for tool in tools {
        let mut row = format!(
            "{} {:<16} {}",
            mark(selection.contains(&tool.id)),
            tool.id,
            tool.description
        );
        if !tool.enabled {
            row = palette.dim(&format!("{row} (disabled)"));
        }
        rows.push(row);
    }
    rows.join("\n")
}

pub fn tool_detail(palette: &Palette, tool: &ToolDescriptor) -> String {
    let mut out = format!("{}  {}", palette.heading(&tool.name), palette.dim(&tool.id));
    if !tool.enabled {
        out.push_str(&palette.paint("  disabled", Color::Red));
    }
    if !tool.description.is_empty() {
        let _ = write!(out, "\n{}", tool.description);
    }
    if let Some(schema) = &tool.schema {
        let _ = write!(out, "\n\nparameters:\n{}", indent(&pretty_json(schema), "  "));
    }
    out
}

pub fn model_list(palette: &Palette, catalog: &ModelCatalog, current: Option<&str>) -> String {
    catalog
        .models
        .iter()
        .map(|model| {
            let marker = if Some(model.as_str()) == current { "*" } else { " " };
            let mut row = format!("{marker} {model}");
            if *model == catalog.default {
                row.push_str(&palette.dim(" (default)"));
            }
            row
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transcript_entry(palette: &Palette, entry: &TranscriptEntry) -> String {
    let label = match (entry.role, entry.kind) {
        (Role::User, _) => palette.paint("you", Color::Cyan),
        (Role::Assistant, EntryKind::Message) => palette.paint("agent", Color::Green),
        (Role::Assistant, EntryKind::Diagnostic) => palette.paint("agent", Color::Red),
    };
    let mut out = format!("{label}: {}", entry.content);
    if entry.phase == EntryPhase::Pending {
        out.push_str(&palette.dim(" (sending...)"));
    }
    if let Some(run_id) = &entry.run_id {
        let _ = write!(out, "\n{}", palette.dim(&format!("run: {run_id}")));
    }
    out
}

/// Render a load state, delegating to `ready` for data.
///
/// `what` names the resource in plural form, e.g. "runs".
pub fn loadable<T>(
    palette: &Palette,
    state: &Loadable<T>,
    what: &str,
    ready: impl FnOnce(&T) -> String,
) -> String {
    match state {
        Loadable::Idle => String::new(),
        Loadable::Loading => palette.dim(&format!("Loading {what}...")),
        Loadable::Empty => format!("No {what} yet."),
        Loadable::Ready(value) => ready(value),
        Loadable::Unavailable(failure) => {
            palette.paint(&format!("Could not load {what}: {failure}"), Color::Red)
        }
    }
}
