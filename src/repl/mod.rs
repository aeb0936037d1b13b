//! Interactive chat playground.
//!
//! Lines starting with `/` are slash commands (see [`commands`]); anything
//! else is sent as a chat turn with the current model and tool selection.
//! [`Playground::handle_line`] does the work and returns the text to print,
//! so the loop in [`Playground::run`] only moves lines between the terminal
//! and the playground.

pub mod commands;

use crate::api::Backend;
use crate::config::Config;
use crate::render::{self, Palette};
use crate::runs::RunRegistry;
use crate::session::{RejectReason, SessionCoordinator, TurnOutcome};
use crate::tools::{ToolCatalog, ToolSelection, AUTO_TOOL_ID};
use commands::{help_text, parse_slash_command, SlashCommandAction};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// What the loop should do after one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplStep {
    Continue(String),
    Quit,
}

pub struct Playground<B: Backend> {
    session: SessionCoordinator<B>,
    catalog: ToolCatalog<B>,
    runs: RunRegistry<B>,
    selection: ToolSelection,
    model: Option<String>,
    palette: Palette,
}

impl<B: Backend> Playground<B> {
    pub fn new(backend: Arc<B>, config: &Config) -> Self {
        Self {
            session: SessionCoordinator::with_greeting(
                Arc::clone(&backend),
                &config.playground.greeting,
            ),
            catalog: ToolCatalog::new(Arc::clone(&backend)),
            runs: RunRegistry::new(backend),
            selection: ToolSelection::initial(config.playground.auto_tools),
            model: config.playground.model.clone(),
            palette: Palette::new(config.display.color),
        }
    }

    pub fn selection(&self) -> &ToolSelection {
        &self.selection
    }

    /// Status line shown above the prompt.
    pub fn status_line(&self) -> String {
        format!(
            "model: {} | tools: {}",
            self.model.as_deref().unwrap_or("backend default"),
            self.selection
        )
    }

    /// Rendered transcript so far (the greeting, on a fresh session).
    pub fn transcript(&self) -> String {
        self.session
            .transcript()
            .iter()
            .map(|entry| render::transcript_entry(&self.palette, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn handle_line(&mut self, line: &str) -> ReplStep {
        let Some(action) = parse_slash_command(line) else {
            return ReplStep::Continue(self.submit(line).await);
        };
        let output = match action {
            SlashCommandAction::Quit => return ReplStep::Quit,
            SlashCommandAction::Help => help_text(),
            SlashCommandAction::Tools => self.show_tools().await,
            SlashCommandAction::Tool(None) => "usage: /tool <id>".to_string(),
            SlashCommandAction::Tool(Some(id)) => self.toggle_tool(&id).await,
            SlashCommandAction::Auto => {
                self.selection.toggle(AUTO_TOOL_ID);
                format!("tools: {}", self.selection)
            }
            SlashCommandAction::ClearTools => {
                self.selection.clear();
                format!("tools: {}", self.selection)
            }
            SlashCommandAction::Model(None) => self.show_models().await,
            SlashCommandAction::Model(Some(name)) => {
                self.model = Some(name);
                self.status_line()
            }
            SlashCommandAction::Run(id) => self.show_run(id).await,
            SlashCommandAction::Unknown(name) => format!("unknown command {name}; try /help"),
        };
        ReplStep::Continue(output)
    }

    async fn submit(&self, text: &str) -> String {
        let model = self.catalog.resolve_model(self.model.as_deref());
        match self
            .session
            .submit_turn(text, model.as_deref(), &self.selection)
            .await
        {
            TurnOutcome::Rejected(RejectReason::EmptyInput) => String::new(),
            TurnOutcome::Rejected(RejectReason::TurnInFlight) => {
                "a turn is already in flight".to_string()
            }
            TurnOutcome::Completed { .. } | TurnOutcome::Failed(_) => self
                .session
                .transcript()
                .last()
                .map(|entry| render::transcript_entry(&self.palette, entry))
                .unwrap_or_default(),
        }
    }

    /// Apply tools requested before the loop starts (`chat -t`). Refused ids
    /// are an error, not a silent change of selection.
    pub async fn preselect_tools(&mut self, ids: &[String]) -> Result<(), String> {
        self.catalog.apply_tool_flags(&mut self.selection, ids).await
    }

    async fn show_tools(&self) -> String {
        let state = self.catalog.ensure_tools().await;
        let enabled = self.catalog.enabled_tools();
        render::loadable(&self.palette, &state, "tools", |_| {
            render::tool_list(&self.palette, &enabled, &self.selection)
        })
    }

    async fn toggle_tool(&mut self, id: &str) -> String {
        match self.catalog.toggle_checked(&mut self.selection, id).await {
            Ok(()) => format!("tools: {}", self.selection),
            Err(id) => format!("no enabled tool `{id}`; see /tools"),
        }
    }

    async fn show_models(&self) -> String {
        let state = self.catalog.load_models().await;
        let current = self.catalog.resolve_model(self.model.as_deref());
        render::loadable(&self.palette, &state, "models", |catalog| {
            render::model_list(&self.palette, catalog, current.as_deref())
        })
    }

    async fn show_run(&self, id: Option<String>) -> String {
        let Some(id) = id.or_else(|| self.session.last_run_id()) else {
            return "no run yet; send a message or use /run <id>".to_string();
        };
        let state = self.runs.select_run(&id).await;
        render::loadable(&self.palette, &state, "run", |run| {
            render::run_detail(&self.palette, run)
        })
    }

    /// Read lines from `input` until EOF or `/quit`, writing output to `out`.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        writeln!(out, "{}", self.transcript())?;
        loop {
            write!(out, "[{}]\n> ", self.status_line())?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match self.handle_line(&line).await {
                ReplStep::Quit => break,
                ReplStep::Continue(output) if output.is_empty() => {}
                ReplStep::Continue(output) => writeln!(out, "{output}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{detail, tool, unavailable, MockBackend};
    use crate::types::{ChatResponse, ModelCatalog, RawStep, RunStatus};
    use serde_json::json;

    fn playground() -> (Arc<MockBackend>, Playground<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let mut config = Config::default();
        config.display.color = false;
        (Arc::clone(&backend), Playground::new(backend, &config))
    }

    #[tokio::test]
    async fn tool_commands_drive_the_selection() {
        let (backend, mut pg) = playground();
        backend.push_tools(Ok(vec![
            tool("web-search", true),
            tool("calculator", true),
            tool("code-exec", false),
        ]));

        assert_eq!(
            pg.handle_line("/tool calculator").await,
            ReplStep::Continue("tools: calculator".into())
        );
        pg.handle_line("/tool web-search").await;
        assert_eq!(
            pg.selection(),
            &ToolSelection::explicit(["calculator", "web-search"])
        );

        let ReplStep::Continue(out) = pg.handle_line("/tool code-exec").await else {
            panic!("expected output");
        };
        assert!(out.contains("no enabled tool"), "{out}");

        pg.handle_line("/auto").await;
        assert!(pg.selection().is_auto());
        pg.handle_line("/clear-tools").await;
        assert_eq!(pg.selection(), &ToolSelection::default());
    }

    #[tokio::test]
    async fn preselected_tools_are_checked_against_the_catalog() {
        let (backend, mut pg) = playground();
        backend.push_tools(Ok(vec![tool("web-search", true), tool("code-exec", false)]));

        let err = pg
            .preselect_tools(&["web-search".into(), "code-exec".into()])
            .await
            .unwrap_err();
        assert!(err.contains("no enabled tool `code-exec`"), "{err}");
        assert_eq!(pg.selection(), &ToolSelection::explicit(["web-search"]));

        pg.preselect_tools(&["auto".into()]).await.unwrap();
        assert!(pg.selection().is_auto());
    }

    #[tokio::test]
    async fn preselected_tools_pass_when_catalog_is_unavailable() {
        let (backend, mut pg) = playground();
        backend.push_tools(Err(unavailable()));
        pg.preselect_tools(&["calculator".into()]).await.unwrap();
        assert_eq!(pg.selection(), &ToolSelection::explicit(["calculator"]));
    }

    #[tokio::test]
    async fn tools_listing_hides_disabled_tools() {
        let (backend, mut pg) = playground();
        backend.push_tools(Ok(vec![tool("web-search", true), tool("code-exec", false)]));
        let ReplStep::Continue(out) = pg.handle_line("/tools").await else {
            panic!("expected output");
        };
        assert!(out.contains("web-search"));
        assert!(!out.contains("code-exec"));
    }

    #[tokio::test]
    async fn chat_line_sends_selection_and_model() {
        let (backend, mut pg) = playground();
        backend.push_chat(Ok(ChatResponse {
            response: "Hi there".into(),
            run_id: "run-9".into(),
        }));
        pg.handle_line("/model Claude Haiku 4.5").await;
        pg.handle_line("/auto").await;

        let step = pg.handle_line("hello").await;
        assert_eq!(step, ReplStep::Continue("agent: Hi there\nrun: run-9".into()));
        let sent = &backend.chat_requests()[0];
        assert_eq!(sent.model.as_deref(), Some("Claude Haiku 4.5"));
        assert_eq!(sent.tools, None);
    }

    #[tokio::test]
    async fn failed_turn_prints_diagnostic() {
        let (backend, mut pg) = playground();
        backend.push_chat(Err(unavailable()));
        let ReplStep::Continue(out) = pg.handle_line("hello").await else {
            panic!("expected output");
        };
        assert!(out.starts_with("agent: Error: "), "{out}");
        assert!(out.ends_with("Ensure backend is running."), "{out}");
    }

    #[tokio::test]
    async fn run_command_defaults_to_last_turn() {
        let (backend, mut pg) = playground();
        assert!(matches!(
            pg.handle_line("/run").await,
            ReplStep::Continue(out) if out.starts_with("no run yet")
        ));

        backend.push_chat(Ok(ChatResponse {
            response: "done".into(),
            run_id: "run-7".into(),
        }));
        pg.handle_line("search for x").await;
        backend.push_run(
            "run-7",
            Ok(detail(
                "run-7",
                RunStatus::Completed,
                vec![RawStep::new(
                    "tool-call",
                    json!({"toolName": "search", "params": {"q": "x"}}),
                )],
            )),
        );
        let ReplStep::Continue(out) = pg.handle_line("/run").await else {
            panic!("expected output");
        };
        assert!(out.contains("Tool Call search"), "{out}");
        assert_eq!(backend.run_fetches(), vec!["run-7"]);
    }

    #[tokio::test]
    async fn model_listing_marks_backend_default() {
        let (backend, mut pg) = playground();
        backend.push_models(Ok(ModelCatalog {
            models: vec!["Gemini 2.5 Flash".into(), "GPT-5.1".into()],
            default: "Gemini 2.5 Flash".into(),
        }));
        assert_eq!(
            pg.handle_line("/model").await,
            ReplStep::Continue("* Gemini 2.5 Flash (default)\n  GPT-5.1".into())
        );
    }

    #[tokio::test]
    async fn loop_stops_at_quit() {
        let (_backend, mut pg) = playground();
        let input: &[u8] = b"/help\n/quit\n/tools\n";
        let mut out = Vec::new();
        pg.run(input, &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("/clear-tools"));
        assert!(!out.contains("Could not load tools"));
    }
}
