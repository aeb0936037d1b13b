//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use runlens::types::RunStatus;

/// Operator console for agent runs: chat with the agent, inspect run traces,
/// browse tools and models.
#[derive(Debug, Parser)]
#[command(name = "runlens", version)]
pub struct Args {
    /// Path to config file (default: ./runlens.toml or ~/.config/runlens/runlens.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Override the backend API base URL.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Override the model sent with chat turns.
    #[arg(short = 'm', long = "model", global = true)]
    pub model: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log debug output to stderr (RUNLENS_LOG takes precedence).
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with the agent. With a prompt, sends one turn and exits.
    Chat {
        prompt: Option<String>,
        /// Attach a tool to the turn (repeatable). Use `auto` for auto mode.
        #[arg(short = 't', long = "tool")]
        tools: Vec<String>,
    },
    /// Inspect runs.
    #[command(subcommand)]
    Runs(RunsCommand),
    /// Browse the tool catalog.
    #[command(subcommand)]
    Tools(ToolsCommand),
    /// List models the backend offers.
    Models,
}

#[derive(Debug, Subcommand)]
pub enum RunsCommand {
    /// List recent runs.
    List {
        /// Page size (1-100).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        /// Only runs with this status (running, completed, failed).
        #[arg(long, value_parser = parse_status)]
        status: Option<RunStatus>,
    },
    /// Show one run's trace.
    Show {
        id: String,
        /// Keep polling while the run is still running.
        #[arg(short = 'f', long)]
        follow: bool,
    },
    /// Delete a run and its trace.
    Delete { id: String },
    /// Aggregate run counts.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// List every tool, enabled or not.
    List,
    /// Show one tool with its parameter schema.
    Show { id: String },
}

fn parse_status(raw: &str) -> Result<RunStatus, String> {
    match RunStatus::parse(raw) {
        RunStatus::Other(other) => Err(format!(
            "unknown status `{other}` (expected running, completed or failed)"
        )),
        status => Ok(status),
    }
}
