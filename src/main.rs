//! CLI entry point for runlens.

mod cli;

use clap::Parser;
use cli::{Args, Command, RunsCommand, ToolsCommand};
use runlens::api::{ApiClient, Backend};
use runlens::config::{apply_cli_overrides, load_config, CliOverrides, Config};
use runlens::render::{self, Palette};
use runlens::repl::Playground;
use runlens::runs::RunRegistry;
use runlens::session::{SessionCoordinator, TurnOutcome};
use runlens::state::Loadable;
use runlens::tools::{ToolCatalog, ToolSelection};
use runlens::types::RunQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Poll interval for `runs show --follow`.
const FOLLOW_INTERVAL: Duration = Duration::from_secs(2);
const LOG_ENV: &str = "RUNLENS_LOG";

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded.config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let overrides = CliOverrides {
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        no_color: args.no_color,
    };
    if let Err(e) = apply_cli_overrides(&mut config, &overrides) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let backend = Arc::new(ApiClient::new(&config.backend));
    tracing::debug!(base_url = backend.base_url(), "backend client ready");

    if let Err(msg) = dispatch(args.command, backend, &config).await {
        eprintln!("error: {msg}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout only carries rendered output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(
    command: Option<Command>,
    backend: Arc<ApiClient>,
    config: &Config,
) -> Result<(), String> {
    let palette = Palette::new(config.display.color);
    match command.unwrap_or(Command::Chat {
        prompt: None,
        tools: Vec::new(),
    }) {
        Command::Chat {
            prompt: Some(prompt),
            tools,
        } => one_shot(backend, config, &prompt, &tools).await,
        Command::Chat { prompt: None, tools } => {
            let mut playground = Playground::new(backend, config);
            playground.preselect_tools(&tools).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            playground
                .run(stdin, &mut std::io::stdout())
                .await
                .map_err(|e| format!("terminal: {e}"))
        }
        Command::Runs(cmd) => runs_command(cmd, backend, &palette).await,
        Command::Tools(cmd) => tools_command(cmd, backend, &palette).await,
        Command::Models => {
            let catalog = ToolCatalog::new(backend);
            let state = catalog.load_models().await;
            let current = catalog.resolve_model(config.playground.model.as_deref());
            print_state(&palette, &state, "models", |models| {
                render::model_list(&palette, models, current.as_deref())
            })
        }
    }
}

async fn one_shot<B: Backend>(
    backend: Arc<B>,
    config: &Config,
    prompt: &str,
    tools: &[String],
) -> Result<(), String> {
    let mut selection = ToolSelection::initial(config.playground.auto_tools);
    if !tools.is_empty() {
        ToolCatalog::new(Arc::clone(&backend))
            .apply_tool_flags(&mut selection, tools)
            .await?;
    }
    let session = SessionCoordinator::new(backend);
    match session
        .submit_turn(prompt, config.playground.model.as_deref(), &selection)
        .await
    {
        TurnOutcome::Completed { run_id, response } => {
            println!("{response}");
            eprintln!("run: {run_id}");
            Ok(())
        }
        TurnOutcome::Failed(failure) => Err(format!("{failure}. Ensure backend is running.")),
        TurnOutcome::Rejected(_) => Err("empty prompt".to_string()),
    }
}

async fn runs_command<B: Backend>(
    cmd: RunsCommand,
    backend: Arc<B>,
    palette: &Palette,
) -> Result<(), String> {
    let registry = RunRegistry::new(backend);
    match cmd {
        RunsCommand::List {
            limit,
            offset,
            status,
        } => {
            let query = RunQuery {
                limit,
                offset,
                status,
            };
            let state = registry.list_runs(&query).await;
            print_state(palette, &state, "runs", |runs| render::run_list(palette, runs))
        }
        RunsCommand::Show { id, follow } => {
            let state = registry.select_run(&id).await;
            print_state(palette, &state, "run", |run| render::run_detail(palette, run))?;
            if follow {
                follow_run(&registry, palette).await?;
            }
            Ok(())
        }
        RunsCommand::Delete { id } => {
            let message = registry.delete_run(&id).await.map_err(|e| e.to_string())?;
            println!("{message}");
            Ok(())
        }
        RunsCommand::Stats => {
            let state = registry.stats().await;
            print_state(palette, &state, "run statistics", |stats| {
                render::stats(palette, stats)
            })
        }
    }
}

/// Print steps as they are appended until the run leaves `running` or the
/// operator hits Ctrl-C.
async fn follow_run<B: Backend>(
    registry: &RunRegistry<B>,
    palette: &Palette,
) -> Result<(), String> {
    let mut printed = registry
        .active_run_detail()
        .map(|run| run.steps.len())
        .unwrap_or(0);
    loop {
        let still_running = registry
            .active_run_detail()
            .is_some_and(|run| run.status.is_active());
        if !still_running {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(FOLLOW_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        match registry.refresh_active().await {
            Loadable::Ready(run) => {
                for (index, step) in run.steps.iter().enumerate().skip(printed) {
                    println!("\n{}", render::step(palette, index, step));
                }
                printed = run.steps.len();
                if !run.status.is_active() {
                    println!("\nrun {}", run.status);
                }
            }
            Loadable::Unavailable(failure) => {
                return Err(format!("could not refresh run: {failure}"));
            }
            _ => {}
        }
    }
}

async fn tools_command<B: Backend>(
    cmd: ToolsCommand,
    backend: Arc<B>,
    palette: &Palette,
) -> Result<(), String> {
    let catalog = ToolCatalog::new(backend);
    match cmd {
        ToolsCommand::List => {
            let state = catalog.load_tools().await;
            print_state(palette, &state, "tools", |tools| {
                render::tool_list(palette, tools, &ToolSelection::default())
            })
        }
        ToolsCommand::Show { id } => {
            let state = catalog.select_tool(&id).await;
            print_state(palette, &state, "tool", |tool| render::tool_detail(palette, tool))
        }
    }
}

/// Print a load state; a failed fetch becomes the command's error.
fn print_state<T>(
    palette: &Palette,
    state: &Loadable<T>,
    what: &str,
    ready: impl FnOnce(&T) -> String,
) -> Result<(), String> {
    if let Loadable::Unavailable(failure) = state {
        return Err(format!("could not load {what}: {failure}"));
    }
    println!("{}", render::loadable(palette, state, what, ready));
    Ok(())
}
