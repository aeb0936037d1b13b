//! Slash-command metadata and parsing for the playground.

/// Static slash command metadata used by parsing and `/help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub name: &'static str,
    pub description: &'static str,
}

pub const SLASH_COMMANDS: [SlashCommand; 8] = [
    SlashCommand {
        name: "/tools",
        description: "List enabled tools and the current selection.",
    },
    SlashCommand {
        name: "/tool",
        description: "Toggle a tool for the next turn: /tool <id>.",
    },
    SlashCommand {
        name: "/auto",
        description: "Toggle auto mode (the agent picks its own tools).",
    },
    SlashCommand {
        name: "/clear-tools",
        description: "Detach every tool and leave auto mode.",
    },
    SlashCommand {
        name: "/model",
        description: "Show models, or switch: /model [name].",
    },
    SlashCommand {
        name: "/run",
        description: "Inspect a run trace: /run [id] (default: last turn).",
    },
    SlashCommand {
        name: "/help",
        description: "List available slash commands.",
    },
    SlashCommand {
        name: "/quit",
        description: "Exit the playground.",
    },
];

/// Parsed slash command actions consumed by the playground loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommandAction {
    Tools,
    Tool(Option<String>),
    Auto,
    ClearTools,
    /// Model names may contain spaces, so this keeps the rest of the line.
    Model(Option<String>),
    Run(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

/// Parse a slash command from user input.
///
/// Returns `None` if the input is not a slash command.
pub fn parse_slash_command(input: &str) -> Option<SlashCommandAction> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (token, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (trimmed, ""),
    };
    let first_arg = rest.split_whitespace().next().map(str::to_string);
    let rest_arg = (!rest.is_empty()).then(|| rest.to_string());

    let action = match token.to_ascii_lowercase().as_str() {
        "/" | "/help" => SlashCommandAction::Help,
        "/quit" | "/exit" | "/q" => SlashCommandAction::Quit,
        "/tools" => SlashCommandAction::Tools,
        "/tool" => SlashCommandAction::Tool(first_arg),
        "/auto" => SlashCommandAction::Auto,
        "/clear-tools" => SlashCommandAction::ClearTools,
        "/model" => SlashCommandAction::Model(rest_arg),
        "/run" => SlashCommandAction::Run(first_arg),
        other => SlashCommandAction::Unknown(other.to_string()),
    };

    Some(action)
}

/// `/help` text.
pub fn help_text() -> String {
    SLASH_COMMANDS
        .iter()
        .map(|cmd| format!("{:<13} {}", cmd.name, cmd.description))
        .collect::<Vec<_>>()
        .join("\n")
}
