use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::mannerism::Position;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

/// Position mode as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    Start,
    Middle,
    End,
}

impl From<PositionArg> for Position {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Start => Position::Start,
            PositionArg::Middle => Position::Middle,
            PositionArg::End => Position::End,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "mannerisms",
    about = "Speech mannerism checks for tabletop chat messages",
    version,
    after_help = "Logs are written to: ~/.local/share/mannerisms/logs/mannerisms.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to mannerisms.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check text against a mannerism without touching the store
    Check {
        /// Mannerism text
        #[arg(long, short)]
        pattern: String,

        /// Where the mannerism must appear
        #[arg(long, value_enum, default_value = "middle")]
        position: PositionArg,

        /// Message body (reads from stdin if not provided)
        text: Option<String>,
    },

    /// Handle hook events from the host
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Manage actor mannerisms
    Rule {
        #[command(subcommand)]
        action: RuleAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum HookAction {
    /// Dispatch a hook event to handlers
    Dispatch {
        /// Event type (preCreateChatMessage, beforeMessageCreate)
        event: String,

        /// Event payload JSON (reads from stdin if not provided)
        #[arg(long)]
        payload: Option<String>,

        /// Local user id (overrides gate.local_user)
        #[arg(long)]
        user: Option<String>,
    },

    /// List registered hook handlers
    List {
        /// Filter by event type
        #[arg(long)]
        event: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RuleAction {
    /// Set an actor's mannerism; an empty mannerism clears it
    Set {
        /// Actor id
        actor: String,

        /// Mannerism text
        mannerism: String,

        /// Where the mannerism must appear (start, middle, end)
        #[arg(long, default_value = "middle")]
        position: String,

        /// Actor display name (required for actors not yet in the store)
        #[arg(long)]
        name: Option<String>,
    },

    /// Clear an actor's mannerism
    Clear {
        /// Actor id
        actor: String,
    },

    /// Show an actor's mannerism
    Show {
        /// Actor id
        actor: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// List actors and their mannerisms
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}
