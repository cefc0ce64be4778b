use anyhow::Result;
use clap::Parser;
use matrix_core::{config, Config};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod logging;

#[derive(Debug, Parser)]
#[command(name = "matrix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding config.toml (default: ~/.config/matrix)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Path to the history database (default: ~/.local/share/matrix/matrix.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `matrix_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Start the assistant (the default)
    ///
    /// Matrix greets you and then waits for its wake word. Type "matrix"
    /// on its own, or followed by a command ("matrix open chrome"), to
    /// wake it. While awake it takes commands until you say "go to sleep"
    /// or stay quiet for the configured timeout. "exit" or end of input
    /// (Ctrl-D) quits.
    ///
    /// Every command is stored in the history database unless
    /// --no-history is given.
    Run {
        /// Wake word to listen for
        #[arg(long)]
        wake_word: Option<String>,

        /// Seconds of silence before going idle
        #[arg(long)]
        timeout: Option<u64>,

        /// Don't keep conversation context ("show history" is disabled)
        #[arg(long)]
        no_context: bool,

        /// Don't record commands in the history database
        #[arg(long)]
        no_history: bool,
    },
    /// Run a single command without the wake word
    Exec {
        /// The command, e.g. `open chrome` or `search for rust`
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// List the commands Matrix understands
    Commands {
        /// Only show one category (apps, browser, media, ...)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show recently recorded commands
    History {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Delete all recorded commands instead
        #[arg(long)]
        clear: bool,
    },
    /// Show usage statistics from the history database
    Stats,
    /// Manage the contact book
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ContactsAction {
    /// List saved contacts
    List,
    /// Add or replace a contact
    Add {
        name: String,
        /// Phone number with country code, e.g. +919876543210
        phone: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Open WhatsApp with a message to a saved contact
    Send {
        name: String,
        message: String,
        /// Wait until this local time (HH:MM) before sending
        #[arg(long, value_parser = commands::contacts::parse_clock)]
        at: Option<(u32, u32)>,
    },
    /// Open a WhatsApp group chat from its invite link or code
    Group { group: String, message: String },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file without a key
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config_dir
        .as_ref()
        .map_or_else(config::config_file_path, |dir| dir.join("config.toml"));
    let mut config = Config::load_from(&config_path)?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let _log_guard = logging::init(cli.log_level.as_deref(), &config.log_level, &config.log_dir);
    tracing::debug!("Using config file {}", config_path.display());

    match cli.command.unwrap_or(Commands::Run {
        wake_word: None,
        timeout: None,
        no_context: false,
        no_history: false,
    }) {
        Commands::Run {
            wake_word,
            timeout,
            no_context,
            no_history,
        } => {
            let options = commands::run::RunOptions {
                wake_word,
                timeout,
                no_context,
                no_history,
            };
            commands::run_assistant(config, options).await?;
        }
        Commands::Exec { words } => {
            let handled = commands::run_exec(&config, &words.join(" ")).await?;
            if !handled {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Commands { category } => {
            commands::list_commands(category.as_deref())?;
        }
        Commands::History { limit, clear } => {
            commands::show_history(&config.database_path, limit, clear)?;
        }
        Commands::Stats => {
            commands::show_stats(&config.database_path)?;
        }
        Commands::Contacts { action } => match action {
            ContactsAction::List => commands::contacts::list_contacts(&config)?,
            ContactsAction::Add { name, phone, email } => {
                commands::contacts::add_contact(&config, &name, &phone, email.as_deref())?;
            }
            ContactsAction::Send { name, message, at } => {
                commands::contacts::send_message(&config, &name, &message, at).await?;
            }
            ContactsAction::Group { group, message } => {
                commands::contacts::send_group(&config, &group, &message)?;
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config, &config_path)?,
            ConfigAction::Get { key } => commands::config::get_config(&config, &config_path, key)?,
            ConfigAction::Set { key, value } => {
                commands::config::set_config(&config_path, &key, &value)?;
            }
            ConfigAction::Path => commands::config::show_path(&config_path),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(&config_path)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
