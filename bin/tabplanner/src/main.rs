mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tabplanner")]
#[command(about = "Open the tabs you need, planned from your bookmarks, history and open tabs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read browser data from a JSON snapshot instead of the local browser
    #[arg(long, global = true, value_name = "FILE")]
    fixture: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe what you need and open the suggested tabs
    Plan {
        /// What you are trying to do
        prompt: Vec<String>,

        #[command(flatten)]
        options: PlanOptions,
    },

    /// Speak the prompt instead of typing it
    Voice {
        /// Transcribe this file instead of recording from the microphone
        #[arg(long, value_name = "FILE")]
        audio: Option<PathBuf>,

        /// Recording length (overrides config voice.maxSeconds)
        #[arg(long)]
        seconds: Option<u32>,

        #[command(flatten)]
        options: PlanOptions,
    },

    /// Print the request payload without contacting the planning service
    Collect {
        /// Prompt to include in the payload
        #[arg(long, default_value = "")]
        prompt: String,
    },

    /// Show configuration, browser profile and DevTools availability
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(clap::Args)]
struct PlanOptions {
    /// Number of suggestions, 1-10 (overrides config defaults.limit)
    #[arg(short, long, allow_hyphen_values = true)]
    limit: Option<String>,

    /// Sampling temperature, 0-2 (overrides config defaults.temperature)
    #[arg(short, long, allow_hyphen_values = true)]
    temperature: Option<String>,

    /// Model name forwarded to the planning service
    #[arg(long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the whole configuration
    Show,
    /// Get a config value by dot-separated key (e.g. service.baseUrl)
    Get {
        /// Config key path (e.g. "defaults.limit", "voice.max_seconds")
        key: String,
    },
    /// Set a config value by dot-separated key
    Set {
        /// Config key path
        key: String,
        /// Value to set (auto-detects JSON types)
        value: String,
    },
    /// Reset config to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let fixture = cli.fixture.as_deref();

    match cli.command {
        Commands::Plan { prompt, options } => {
            commands::plan::run(&prompt.join(" "), &options.into(), fixture).await?;
        }
        Commands::Voice {
            audio,
            seconds,
            options,
        } => {
            commands::voice::run(audio, seconds, &options.into(), fixture).await?;
        }
        Commands::Collect { prompt } => {
            commands::collect::run(&prompt, fixture).await?;
        }
        Commands::Status => {
            commands::status::run(fixture).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show().await?;
            }
            ConfigCommands::Get { key } => {
                commands::config_cmd::get(&key).await?;
            }
            ConfigCommands::Set { key, value } => {
                commands::config_cmd::set(&key, &value).await?;
            }
            ConfigCommands::Reset { force } => {
                commands::config_cmd::reset(force).await?;
            }
        },
        Commands::Completions { shell } => {
            commands::completions_cmd::run(&shell, Cli::command()).await?;
        }
    }

    Ok(())
}

impl From<PlanOptions> for commands::PlanArgs {
    fn from(o: PlanOptions) -> Self {
        Self {
            limit: o.limit,
            temperature: o.temperature,
            model: o.model,
        }
    }
}
