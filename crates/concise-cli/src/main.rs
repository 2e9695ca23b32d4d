use anyhow::Result;
use clap::{Parser, Subcommand};
use concise_infrastructure::ConcisePaths;
use std::path::PathBuf;

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "concise")]
#[command(about = "Concise - branching AI chat in the terminal", long_about = None)]
struct Cli {
    /// Read settings from this config.toml instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read API keys from this secret.json instead of the default location
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Also write logs to the default log directory
    #[arg(long, global = true)]
    log_file: bool,

    /// Skip remote providers and answer with the local synthesizer only
    #[arg(long, global = true)]
    local_only: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Attach a file (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
        /// Also print the full answer
        #[arg(short, long)]
        expanded: bool,
    },
    /// Extract attachments and print what the AI would receive
    Extract {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_dir = match cli.log_dir {
        Some(dir) => Some(dir),
        None if cli.log_file => Some(ConcisePaths::log_dir()?),
        None => None,
    };
    let _log_guard = logging::init(log_dir.as_deref())?;

    let settings = commands::Settings::load(cli.config, cli.secrets, cli.local_only)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(&settings).await?,
        Commands::Ask {
            text,
            files,
            expanded,
        } => commands::ask::run(&settings, &text.join(" "), &files, expanded).await?,
        Commands::Extract { paths } => commands::extract::run(&settings, &paths).await?,
    }

    Ok(())
}
