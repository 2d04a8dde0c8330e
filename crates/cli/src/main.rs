//! Dostbot CLI - the main entry point.
//!
//! Commands:
//! - `chat`    - Interactive chat or single-message mode
//! - `serve`   - Start the HTTP gateway and web chat
//! - `prompt`  - Print the rendered system prompt
//! - `doctor`  - Diagnose configuration and knowledge base
//! - `init`    - Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dostbot",
    about = "Dostbot — AI customer support for Dostbin compost bins",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (default: ~/.dostbot/config.toml)
    #[arg(short, long, global = true, env = "DOSTBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant in the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP gateway and web chat
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the system prompt rendered from the knowledge base
    Prompt {
        /// Print only the video catalogue section
        #[arg(long)]
        media_only: bool,
    },

    /// Diagnose configuration, API key and knowledge base
    Doctor {
        /// Also check that the completion endpoint is reachable
        #[arg(long)]
        online: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    // Interactive chat shares the terminal with logs; keep it quiet by default.
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Chat { .. }, false) => "warn",
        _ => "info",
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat { message } => {
            let config = commands::load_config(config_path)?;
            commands::chat::run(&config, message).await?
        }
        Commands::Serve { port } => {
            let config = commands::load_config(config_path)?;
            commands::serve::run(config, port).await?
        }
        Commands::Prompt { media_only } => {
            let config = commands::load_config(config_path)?;
            commands::prompt::run(&config, media_only)?
        }
        Commands::Doctor { online } => commands::doctor::run(config_path, online).await?,
        Commands::Init { force } => commands::init::run(config_path, force)?,
    }

    Ok(())
}
