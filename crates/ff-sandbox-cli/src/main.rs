//! ff-sandbox: serves the FireFly sandbox's SDK code templates.
//!
//! Provides four commands:
//! `serve` publishes the unbound templates over HTTP for the sandbox UI,
//! `show` prints one template, `render` binds one locally, and `check` validates the corpus.
//!
//! Every command works off the corpus bundled in [`ff_sandbox_core::TemplateRegistry`].

mod commands;
mod output;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ff_sandbox_core::OperationKey;

#[derive(Parser)]
#[command(
    name = "ff-sandbox",
    about = "FireFly sandbox snippet server: SDK code templates for pools, tokens and messages",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the template corpus over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "FF_SANDBOX_BIND", default_value = "0.0.0.0:3001")]
        bind: SocketAddr,
    },

    /// Print an operation's unbound template
    Show {
        /// Operation to print
        #[arg(value_enum)]
        operation: OperationChoice,
    },

    /// Bind an operation's template to parameters and print the snippet
    Render {
        /// Operation to render
        #[arg(value_enum)]
        operation: OperationChoice,

        /// Parameter as key=value (repeatable, overrides --params)
        #[arg(long = "param", short = 'p', value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// JSON object file with parameters
        #[arg(long = "params")]
        params_file: Option<PathBuf>,
    },

    /// Compile the bundled corpus and render every operation with example parameters
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OperationChoice {
    Pools,
    Mint,
    Burn,
    Transfer,
    Broadcast,
    Private,
}

impl OperationChoice {
    pub fn key(&self) -> OperationKey {
        match self {
            Self::Pools => OperationKey::Pools,
            Self::Mint => OperationKey::Mint,
            Self::Burn => OperationKey::Burn,
            Self::Transfer => OperationKey::Transfer,
            Self::Broadcast => OperationKey::Broadcast,
            Self::Private => OperationKey::Private,
        }
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            commands::serve::run(bind).await?;
        }
        Commands::Show { operation } => {
            commands::show::run(operation.key())?;
        }
        Commands::Render {
            operation,
            params,
            params_file,
        } => {
            commands::render::run(operation.key(), &params, params_file.as_deref())?;
        }
        Commands::Check => {
            commands::check::run()?;
        }
    }

    Ok(())
}
