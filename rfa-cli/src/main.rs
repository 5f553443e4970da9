//! rfa CLI - serve sandboxed user folders over TCP, or talk to a server.
//!
//! Usage:
//!   rfa serve [--host H] [--port P] [--sandbox-root DIR] [--state-dir DIR]
//!   rfa connect [--host H] [--port P]
//!
//! Examples:
//!   rfa serve                          # Serve ./Root on 127.0.0.1:8088
//!   rfa serve --port 9000 --trace      # Debug logging for every command
//!   rfa connect                        # Interactive prompt against the default server

mod client;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rfa_core::config::{DEFAULT_PAGE_SIZE, DEFAULT_SANDBOX_ROOT, DEFAULT_STATE_DIR};
use rfa_core::{ServerConfig, Workspace};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8088;

/// Remote file-access server and client
#[derive(Parser, Debug)]
#[command(name = "rfa")]
#[command(about = "Line-based remote file access over TCP")]
struct Args {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run the server
    Serve {
        /// Address to bind
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Directory holding one folder per registered user
        #[arg(long, default_value = DEFAULT_SANDBOX_ROOT)]
        sandbox_root: PathBuf,

        /// Directory holding the user tables
        #[arg(long, default_value = DEFAULT_STATE_DIR)]
        state_dir: PathBuf,
    },
    /// Connect to a server and send commands from stdin
    Connect {
        /// Server address
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.trace { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.mode {
        Mode::Serve {
            host,
            port,
            sandbox_root,
            state_dir,
        } => {
            let config = ServerConfig {
                sandbox_root,
                state_dir,
                page_size: DEFAULT_PAGE_SIZE,
            };
            let workspace = Workspace::open(&config)?;
            tracing::info!(
                sandbox = %workspace.sandbox().root().display(),
                state = %config.state_dir.display(),
                "workspace ready"
            );
            server::run(&format!("{}:{}", host, port), workspace).await?;
        }
        Mode::Connect { host, port } => {
            client::run(&format!("{}:{}", host, port)).await?;
        }
    }

    Ok(())
}
