mod config;
mod query;
mod serve;

use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{ServeArgs, ServeConfig};

/// Repair ticket service.
#[derive(Parser)]
#[command(name = "repairdesk", version, about = "Repair ticket service")]
struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on [env: REPAIRDESK_PORT, default: 8080]
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind [env: REPAIRDESK_BIND, default: 0.0.0.0]
        #[arg(long)]
        bind: Option<IpAddr>,
        /// JSON file to persist repairs in; in-memory when omitted [env: REPAIRDESK_DATA_FILE]
        #[arg(long)]
        data_file: Option<PathBuf>,
        /// Requests per minute allowed per client IP [env: REPAIRDESK_RATE_LIMIT, default: 60]
        #[arg(long)]
        rate_limit: Option<u64>,
    },

    /// Run one operation document and print the response envelope
    Query {
        /// The operation document, e.g. 'query { repairs { id } }'
        document: String,
        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
        /// JSON data file to run against; an empty in-memory store when omitted
        #[arg(long)]
        data_file: Option<PathBuf>,
        /// Print the envelope on one line
        #[arg(long)]
        compact: bool,
    },
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Serve {
            port,
            bind,
            data_file,
            rate_limit,
        } => {
            let config = match ServeConfig::resolve(ServeArgs {
                port,
                bind,
                data_file,
                rate_limit,
            }) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(2);
                }
            };
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("error: failed to create tokio runtime: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(config)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
        Commands::Query {
            document,
            variables,
            data_file,
            compact,
        } => {
            query::cmd_query(
                &document,
                variables.as_deref(),
                data_file.as_deref(),
                compact,
            );
        }
    }
}
