//! ledgerd CLI - invoicing API server
//!
//! Entry point for the `ledgerd` command-line tool, which runs the HTTP API
//! for companies and invoices (`serve` subcommand).

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerd",
    author,
    version,
    about = "HTTP API for companies and invoices",
    long_about = "Serve a small JSON API over two related entities - companies and \
                  invoices - backed by PostgreSQL."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_setup::init_tracing(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await?,
    }

    Ok(())
}
