use clap::{Parser, Subcommand};
use std::error::Error;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod dump;
mod serve;
mod text;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding the users, `:memory:` keeps them in memory only.
    #[arg(short, long, value_name = "FILE", default_value = "users.json")]
    path: String,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Serve(serve::Command),
    Dump(dump::Command),
}

fn get_rust_log(verbose: u8) -> String {
    let fallback = if verbose > 0 {
        "usermanager=debug,records=debug"
    } else {
        "usermanager=info,records=info"
    };

    let mut original = std::env::var("RUST_LOG").unwrap_or_else(|_| fallback.into());

    if !original.contains("tower_http=") {
        original.push_str(",tower_http=info");
    }

    original
}

fn main() -> Result<(), Box<dyn Error>> {
    color_backtrace::install();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(get_rust_log(cli.verbose)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(path = %cli.path, "initialized, ready");

    match &cli.command {
        Some(Commands::Serve(cmd)) => Ok(serve::execute_command(&cli.path, cmd)?),
        Some(Commands::Dump(cmd)) => Ok(dump::execute_command(&cli.path, cmd)?),
        None => Ok(()),
    }
}
