use anyhow::{Context, Result};
use clap::Args;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

use records::{storage, RecordStore};

mod handlers;
mod route;
mod state;


pub use route::create_router;
pub use state::AppState;

#[derive(Debug, Args)]
pub struct Command {
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[tokio::main]
pub async fn execute_command(path: &str, cmd: &Command) -> Result<()> {
    info!("serving");

    let store =
        RecordStore::load(storage::open(path)).with_context(|| format!("loading '{}'", path))?;

    let app_state = Arc::new(AppState::new(store)?);

    let app = create_router(app_state);

    info!("listening on {}", cmd.bind);

    axum::Server::try_bind(&cmd.bind)
        .with_context(|| format!("binding {}", cmd.bind))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("hyper error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = ?e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!(error = ?e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}
