//! Runs the front end and the listener as two independent tasks.
//!
//! The tasks share nothing but a shutdown token; data only moves between
//! them as datagrams. One task failing, or panicking, leaves the other
//! running until shutdown.
//!
//! Each task runs inside a span named after its component, so every log
//! line carries a `listener` or `http` prefix (or a `spans` entry in JSON).

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

use crate::app;
use crate::config::{Component, Config};
use crate::error::Result;
use crate::listener::DatagramListener;
use crate::persist::Persister;
use crate::server::Server;
use crate::store::{LibsqlStore, validate_collection};

/// Runs the selected components until SIGTERM or Ctrl-C.
pub async fn run(config: Config, component: Component) -> Result<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));
    run_until(config, component, shutdown).await
}

/// Binds the selected components, then waits for all of them to finish.
///
/// Bind failures are returned before anything is spawned. After that, task
/// failures are logged and `run_until` keeps waiting for the rest.
pub async fn run_until(config: Config, component: Component, shutdown: CancellationToken) -> Result<()> {
    let listener = if component.runs_listener() {
        validate_collection(&config.collection)?;
        Some(DatagramListener::bind(config.datagram_addr, config.chunk_size).await?)
    } else {
        None
    };
    let server = if component.runs_http() {
        Some(Server::bind(config.http_addr).await?)
    } else {
        None
    };

    let mut tasks = JoinSet::new();

    if let Some(listener) = listener {
        let store = Arc::new(LibsqlStore::new(&config.database_path));
        let persister = Persister::new(store, config.collection.clone());
        let token = shutdown.clone();
        tasks.spawn(
            async move { ("listener", listener.run(&persister, token).await) }
                .instrument(info_span!("listener")),
        );
    }

    if let Some(server) = server {
        let router = app::router(&config);
        let token = shutdown.clone();
        tasks.spawn(
            async move { ("http", server.serve(router, token).await) }
                .instrument(info_span!("http")),
        );
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(()))) => info!(task = name, "task finished"),
            Ok((name, Err(e))) => error!(task = name, "task failed: {e}"),
            Err(e) => error!("task panicked: {e}"),
        }
    }
    Ok(())
}

/// Cancels `shutdown` on the first SIGTERM or Ctrl-C.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }

    info!("shutdown signal received");
    shutdown.cancel();
}
