//! Stop-signal handling for graceful shutdown.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io,
    time::Duration,
};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install {signal} handler: {source}")]
    Install {
        signal: StopSignal,
        #[source]
        source: io::Error,
    },
}

/// The signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopSignal {
    Interrupt,
    Terminate,
}

impl Display for StopSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Wait for a stop signal, then let in-flight requests finish within `grace`.
pub(crate) async fn listen(handle: ServerHandle, grace: Duration) -> Result<(), ShutdownSignalError> {
    let signal = wait_for_stop_signal().await?;

    info!(%signal, grace_seconds = grace.as_secs(), "draining in-flight requests");

    handle.stop_graceful(Some(grace));

    Ok(())
}

async fn wait_for_stop_signal() -> Result<StopSignal, ShutdownSignalError> {
    let interrupt = async {
        signal::ctrl_c()
            .await
            .map(|()| StopSignal::Interrupt)
            .map_err(|source| ShutdownSignalError::Install {
                signal: StopSignal::Interrupt,
                source,
            })
    };

    tokio::select! {
        stopped = interrupt => stopped,
        stopped = terminate() => stopped,
    }
}

#[cfg(unix)]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(
        |source| ShutdownSignalError::Install {
            signal: StopSignal::Terminate,
            source,
        },
    )?;

    stream.recv().await;

    Ok(StopSignal::Terminate)
}

/// Only Ctrl+C stops the server where SIGTERM does not exist.
#[cfg(not(unix))]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    std::future::pending().await
}
