// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive shell runner.
//!
//! The shell runs on a worker task. The invoking task races the worker
//! against SIGINT/SIGTERM; whichever finishes first cancels the shared
//! token and the other side observes it.

use std::future::Future;
use tokio::task::JoinError;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::session::{PtySession, ShellExit};
use super::terminal::{LocalTerminal, TerminalControl, TerminalState, TerminalStateGuard};
use super::PtyConfig;
use crate::error::{Error, Result, SessionFailure};
use crate::ssh::tokio_client::Client;
use crate::ssh::ClientConfig;

/// Upper bound on worker teardown once a shutdown signal arrived.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Exit status a shell reports when its last command was interrupted.
const INTERRUPTED_EXIT_STATUS: u32 = 130;

/// Final state of an interactive session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The remote shell ended normally.
    Completed,
    /// A local shutdown signal ended the session.
    Interrupted,
    /// The session could not be established or ended abnormally.
    Failed(Error),
}

impl SessionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Map how the shell ended onto a session outcome.
pub fn classify_exit(exit: ShellExit) -> SessionOutcome {
    match exit {
        ShellExit::Exited(0) | ShellExit::Exited(INTERRUPTED_EXIT_STATUS) => {
            SessionOutcome::Completed
        }
        ShellExit::Exited(status) => SessionOutcome::Failed(Error::RemoteExit { status }),
        ShellExit::Signaled(signal) => SessionOutcome::Failed(Error::session(
            "while running shell",
            SessionFailure::Other(format!("remote shell terminated by signal {signal}")),
        )),
        ShellExit::NoStatus => SessionOutcome::Failed(Error::session(
            "while running shell",
            SessionFailure::Other("remote shell exited without a status".to_string()),
        )),
        ShellExit::Cancelled => SessionOutcome::Interrupted,
    }
}

fn outcome_from_join(joined: std::result::Result<Result<ShellExit>, JoinError>) -> SessionOutcome {
    match joined {
        Ok(Ok(exit)) => classify_exit(exit),
        Ok(Err(e)) => SessionOutcome::Failed(e),
        Err(e) => SessionOutcome::Failed(Error::session(
            "while running shell",
            SessionFailure::Other(format!("session task failed: {e}")),
        )),
    }
}

/// Run `worker` on its own task until it finishes or `shutdown` resolves.
///
/// The worker receives the cancellation token and must release everything it
/// holds when the token fires. After a shutdown the worker gets a bounded
/// amount of time to wind down before it is aborted; either way it has been
/// dropped when this returns.
pub async fn supervise<W, Fut, S>(worker: W, shutdown: S) -> SessionOutcome
where
    W: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<ShellExit>> + Send + 'static,
    S: Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let mut handle = tokio::spawn(worker(cancel.clone()));

    tokio::select! {
        joined = &mut handle => {
            cancel.cancel();
            return outcome_from_join(joined);
        }
        _ = shutdown => {
            tracing::debug!("Shutdown signal received, closing session");
            cancel.cancel();
        }
    }

    match tokio::time::timeout(TEARDOWN_TIMEOUT, &mut handle).await {
        Ok(joined) => {
            if let SessionOutcome::Failed(e) = outcome_from_join(joined) {
                tracing::debug!("Session ended with error during shutdown: {e}");
            }
        }
        Err(_) => {
            tracing::warn!("Session did not close in time, aborting");
            handle.abort();
            let _ = handle.await;
        }
    }

    SessionOutcome::Interrupted
}

/// Resolves on the first SIGINT or SIGTERM delivered to the process.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {e}");
                wait_for_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = wait_for_ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for SIGINT: {e}");
        std::future::pending::<()>().await;
    }
}

/// Log the outcome of an interactive session.
pub fn report(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Completed => tracing::debug!("Interactive session completed"),
        SessionOutcome::Interrupted => tracing::info!("Interactive session interrupted"),
        SessionOutcome::Failed(e) => tracing::error!("Interactive session failed: {e}"),
    }
}

/// Open an interactive shell on `endpoint` and attach it to the local terminal.
///
/// Blocks until the shell ends or the process receives SIGINT/SIGTERM.
/// Failures are logged rather than returned.
pub async fn run_interactive_shell(endpoint: &str, username: &str, password: &str) {
    let outcome = run_interactive_shell_with(
        LocalTerminal,
        endpoint,
        ClientConfig::with_password(username, password),
        PtyConfig::from_env(),
        shutdown_signal(),
    )
    .await;
    report(&outcome);
}

/// Run an interactive shell against an explicit terminal and shutdown source.
pub async fn run_interactive_shell_with<T, S>(
    terminal: T,
    endpoint: &str,
    config: ClientConfig,
    pty_config: PtyConfig,
    shutdown: S,
) -> SessionOutcome
where
    T: TerminalControl,
    S: Future<Output = ()>,
{
    let endpoint = endpoint.to_string();
    supervise(
        move |cancel| shell_worker(terminal, endpoint, config, pty_config, cancel),
        shutdown,
    )
    .await
}

async fn shell_worker<T: TerminalControl>(
    terminal: T,
    endpoint: String,
    config: ClientConfig,
    pty_config: PtyConfig,
    cancel: CancellationToken,
) -> Result<ShellExit> {
    let client = tokio::select! {
        connected = Client::connect(&endpoint, &config) => {
            connected.map_err(|e| Error::connection(&endpoint, e))?
        }
        _ = cancel.cancelled() => return Ok(ShellExit::Cancelled),
    };
    tracing::debug!("Connected to {endpoint} as {}", client.username());

    let result = attach_shell(&client, terminal, pty_config, cancel).await;

    if let Err(e) = client.disconnect().await {
        tracing::trace!("Failed to disconnect from {endpoint}: {e}");
    }
    result
}

async fn attach_shell<T: TerminalControl>(
    client: &Client,
    terminal: T,
    pty_config: PtyConfig,
    cancel: CancellationToken,
) -> Result<ShellExit> {
    let channel = client
        .get_channel()
        .await
        .map_err(|e| Error::session("while opening session channel", e))?;

    let saved = TerminalState::capture(&terminal);
    let (cols, rows) = saved.size;

    let mut session = PtySession::new(channel, pty_config);
    session.request_pty(cols, rows).await?;

    let mut guard = TerminalStateGuard::enter_raw(terminal, saved)
        .map_err(|e| Error::session("while entering raw mode", e))?;

    let result = session.run(cancel).await;
    session.close().await;

    if let Err(e) = guard.restore() {
        tracing::warn!("Failed to restore terminal: {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_130_is_completed() {
        assert!(matches!(
            classify_exit(ShellExit::Exited(130)),
            SessionOutcome::Completed
        ));
        assert!(matches!(
            classify_exit(ShellExit::Exited(0)),
            SessionOutcome::Completed
        ));
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        match classify_exit(ShellExit::Exited(1)) {
            SessionOutcome::Failed(Error::RemoteExit { status }) => assert_eq!(status, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(classify_exit(ShellExit::NoStatus).is_failure());
        assert!(classify_exit(ShellExit::Signaled("KILL".into())).is_failure());
    }

    #[test]
    fn test_cancelled_is_interrupted() {
        assert!(matches!(
            classify_exit(ShellExit::Cancelled),
            SessionOutcome::Interrupted
        ));
    }

    #[tokio::test]
    async fn test_worker_completion_wins() {
        let outcome = supervise(
            |_cancel| async { Ok(ShellExit::Exited(0)) },
            std::future::pending(),
        )
        .await;
        assert!(matches!(outcome, SessionOutcome::Completed));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_worker() {
        let outcome = supervise(
            |cancel| async move {
                cancel.cancelled().await;
                Ok(ShellExit::Cancelled)
            },
            async {},
        )
        .await;
        assert!(matches!(outcome, SessionOutcome::Interrupted));
    }
}
