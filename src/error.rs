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

//! Error taxonomy for node access.
//!
//! Every failure surfaced to the command layer is one of these variants.
//! [`Error::exit_code`] gives the process exit code the CLI uses.

use std::io;
use thiserror::Error;

use crate::ssh::tokio_client;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Dial, handshake or authentication failure.
    #[error("could not connect to address {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: tokio_client::Error,
    },

    /// Channel, pseudo-terminal, shell or streaming failure.
    #[error("{context}: {source}")]
    Session {
        context: &'static str,
        #[source]
        source: SessionFailure,
    },

    /// A copy argument that could not be understood.
    #[error("could not understand '{0}'")]
    Argument(String),

    /// Inspecting the local path of a copy argument failed.
    #[error("'{path}': {source}")]
    LocalPathCheck {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A well-formed argument pair that violates copy policy.
    #[error("{message}")]
    Validation { message: String, exit_code: i32 },

    /// Failure during a file or directory copy.
    #[error("copy failed: {source}")]
    Transfer {
        #[source]
        source: tokio_client::Error,
    },

    /// A remote command exited with a non-zero status.
    #[error("command '{command}' at address {endpoint} produced an error: exit status {status}")]
    Command {
        command: String,
        endpoint: String,
        status: u32,
        output: String,
    },

    /// The interactive shell ended with a status other than 0 or 130.
    #[error("remote shell exited with status {status}")]
    RemoteExit { status: u32 },

    #[error("cluster '{0}' not found")]
    ClusterNotFound(String),

    #[error("no cluster specified and no default cluster configured")]
    NoClusterSelected,

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("node '{0}' is not running")]
    NodeNotRunning(String),

    #[error("the SSH port of node '{0}' has not been forwarded")]
    SshPortNotForwarded(String),

    #[error("the {0} command currently only works on clusters that use NAT networking")]
    NatNetworkingRequired(&'static str),
}

/// Underlying cause of a [`Error::Session`].
#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error(transparent)]
    Transport(#[from] tokio_client::Error),

    #[error(transparent)]
    Terminal(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<russh::Error> for SessionFailure {
    fn from(e: russh::Error) -> Self {
        Self::Transport(e.into())
    }
}

impl Error {
    pub fn connection(endpoint: &str, source: tokio_client::Error) -> Self {
        Self::Connection {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub fn session(context: &'static str, source: impl Into<SessionFailure>) -> Self {
        Self::Session {
            context,
            source: source.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            exit_code: 1,
        }
    }

    pub fn transfer(source: tokio_client::Error) -> Self {
        Self::Transfer { source }
    }

    /// Process exit code for this error.
    ///
    /// Missing things (clusters, nodes, local sources) exit with 2, everything
    /// else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { exit_code, .. } => *exit_code,
            Self::NodeNotFound(_) | Self::ClusterNotFound(_) => 2,
            _ => 1,
        }
    }

    /// Output captured from a failed remote command, if any.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Self::Command { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_display() {
        let err = Error::Argument("invalid:because:multiple:colons".to_string());
        assert_eq!(
            err.to_string(),
            "could not understand 'invalid:because:multiple:colons'"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::NodeNotFound("n1".into()).exit_code(), 2);
        assert_eq!(Error::ClusterNotFound("lab".into()).exit_code(), 2);
        assert_eq!(Error::NoClusterSelected.exit_code(), 1);
        assert_eq!(Error::NodeNotRunning("n1".into()).exit_code(), 1);
        assert_eq!(Error::validation("nope").exit_code(), 1);

        let missing = Error::Validation {
            message: "'a': no such file or directory".to_string(),
            exit_code: 2,
        };
        assert_eq!(missing.exit_code(), 2);
    }

    #[test]
    fn test_command_error_keeps_output() {
        let err = Error::Command {
            command: "false".to_string(),
            endpoint: "localhost:10022".to_string(),
            status: 1,
            output: "partial".to_string(),
        };
        assert_eq!(err.partial_output(), Some("partial"));
        assert!(err.to_string().contains("exit status 1"));
    }

    #[test]
    fn test_session_error_display() {
        let err = Error::session("while requesting pseudo-terminal", SessionFailure::Other("refused".into()));
        assert_eq!(err.to_string(), "while requesting pseudo-terminal: refused");
    }
}
