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

//! SSH connection management and establishment.
//!
//! This module handles dialing a forwarded node endpoint, the initial
//! handshake and password authentication.

use russh::client::{Handle, Handler};
use std::fmt::Debug;
use std::sync::Arc;

use super::Error;
use crate::ssh::credentials::ClientConfig;

/// A ssh connection to a remote node.
///
/// After creating a `Client` by [`connect`]ing to an endpoint, use
/// [`execute`] to run commands or open channels for shells and SFTP.
///
/// [`connect`]: Client::connect
/// [`execute`]: Client::execute
///
/// # Examples
///
/// ```no_run
/// use knode::ssh::{ClientConfig, tokio_client::Client};
/// #[tokio::main]
/// async fn main() -> Result<(), knode::ssh::tokio_client::Error> {
///     let config = ClientConfig::with_password("user1", "Pass@word1");
///     let client = Client::connect("localhost:10022", &config).await?;
///
///     let result = client.execute("echo Hello SSH").await?;
///     assert_eq!(result.output, "Hello SSH\n");
///     assert_eq!(result.exit_status, 0);
///
///     client.disconnect().await
/// }
/// ```
pub struct Client {
    pub(super) connection_handle: Arc<Handle<ClientHandler>>,
    pub(super) username: String,
    pub(super) endpoint: String,
}

impl Client {
    /// Open a ssh connection to `endpoint` (a `host:port` string).
    ///
    /// Dialing and the key exchange share the configured connect timeout.
    /// Authentication is attempted once with the configured password.
    pub async fn connect(endpoint: &str, config: &ClientConfig) -> Result<Self, Error> {
        let russh_config = Arc::new(config.russh_config());
        let handler = ClientHandler::default();

        let mut handle = tokio::time::timeout(
            config.connect_timeout,
            russh::client::connect(russh_config, endpoint, handler),
        )
        .await
        .map_err(|_| Error::ConnectTimeout(config.connect_timeout))??;

        let auth = handle
            .authenticate_password(config.username.as_str(), config.password.as_str())
            .await?;
        if !auth.success() {
            return Err(Error::PasswordWrong);
        }

        tracing::debug!("Authenticated to {} as {}", endpoint, config.username);

        Ok(Self {
            connection_handle: Arc::new(handle),
            username: config.username.clone(),
            endpoint: endpoint.to_string(),
        })
    }

    /// The username this client is connected as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The endpoint this client is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Disconnect from the remote host.
    pub async fn disconnect(&self) -> Result<(), Error> {
        self.connection_handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
            .map_err(Error::SshError)
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("endpoint", &self.endpoint)
            .field("connection_handle", &"Handle<ClientHandler>")
            .finish()
    }
}

/// SSH client handler.
///
/// Every server key is accepted: host key verification is not performed
/// for node connections.
#[derive(Debug, Clone, Default)]
pub struct ClientHandler;

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::trace!("Accepting server host key without verification");
        Ok(true)
    }
}
