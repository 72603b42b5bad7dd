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

//! One-shot remote command execution.

use crate::error::{Error, Result};

use super::credentials::ClientConfig;
use super::tokio_client::Client;

/// Run `command` on the node behind `endpoint` and return its combined output.
pub async fn run_command(
    endpoint: &str,
    username: &str,
    password: &str,
    command: &str,
) -> Result<String> {
    let config = ClientConfig::with_password(username, password);
    run_command_with_config(endpoint, &config, command).await
}

/// Same as [`run_command`], with a prepared [`ClientConfig`].
///
/// The connection is closed before returning on every path. A non-zero exit
/// status is reported as [`Error::Command`] carrying whatever output was
/// produced.
pub async fn run_command_with_config(
    endpoint: &str,
    config: &ClientConfig,
    command: &str,
) -> Result<String> {
    let client = Client::connect(endpoint, config)
        .await
        .map_err(|e| Error::connection(endpoint, e))?;

    tracing::debug!("Running '{}' at {}", command, endpoint);
    let result = client.execute(command).await;

    if let Err(e) = client.disconnect().await {
        tracing::debug!("Disconnect from {} failed: {}", endpoint, e);
    }

    let result = result.map_err(|e| Error::session("while running command", e))?;
    if result.is_success() {
        Ok(result.output)
    } else {
        Err(Error::Command {
            command: command.to_string(),
            endpoint: endpoint.to_string(),
            status: result.exit_status,
            output: result.output,
        })
    }
}
