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

//! SSH channel operations: opening session channels and running commands.

use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::connection::Client;
use super::Error;

/// Initial capacity of the command output buffer.
const SSH_CMD_BUFFER_SIZE: usize = 8192;

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandExecutedResult {
    /// Combined stdout and stderr, in the order the server sent them.
    pub output: String,
    /// The unix exit status (`$?` in bash).
    pub exit_status: u32,
}

impl CommandExecutedResult {
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

impl Client {
    /// Get a new session channel.
    pub async fn get_channel(&self) -> Result<Channel<Msg>, Error> {
        self.connection_handle
            .channel_open_session()
            .await
            .map_err(Error::SshError)
    }

    /// Execute a remote command via the ssh connection.
    ///
    /// Stdout and stderr are captured into a single buffer. The channel is
    /// closed before returning, whatever the outcome. Commands must not read
    /// from stdin.
    pub async fn execute(&self, command: &str) -> Result<CommandExecutedResult, Error> {
        let mut channel = self.get_channel().await?;
        let result = Self::collect_output(&mut channel, command).await;

        if let Err(e) = channel.close().await {
            tracing::trace!("Channel close after exec failed: {e}");
        }

        result
    }

    async fn collect_output(
        channel: &mut Channel<Msg>,
        command: &str,
    ) -> Result<CommandExecutedResult, Error> {
        channel.exec(true, command).await?;

        let mut output = Vec::with_capacity(SSH_CMD_BUFFER_SIZE);
        let mut exit_status: Option<u32> = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext } if ext == 1 => {
                    output.extend_from_slice(data)
                }
                // Data may still follow the exit status, keep reading until close.
                ChannelMsg::ExitStatus { exit_status: status } => exit_status = Some(status),
                _ => {}
            }
        }

        match exit_status {
            Some(exit_status) => Ok(CommandExecutedResult {
                output: String::from_utf8_lossy(&output).into_owned(),
                exit_status,
            }),
            None => Err(Error::CommandDidntExit),
        }
    }
}
