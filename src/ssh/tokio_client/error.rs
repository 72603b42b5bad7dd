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

//! Transport-level errors raised by the SSH client.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while talking to a remote SSH server.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connection timed out after {} seconds", .0.as_secs())]
    ConnectTimeout(Duration),

    #[error("password authentication failed")]
    PasswordWrong,

    #[error("remote command did not report an exit status")]
    CommandDidntExit,

    #[error("ssh error: {0}")]
    SshError(#[from] russh::Error),

    #[error("sftp error: {0}")]
    SftpError(#[from] russh_sftp::client::error::Error),

    #[error("i/o error: {0}")]
    IoError(#[from] io::Error),
}
