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

//! Connection settings for password-authenticated node access.

use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Dial timeout applied to every connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials and transport settings for one invocation.
///
/// Host keys are never verified.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) username: String,
    pub(crate) password: Zeroizing<String>,
    pub(crate) connect_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration that authenticates with a password only.
    pub fn with_password(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Transport configuration handed to russh.
    pub(crate) fn russh_config(&self) -> russh::client::Config {
        russh::client::Config {
            // Established sessions are never timed out; only the dial is bounded.
            inactivity_timeout: None,
            ..Default::default()
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
