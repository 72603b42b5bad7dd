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

//! Credentials used to reach a node.

use std::fmt;
use zeroize::Zeroizing;

pub const DEFAULT_USERNAME: &str = "user1";
pub const DEFAULT_PASSWORD: &str = "Pass@word1";

/// Username and password after defaults are applied.
#[derive(Clone)]
pub struct AccessOptions {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl AccessOptions {
    /// Apply defaults to the values given on the command line.
    ///
    /// An empty username becomes [`DEFAULT_USERNAME`] and also replaces the
    /// password with [`DEFAULT_PASSWORD`]. An empty password with a given
    /// username is kept as is.
    pub fn resolve(username: &str, password: &str) -> Self {
        let username_missing = username.is_empty();

        let username = if username_missing {
            DEFAULT_USERNAME
        } else {
            username
        };
        let password = if username_missing {
            DEFAULT_PASSWORD
        } else {
            password
        };

        Self {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
        }
    }
}

impl fmt::Debug for AccessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessOptions")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_given_credentials_are_kept() {
        let access = AccessOptions::resolve("alice", "secret");
        assert_eq!(access.username, "alice");
        assert_eq!(access.password.as_str(), "secret");
    }

    #[test]
    fn test_empty_username_defaults_both() {
        let access = AccessOptions::resolve("", "secret");
        assert_eq!(access.username, DEFAULT_USERNAME);
        assert_eq!(access.password.as_str(), DEFAULT_PASSWORD);
    }

    #[test]
    fn test_empty_password_is_not_defaulted() {
        let access = AccessOptions::resolve("alice", "");
        assert_eq!(access.password.as_str(), "");
    }

    #[test]
    fn test_debug_redacts_password() {
        let access = AccessOptions::resolve("alice", "secret");
        assert!(!format!("{access:?}").contains("secret"));
    }
}
