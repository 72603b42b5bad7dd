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

//! PTY support for interactive SSH sessions.
//!
//! [`terminal`] owns local raw-mode handling, [`session`] streams bytes
//! between the local terminal and the remote shell, and [`runner`] races a
//! session against local shutdown signals.

use smallvec::SmallVec;

pub mod runner;
pub mod session;
pub mod terminal;

pub use runner::{run_interactive_shell, supervise, SessionOutcome};
pub use session::{PtySession, ShellExit};
pub use terminal::{LocalTerminal, TerminalControl, TerminalState, TerminalStateGuard};

/// Terminal type used when `TERM` is unset or empty.
pub const DEFAULT_TERM_TYPE: &str = "xterm-256color";

/// PTY session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyConfig {
    /// Terminal type (e.g., "xterm-256color", "xterm", "vt100")
    pub term_type: String,
}

impl PtyConfig {
    /// Build the configuration from the local environment.
    pub fn from_env() -> Self {
        Self {
            term_type: resolve_term_type(std::env::var("TERM").ok()),
        }
    }
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            term_type: DEFAULT_TERM_TYPE.to_string(),
        }
    }
}

/// Pick the remote terminal type from the value of `TERM`.
pub fn resolve_term_type(term: Option<String>) -> String {
    match term {
        Some(term) if !term.trim().is_empty() => term,
        _ => DEFAULT_TERM_TYPE.to_string(),
    }
}

/// Messages fed into the session loop by local input tasks.
#[derive(Debug)]
pub enum PtyMessage {
    /// Data from local terminal to send to remote
    LocalInput(SmallVec<[u8; 8]>),
    /// Terminal resize event
    Resize { width: u32, height: u32 },
    /// Local input can no longer be read
    Error(String),
}
