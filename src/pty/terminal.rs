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

//! Terminal state management for PTY sessions.
//!
//! The local terminal is reached through a [`TerminalControl`] handle that
//! the session runner owns for the duration of one call. Raw mode is only
//! ever entered through a [`TerminalStateGuard`], which puts the terminal
//! back into its captured mode exactly once, on drop at the latest.

use std::io;

/// Fallback size used when the terminal cannot report its dimensions.
const DEFAULT_TERMINAL_SIZE: (u32, u32) = (80, 24);

/// Control over the local terminal device.
pub trait TerminalControl: Send + 'static {
    /// Whether the terminal is currently in raw mode.
    fn is_raw_mode(&self) -> io::Result<bool>;

    fn enable_raw_mode(&mut self) -> io::Result<()>;

    fn disable_raw_mode(&mut self) -> io::Result<()>;

    /// Terminal size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;
}

/// The process's controlling terminal, driven through crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTerminal;

impl TerminalControl for LocalTerminal {
    fn is_raw_mode(&self) -> io::Result<bool> {
        crossterm::terminal::is_raw_mode_enabled()
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

/// Terminal state information that needs to be preserved and restored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalState {
    /// Whether raw mode was enabled before we took control
    pub was_raw_mode: bool,
    /// Terminal size as `(columns, rows)` when state was saved
    pub size: (u32, u32),
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            was_raw_mode: false,
            size: DEFAULT_TERMINAL_SIZE,
        }
    }
}

impl TerminalState {
    /// Snapshot the current mode and size of `terminal`.
    pub fn capture<T: TerminalControl>(terminal: &T) -> Self {
        let was_raw_mode = terminal.is_raw_mode().unwrap_or_else(|e| {
            tracing::debug!("Could not query raw mode, assuming cooked: {e}");
            false
        });

        let size = match terminal.size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => (u32::from(cols), u32::from(rows)),
            Ok(_) => DEFAULT_TERMINAL_SIZE,
            Err(e) => {
                tracing::debug!("Could not query terminal size, using 80x24: {e}");
                DEFAULT_TERMINAL_SIZE
            }
        };

        Self { was_raw_mode, size }
    }
}

/// RAII guard for terminal state management
///
/// Holds the terminal in raw mode while alive. The captured mode is restored
/// once, either through [`restore`](Self::restore) or when the guard is
/// dropped, which also covers unwinding after a panic.
pub struct TerminalStateGuard<T: TerminalControl> {
    terminal: T,
    saved_state: TerminalState,
    restored: bool,
}

impl<T: TerminalControl> TerminalStateGuard<T> {
    /// Put `terminal` into raw mode, remembering `saved_state` for restoration.
    ///
    /// On failure the terminal is left untouched.
    pub fn enter_raw(mut terminal: T, saved_state: TerminalState) -> io::Result<Self> {
        if !saved_state.was_raw_mode {
            terminal.enable_raw_mode()?;
        }

        Ok(Self {
            terminal,
            saved_state,
            restored: false,
        })
    }

    /// Capture the current state of `terminal` and enter raw mode.
    pub fn new(terminal: T) -> io::Result<Self> {
        let saved_state = TerminalState::capture(&terminal);
        Self::enter_raw(terminal, saved_state)
    }

    /// Put the terminal back into its saved mode. Later calls do nothing.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        if self.saved_state.was_raw_mode {
            Ok(())
        } else {
            self.terminal.disable_raw_mode()
        }
    }
}

impl<T: TerminalControl> Drop for TerminalStateGuard<T> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            eprintln!("Warning: Failed to restore terminal state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        raw: bool,
        disables: usize,
        fail_enable: bool,
    }

    #[derive(Clone, Default)]
    struct FakeTerminal(Arc<Mutex<Recorded>>);

    impl TerminalControl for FakeTerminal {
        fn is_raw_mode(&self) -> io::Result<bool> {
            Ok(self.0.lock().unwrap().raw)
        }

        fn enable_raw_mode(&mut self) -> io::Result<()> {
            let mut state = self.0.lock().unwrap();
            if state.fail_enable {
                return Err(io::Error::new(io::ErrorKind::Other, "not a tty"));
            }
            state.raw = true;
            Ok(())
        }

        fn disable_raw_mode(&mut self) -> io::Result<()> {
            let mut state = self.0.lock().unwrap();
            state.raw = false;
            state.disables += 1;
            Ok(())
        }

        fn size(&self) -> io::Result<(u16, u16)> {
            Err(io::Error::new(io::ErrorKind::Other, "no size"))
        }
    }

    #[test]
    fn test_capture_falls_back_to_default_size() {
        let terminal = FakeTerminal::default();
        let state = TerminalState::capture(&terminal);
        assert_eq!(state, TerminalState::default());
    }

    #[test]
    fn test_guard_restores_once() {
        let terminal = FakeTerminal::default();
        let shared = terminal.0.clone();

        let mut guard = TerminalStateGuard::new(terminal).unwrap();
        assert!(shared.lock().unwrap().raw);

        guard.restore().unwrap();
        guard.restore().unwrap();
        drop(guard);

        let state = shared.lock().unwrap();
        assert!(!state.raw);
        assert_eq!(state.disables, 1);
    }

    #[test]
    fn test_guard_keeps_preexisting_raw_mode() {
        let terminal = FakeTerminal::default();
        terminal.0.lock().unwrap().raw = true;
        let shared = terminal.0.clone();

        drop(TerminalStateGuard::new(terminal).unwrap());

        let state = shared.lock().unwrap();
        assert!(state.raw);
        assert_eq!(state.disables, 0);
    }

    #[test]
    fn test_failed_enable_leaves_terminal_untouched() {
        let terminal = FakeTerminal::default();
        terminal.0.lock().unwrap().fail_enable = true;
        let shared = terminal.0.clone();

        assert!(TerminalStateGuard::new(terminal).is_err());

        let state = shared.lock().unwrap();
        assert!(!state.raw);
        assert_eq!(state.disables, 0);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let terminal = FakeTerminal::default();
        let shared = terminal.0.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = TerminalStateGuard::new(terminal).unwrap();
            panic!("session blew up");
        });

        assert!(result.is_err());
        assert!(!shared.lock().unwrap().raw);
    }
}
