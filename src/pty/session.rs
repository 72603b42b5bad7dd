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

//! PTY session: the streaming loop between the local terminal and a remote
//! interactive shell.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use russh::{client::Msg, Channel, ChannelMsg, Pty};
use smallvec::SmallVec;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{PtyConfig, PtyMessage};
use crate::error::{Error, Result};

const PTY_MESSAGE_CHANNEL_SIZE: usize = 256;

/// How long the blocking input reader waits before re-checking cancellation.
const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(200);

type KeyBytes = SmallVec<[u8; 8]>;

/// How the remote shell ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellExit {
    /// The shell reported an exit status.
    Exited(u32),
    /// The shell was killed by a signal.
    Signaled(String),
    /// The channel closed without an exit status or signal.
    NoStatus,
    /// Streaming stopped because the session was cancelled locally.
    Cancelled,
}

/// Remote terminal modes requested with the PTY.
fn terminal_modes() -> [(Pty, u32); 14] {
    [
        (Pty::VINTR, 0x03),
        (Pty::VQUIT, 0x1C),
        (Pty::VERASE, 0x7F),
        (Pty::VKILL, 0x15),
        (Pty::VEOF, 0x04),
        (Pty::VSUSP, 0x1A),
        (Pty::ICRNL, 1),
        (Pty::ISIG, 1),
        (Pty::ICANON, 1),
        (Pty::ECHO, 1),
        (Pty::OPOST, 1),
        (Pty::ONLCR, 1),
        (Pty::TTY_OP_ISPEED, 14400),
        (Pty::TTY_OP_OSPEED, 14400),
    ]
}

/// A PTY session proxying one SSH channel to the local terminal.
pub struct PtySession {
    channel: Channel<Msg>,
    config: PtyConfig,
}

impl PtySession {
    pub fn new(channel: Channel<Msg>, config: PtyConfig) -> Self {
        Self { channel, config }
    }

    /// Request a remote pseudo-terminal of `cols` x `rows`.
    pub async fn request_pty(&mut self, cols: u32, rows: u32) -> Result<()> {
        self.channel
            .request_pty(
                true,
                &self.config.term_type,
                cols,
                rows,
                0,
                0,
                &terminal_modes(),
            )
            .await
            .map_err(|e| Error::session("while requesting pseudo-terminal", e))?;

        tracing::debug!(
            "Requested {} pty of {}x{}",
            self.config.term_type,
            cols,
            rows
        );
        Ok(())
    }

    /// Start the remote shell and stream until it ends or `cancel` fires.
    ///
    /// The local terminal is expected to be in raw mode already.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<ShellExit> {
        self.channel
            .request_shell(true)
            .await
            .map_err(|e| Error::session("while requesting shell", e))?;

        let (msg_tx, mut msg_rx) = mpsc::channel(PTY_MESSAGE_CHANNEL_SIZE);
        let tasks = cancel.child_token();

        let input_task = spawn_input_reader(msg_tx.clone(), tasks.clone());
        spawn_resize_listener(msg_tx, tasks.clone());

        let result = self.stream(&mut msg_rx, &cancel).await;

        tasks.cancel();
        // The reader notices cancellation within one poll interval.
        let _ = tokio::time::timeout(INPUT_POLL_TIMEOUT * 2, input_task).await;
        let _ = io::stdout().flush();

        result
    }

    async fn stream(
        &mut self,
        msg_rx: &mut mpsc::Receiver<PtyMessage>,
        cancel: &CancellationToken,
    ) -> Result<ShellExit> {
        let mut exit = ShellExit::NoStatus;
        let mut input_open = true;

        loop {
            tokio::select! {
                msg = self.channel.wait() => {
                    match msg {
                        Some(ChannelMsg::Data { ref data }) => {
                            write_flush(&mut io::stdout(), data)
                                .map_err(|e| Error::session("while writing to stdout", e))?;
                        }
                        Some(ChannelMsg::ExtendedData { ref data, ext }) if ext == 1 => {
                            write_flush(&mut io::stderr(), data)
                                .map_err(|e| Error::session("while writing to stderr", e))?;
                        }
                        Some(ChannelMsg::ExitStatus { exit_status }) => {
                            exit = ShellExit::Exited(exit_status);
                        }
                        Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                            exit = ShellExit::Signaled(format!("{signal_name:?}"));
                        }
                        // Exit status may arrive after EOF; wait for close.
                        Some(ChannelMsg::Eof) => {
                            tracing::trace!("Remote sent EOF");
                        }
                        Some(ChannelMsg::Close) | None => {
                            tracing::debug!("SSH channel closed");
                            return Ok(exit);
                        }
                        Some(_) => {}
                    }
                }

                message = msg_rx.recv(), if input_open => {
                    match message {
                        Some(PtyMessage::LocalInput(data)) => {
                            self.channel
                                .data(data.as_slice())
                                .await
                                .map_err(|e| Error::session("while sending input", e))?;
                        }
                        Some(PtyMessage::Resize { width, height }) => {
                            if let Err(e) = self.channel.window_change(width, height, 0, 0).await {
                                tracing::warn!("Failed to send window resize to remote: {e}");
                            } else {
                                tracing::debug!("Terminal resized to {width}x{height}");
                            }
                        }
                        // Local input is gone but remote output still streams.
                        Some(PtyMessage::Error(error)) => {
                            tracing::warn!("Terminal input stopped: {error}");
                        }
                        None => {
                            tracing::debug!("Local input closed");
                            input_open = false;
                        }
                    }
                }

                _ = cancel.cancelled() => {
                    tracing::debug!("PTY session cancelled");
                    return Ok(ShellExit::Cancelled);
                }
            }
        }
    }

    /// Send EOF and close the channel. Failures are only logged.
    pub async fn close(&mut self) {
        if let Err(e) = self.channel.eof().await {
            tracing::trace!("Failed to send EOF to SSH channel: {e}");
        }
        if let Err(e) = self.channel.close().await {
            tracing::trace!("Failed to close SSH channel: {e}");
        }
    }
}

fn write_flush(out: &mut impl Write, data: &[u8]) -> io::Result<()> {
    out.write_all(data)?;
    out.flush()
}

/// Read local key events on the blocking pool and forward them as bytes.
fn spawn_input_reader(
    tx: mpsc::Sender<PtyMessage>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match crossterm::event::poll(INPUT_POLL_TIMEOUT) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    let _ = tx.blocking_send(PtyMessage::Error(format!("Input error: {e}")));
                    break;
                }
            }

            match crossterm::event::read() {
                Ok(event) => {
                    if let Some(data) = input_event_to_bytes(event) {
                        if tx.blocking_send(PtyMessage::LocalInput(data)).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(PtyMessage::Error(format!("Input error: {e}")));
                    break;
                }
            }
        }
    })
}

#[cfg(unix)]
fn spawn_resize_listener(tx: mpsc::Sender<PtyMessage>, cancel: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigwinch = match signal(SignalKind::window_change()) {
        Ok(sigwinch) => sigwinch,
        Err(e) => {
            tracing::warn!("Failed to register SIGWINCH handler: {e}");
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                received = sigwinch.recv() => {
                    if received.is_none() {
                        break;
                    }
                    if let Ok((width, height)) = crossterm::terminal::size() {
                        let resize = PtyMessage::Resize {
                            width: u32::from(width),
                            height: u32::from(height),
                        };
                        if tx.try_send(resize).is_err() {
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_resize_listener(_tx: mpsc::Sender<PtyMessage>, _cancel: CancellationToken) {}

/// Convert a terminal event into the bytes a remote pty expects.
pub(crate) fn input_event_to_bytes(event: Event) -> Option<KeyBytes> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_bytes(key),
        Event::Paste(text) => Some(SmallVec::from_slice(text.as_bytes())),
        _ => None,
    }
}

fn key_to_bytes(key: KeyEvent) -> Option<KeyBytes> {
    let bytes: &[u8] = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return control_byte(c).map(|b| SmallVec::from_slice(&[b]));
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf).as_bytes();
            let mut out = KeyBytes::new();
            if key.modifiers.contains(KeyModifiers::ALT) {
                out.push(0x1b);
            }
            out.extend_from_slice(encoded);
            return Some(out);
        }
        KeyCode::Enter => b"\r",
        KeyCode::Tab => b"\t",
        KeyCode::BackTab => b"\x1b[Z",
        KeyCode::Backspace => b"\x7f",
        KeyCode::Esc => b"\x1b",
        KeyCode::Up => b"\x1b[A",
        KeyCode::Down => b"\x1b[B",
        KeyCode::Right => b"\x1b[C",
        KeyCode::Left => b"\x1b[D",
        KeyCode::Home => b"\x1b[H",
        KeyCode::End => b"\x1b[F",
        KeyCode::PageUp => b"\x1b[5~",
        KeyCode::PageDown => b"\x1b[6~",
        KeyCode::Insert => b"\x1b[2~",
        KeyCode::Delete => b"\x1b[3~",
        KeyCode::F(n) => return function_key(n).map(SmallVec::from_slice),
        _ => return None,
    };
    Some(SmallVec::from_slice(bytes))
}

/// Ctrl+A is 0x01 through Ctrl+Z at 0x1a, plus the usual punctuation controls.
fn control_byte(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        c @ 'a'..='z' => Some(c as u8 - b'a' + 1),
        ' ' | '@' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        _ => None,
    }
}

fn function_key(n: u8) -> Option<&'static [u8]> {
    Some(match n {
        1 => b"\x1bOP",
        2 => b"\x1bOQ",
        3 => b"\x1bOR",
        4 => b"\x1bOS",
        5 => b"\x1b[15~",
        6 => b"\x1b[17~",
        7 => b"\x1b[18~",
        8 => b"\x1b[19~",
        9 => b"\x1b[20~",
        10 => b"\x1b[21~",
        11 => b"\x1b[23~",
        12 => b"\x1b[24~",
        _ => return None,
    })
}
