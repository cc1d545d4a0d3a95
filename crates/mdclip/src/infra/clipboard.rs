//! Clipboard integration utilities.
//!
//! The copy flow only sees the [`Clipboard`] seam; the system
//! implementation keeps a native backend with fallbacks to shell-based
//! clipboard utilities for headless environments.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

use crate::domain::errors::ClipboardError;

/// Where copied content ends up.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard with fallbacks for headless environments.
pub struct SystemClipboard {
    primary: Option<arboard::Clipboard>,
    allow_fallback: bool,
}

impl SystemClipboard {
    /// Attempt to initialize the native clipboard. When unavailable, copies
    /// go through platform-specific executables if `allow_fallback` is set.
    pub fn new(allow_fallback: bool) -> Self {
        let primary = arboard::Clipboard::new().ok();
        if primary.is_none() {
            tracing::debug!("native clipboard unavailable, shell fallbacks only");
        }
        Self {
            primary,
            allow_fallback,
        }
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        // A rejection is only reported when some backend was present and
        // refused; with no backend at all the copy is unsupported.
        let mut rejection: Option<anyhow::Error> = None;

        if let Some(primary) = self.primary.as_mut() {
            match primary.set_text(text.to_owned()) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    self.primary = None;
                    rejection = Some(anyhow!(err).context("native clipboard refused the copy"));
                }
            }
        }

        if self.allow_fallback {
            for command in fallback_commands() {
                match try_command_copy(command, text) {
                    Ok(CommandCopy::Copied) => return Ok(()),
                    Ok(CommandCopy::Missing) => continue,
                    Err(err) => rejection = Some(err),
                }
            }
        }

        match rejection {
            Some(err) => Err(ClipboardError::Rejected(err)),
            None => Err(ClipboardError::Unavailable),
        }
    }
}

/// Writes the payload to stdout instead of any clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        write_stdout(text)
            .map_err(|err| ClipboardError::Rejected(anyhow!(err).context("failed to write stdout")))
    }
}

fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

enum CommandCopy {
    Copied,
    /// The executable is not present on this system.
    Missing,
}

fn try_command_copy(command: &[&str], text: &str) -> Result<CommandCopy> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(_) => return Ok(CommandCopy::Missing),
    };

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(CommandCopy::Copied)
    } else {
        Err(anyhow!(
            "clipboard command {program} exited with status {status}"
        ))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["xclip", "-selection", "clipboard"], &["wl-copy"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
