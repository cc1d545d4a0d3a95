//! Terminal environment detection.
//!
//! Decides whether the current environment is a degraded one: a terminal
//! where clipboard integration is limited and copied content loses its
//! formatting. The predicate is pure; all ambient reads happen in
//! [`EnvSnapshot::capture`].

use std::env;

use once_cell::sync::Lazy;
use regex::Regex;

// Terminal families that predate modern clipboard integration.
static LEGACY_TERM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(vt\d+|ansi|cons\d*)").expect("pattern is valid"));

/// Identification strings consulted by the detector.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub term: Option<String>,
    pub ssh_session: bool,
    pub display_server: bool,
    /// Whether the display-server probe is meaningful on this platform.
    pub probe_display: bool,
}

impl EnvSnapshot {
    /// Capture the identification strings of the current process
    /// environment.
    pub fn capture() -> Self {
        Self {
            term: env::var("TERM").ok(),
            ssh_session: env::var_os("SSH_CONNECTION").is_some()
                || env::var_os("SSH_TTY").is_some(),
            display_server: env::var_os("DISPLAY").is_some()
                || env::var_os("WAYLAND_DISPLAY").is_some(),
            probe_display: cfg!(all(unix, not(target_os = "macos"))),
        }
    }
}

/// Whether the environment calls for the formatting-loss warning and the
/// legacy selection path.
pub fn is_degraded(snapshot: &EnvSnapshot) -> bool {
    let term = snapshot.term.as_deref().unwrap_or("");

    if term == "dumb" || term == "linux" {
        return true;
    }
    if LEGACY_TERM_PATTERN.is_match(term) || snapshot.ssh_session {
        return true;
    }
    snapshot.probe_display && !snapshot.display_server
}
