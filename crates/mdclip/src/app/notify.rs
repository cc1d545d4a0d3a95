//! User-facing notices and the sinks that deliver them.
//!
//! The copy flow emits [`Notice`] events through an injected [`Notifier`];
//! presentation layers decide how to show them.

use std::fmt;

/// Severity attached to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Events the copy flow reports to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The environment looks degraded; formatting may be lost.
    DegradedTerminal,
    /// The payload reached the clipboard.
    Copied,
    /// Backends were present but the copy did not go through.
    CopyFailed,
    /// No clipboard backend exists in this environment.
    ClipboardUnavailable,
    /// The requested section id resolved to nothing.
    SectionNotFound(String),
    /// No selection engine is enabled.
    SelectionUnsupported,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::DegradedTerminal => NoticeLevel::Warning,
            Notice::Copied => NoticeLevel::Success,
            Notice::CopyFailed
            | Notice::ClipboardUnavailable
            | Notice::SectionNotFound(_)
            | Notice::SelectionUnsupported => NoticeLevel::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::DegradedTerminal => {
                "You seem to be working in a limited terminal session. Content may be copied \
                 without formatting. Consider running from a graphical session."
                    .to_string()
            }
            Notice::Copied => "Content copied to clipboard.".to_string(),
            Notice::CopyFailed => "Copying to the clipboard did not work.".to_string(),
            Notice::ClipboardUnavailable => {
                "No clipboard backend is available in this environment.".to_string()
            }
            Notice::SectionNotFound(id) => format!("No section with id '{id}' in the document."),
            Notice::SelectionUnsupported => {
                "Selecting content is not supported with the current engine settings.".to_string()
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Sink for notices.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

/// Prints notices to stderr, one per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: &Notice) {
        eprintln!("{notice}");
    }
}

/// Records notices in memory; the substitute sink used in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Vec<Notice>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_notice_has_a_distinct_message() {
        let notices = [
            Notice::DegradedTerminal,
            Notice::Copied,
            Notice::CopyFailed,
            Notice::ClipboardUnavailable,
            Notice::SectionNotFound("box".into()),
            Notice::SelectionUnsupported,
        ];

        for (index, notice) in notices.iter().enumerate() {
            for other in &notices[index + 1..] {
                assert_ne!(notice.message(), other.message());
            }
        }
    }

    #[test]
    fn memory_notifier_records_in_order() {
        let mut notifier = MemoryNotifier::new();
        notifier.notify(&Notice::DegradedTerminal);
        notifier.notify(&Notice::Copied);

        assert_eq!(
            notifier.notices(),
            &[Notice::DegradedTerminal, Notice::Copied]
        );
    }
}
