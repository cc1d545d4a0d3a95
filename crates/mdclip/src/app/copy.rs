//! The copy flow: warn, resolve, select, copy, notify, clear.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::app::notify::{Notice, Notifier};
use crate::app::selection::SelectionService;
use crate::domain::errors::ClipboardError;
use crate::domain::model::{Document, SelectionState};
use crate::infra::clipboard::Clipboard;

/// Terminal outcome of one copy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyOutcome {
    Copied,
    Rejected,
    ClipboardUnavailable,
    SectionNotFound,
    SelectionUnsupported,
}

impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Copied)
    }
}

/// Machine-readable record of one copy attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CopyReport {
    pub section_id: String,
    pub outcome: CopyOutcome,
    /// Engine the selection service was constructed with, when one was.
    pub engine: Option<&'static str>,
    pub degraded_warning: bool,
    /// Characters in the selected payload, when a selection was made.
    pub characters: Option<usize>,
    pub completed_at: String,
}

/// Top-level entry point bound to a user action.
///
/// Holds the injected services for one operation: the selection service
/// (absent when construction failed because every engine is disabled), the
/// clipboard sink, and the notifier.
pub struct Copier<'a> {
    selection: Option<&'a SelectionService>,
    clipboard: &'a mut dyn Clipboard,
    notifier: &'a mut dyn Notifier,
    degraded: bool,
    warn_on_degraded: bool,
}

impl<'a> Copier<'a> {
    pub fn new(
        selection: Option<&'a SelectionService>,
        clipboard: &'a mut dyn Clipboard,
        notifier: &'a mut dyn Notifier,
        degraded: bool,
        warn_on_degraded: bool,
    ) -> Self {
        Self {
            selection,
            clipboard,
            notifier,
            degraded,
            warn_on_degraded,
        }
    }

    /// Copy the rendered contents of the section identified by `id`.
    ///
    /// Never returns an error: every failure becomes a notice and a report
    /// outcome, and the selection is cleared on every path.
    pub fn copy_section(
        &mut self,
        doc: &Document,
        id: &str,
        state: &mut SelectionState,
    ) -> CopyReport {
        let mut warned = false;
        if self.degraded && self.warn_on_degraded {
            self.notifier.notify(&Notice::DegradedTerminal);
            warned = true;
        }

        let (outcome, characters) = self.attempt(doc, id, state);
        tracing::debug!(section = id, outcome = ?outcome, "copy attempt finished");

        let notice = match outcome {
            CopyOutcome::Copied => Notice::Copied,
            CopyOutcome::Rejected => Notice::CopyFailed,
            CopyOutcome::ClipboardUnavailable => Notice::ClipboardUnavailable,
            CopyOutcome::SectionNotFound => Notice::SectionNotFound(id.to_string()),
            CopyOutcome::SelectionUnsupported => Notice::SelectionUnsupported,
        };
        self.notifier.notify(&notice);

        // The selection never outlives the operation, whatever the outcome.
        match self.selection {
            Some(selection) => selection.clear(state),
            None => state.remove_all(),
        }

        CopyReport {
            section_id: id.to_string(),
            outcome,
            engine: self.selection.map(|service| service.engine_kind().as_str()),
            degraded_warning: warned,
            characters,
            completed_at: now_rfc3339(),
        }
    }

    fn attempt(
        &mut self,
        doc: &Document,
        id: &str,
        state: &mut SelectionState,
    ) -> (CopyOutcome, Option<usize>) {
        let selection = match self.selection {
            Some(selection) => selection,
            None => return (CopyOutcome::SelectionUnsupported, None),
        };

        let section = match doc.section(id) {
            Some(section) => section,
            None => return (CopyOutcome::SectionNotFound, None),
        };

        selection.select_section(doc, section, state);
        let payload = state
            .active()
            .map(|active| doc.slice(active.range))
            .unwrap_or_default();
        let characters = Some(payload.chars().count());

        match self.clipboard.copy(payload) {
            Ok(()) => (CopyOutcome::Copied, characters),
            Err(ClipboardError::Rejected(err)) => {
                tracing::warn!(error = %err, "clipboard backends rejected the copy");
                (CopyOutcome::Rejected, characters)
            }
            Err(ClipboardError::Unavailable) => (CopyOutcome::ClipboardUnavailable, characters),
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
