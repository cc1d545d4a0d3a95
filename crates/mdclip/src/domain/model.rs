//! Domain models for documents, sections, and selections.

/// A contiguous span over a document's rendered body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// An identifier-addressed, heading-delimited region of a document.
///
/// `text` holds the rendered plain contents of the section (heading
/// excluded, subsections included); `span` locates the same contents
/// within the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub heading: String,
    pub level: u8,
    pub text: String,
    pub span: Range,
}

/// A parsed document: rendered body text plus its addressable sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
    body: String,
}

impl Document {
    pub fn from_parts(sections: Vec<Section>, body: String) -> Self {
        Self { sections, body }
    }

    /// Resolve a section by its page-unique id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// All sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The rendered body text of the whole document.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Range factory: a fresh range spanning the section's rendered
    /// contents. The modern selection path is built on this.
    pub fn range_of(&self, section: &Section) -> Range {
        section.span
    }

    /// Body-level sweep used by the legacy selection path.
    pub fn body_sweep(&self) -> TextSweep<'_> {
        TextSweep { body: &self.body }
    }

    /// The body text a range covers.
    pub fn slice(&self, range: Range) -> &str {
        let end = range.end.min(self.body.len());
        let start = range.start.min(end);
        &self.body[start..end]
    }
}

/// Cursor over the whole rendered body, bounding a section by locating its
/// content rather than consulting the range index.
#[derive(Debug)]
pub struct TextSweep<'a> {
    body: &'a str,
}

impl TextSweep<'_> {
    /// Move the sweep to bound the section's rendered contents. Falls back
    /// to the recorded span when the contents cannot be located verbatim.
    pub fn move_to_section(&self, section: &Section) -> Range {
        if section.text.is_empty() {
            return Range {
                start: section.span.start,
                end: section.span.start,
            };
        }
        match self.body.find(&section.text) {
            Some(start) => Range {
                start,
                end: start + section.text.len(),
            },
            None => section.span,
        }
    }
}

/// How an active selection was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Range,
    Sweep,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Range => "range",
            EngineKind::Sweep => "sweep",
        }
    }
}

/// The selection currently held by [`SelectionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSelection {
    pub section_id: String,
    pub range: Range,
    pub engine: EngineKind,
}

/// Process-local selection holder.
///
/// Holds at most one selection at a time; adding a range replaces whatever
/// was selected before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: Option<ActiveSelection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection with `selection`.
    pub fn add(&mut self, selection: ActiveSelection) {
        self.active = Some(selection);
    }

    /// Drop the current selection, if any. Idempotent.
    pub fn remove_all(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveSelection> {
        self.active.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}
