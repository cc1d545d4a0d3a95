//! Selection engines and the service that drives them.
//!
//! The selection service is chosen at construction time: the modern range
//! engine when available, the legacy body-sweep engine on degraded
//! platforms. Either way the process-local [`SelectionState`] never holds
//! more than one selection.

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::errors::SelectionError;
use crate::domain::model::{ActiveSelection, Document, EngineKind, Section, SelectionState};

/// Which engine the service should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum EngineMode {
    /// Modern engine, unless the environment is degraded.
    #[default]
    Auto,
    Modern,
    Legacy,
}

impl EngineMode {
    /// Return a stable identifier for configuration and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Auto => "auto",
            EngineMode::Modern => "modern",
            EngineMode::Legacy => "legacy",
        }
    }
}

impl FromStr for EngineMode {
    type Err = EngineModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(EngineMode::Auto),
            "modern" | "range" => Ok(EngineMode::Modern),
            "legacy" | "sweep" => Ok(EngineMode::Legacy),
            other => Err(EngineModeParseError::UnknownMode(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`EngineMode`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EngineModeParseError {
    #[error("unknown selection engine '{0}'")]
    UnknownMode(String),
}

/// Which engines the platform configuration has enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineAvailability {
    pub modern: bool,
    pub legacy: bool,
}

impl Default for EngineAvailability {
    fn default() -> Self {
        Self {
            modern: true,
            legacy: true,
        }
    }
}

/// Strategy for establishing a selection over a document's rendered body.
pub trait SelectionEngine {
    fn kind(&self) -> EngineKind;

    /// Select the section's rendered contents, replacing any prior
    /// selection.
    fn select(&self, doc: &Document, section: &Section, state: &mut SelectionState);
}

/// Modern path: a fresh range from the document's range factory.
#[derive(Debug, Default)]
pub struct RangeEngine;

impl SelectionEngine for RangeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Range
    }

    fn select(&self, doc: &Document, section: &Section, state: &mut SelectionState) {
        let range = doc.range_of(section);
        state.remove_all();
        state.add(ActiveSelection {
            section_id: section.id.clone(),
            range,
            engine: EngineKind::Range,
        });
    }
}

/// Legacy path: a body-level text sweep moved to bound the section.
#[derive(Debug, Default)]
pub struct SweepEngine;

impl SelectionEngine for SweepEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Sweep
    }

    fn select(&self, doc: &Document, section: &Section, state: &mut SelectionState) {
        let range = doc.body_sweep().move_to_section(section);
        tracing::debug!(
            section = %section.id,
            start = range.start,
            end = range.end,
            "sweep selection established"
        );
        state.remove_all();
        state.add(ActiveSelection {
            section_id: section.id.clone(),
            range,
            engine: EngineKind::Sweep,
        });
    }
}

/// Drives whichever engine was selected at construction time.
pub struct SelectionService {
    engine: Box<dyn SelectionEngine>,
}

impl std::fmt::Debug for SelectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionService").finish_non_exhaustive()
    }
}

impl SelectionService {
    /// Choose an engine from the requested mode, the configured
    /// availability, and the environment flavor. Fails when no enabled
    /// engine satisfies the request.
    pub fn from_parts(
        mode: EngineMode,
        availability: EngineAvailability,
        degraded: bool,
    ) -> Result<Self, SelectionError> {
        let engine: Box<dyn SelectionEngine> = match mode {
            EngineMode::Modern if availability.modern => Box::new(RangeEngine),
            EngineMode::Legacy if availability.legacy => Box::new(SweepEngine),
            EngineMode::Auto => {
                if availability.modern && !(degraded && availability.legacy) {
                    Box::new(RangeEngine)
                } else if availability.legacy {
                    Box::new(SweepEngine)
                } else {
                    return Err(SelectionError::EnginesUnavailable);
                }
            }
            _ => return Err(SelectionError::EnginesUnavailable),
        };
        Ok(Self { engine })
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }

    /// Select the section's rendered contents.
    pub fn select_section(&self, doc: &Document, section: &Section, state: &mut SelectionState) {
        self.engine.select(doc, section, state);
    }

    /// Clear whatever is selected. Safe to call repeatedly.
    pub fn clear(&self, state: &mut SelectionState) {
        state.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::document;

    fn available() -> EngineAvailability {
        EngineAvailability::default()
    }

    #[test]
    fn auto_prefers_the_modern_engine() {
        let service = SelectionService::from_parts(EngineMode::Auto, available(), false).unwrap();
        assert_eq!(service.engine_kind(), EngineKind::Range);
    }

    #[test]
    fn auto_falls_back_to_legacy_when_degraded() {
        let service = SelectionService::from_parts(EngineMode::Auto, available(), true).unwrap();
        assert_eq!(service.engine_kind(), EngineKind::Sweep);
    }

    #[test]
    fn degraded_without_legacy_still_uses_modern() {
        let availability = EngineAvailability {
            modern: true,
            legacy: false,
        };
        let service = SelectionService::from_parts(EngineMode::Auto, availability, true).unwrap();
        assert_eq!(service.engine_kind(), EngineKind::Range);
    }

    #[test]
    fn disabled_engines_fail_construction() {
        let none = EngineAvailability {
            modern: false,
            legacy: false,
        };
        let err = SelectionService::from_parts(EngineMode::Auto, none, false).unwrap_err();
        assert_eq!(err, SelectionError::EnginesUnavailable);

        let no_modern = EngineAvailability {
            modern: false,
            legacy: true,
        };
        let err = SelectionService::from_parts(EngineMode::Modern, no_modern, false).unwrap_err();
        assert_eq!(err, SelectionError::EnginesUnavailable);
    }

    #[test]
    fn both_engines_select_the_same_contents() {
        let doc = document::parse("## Box\n\nHello\n");
        let section = doc.section("box").unwrap();

        let mut modern_state = SelectionState::new();
        RangeEngine.select(&doc, section, &mut modern_state);
        let modern = modern_state.active().unwrap().range;

        let mut legacy_state = SelectionState::new();
        SweepEngine.select(&doc, section, &mut legacy_state);
        let legacy = legacy_state.active().unwrap().range;

        assert_eq!(doc.slice(modern), doc.slice(legacy));
        assert_eq!(doc.slice(modern), "Hello");
    }

    #[test]
    fn selecting_replaces_the_previous_selection() {
        let doc = document::parse("## One\n\nfirst\n\n## Two\n\nsecond\n");
        let service = SelectionService::from_parts(EngineMode::Modern, available(), false).unwrap();
        let mut state = SelectionState::new();

        service.select_section(&doc, doc.section("one").unwrap(), &mut state);
        service.select_section(&doc, doc.section("two").unwrap(), &mut state);

        let active = state.active().unwrap();
        assert_eq!(active.section_id, "two");
        assert_eq!(doc.slice(active.range), "second");
    }

    #[test]
    fn clear_twice_has_no_further_effect() {
        let doc = document::parse("## Box\n\nHello\n");
        let service = SelectionService::from_parts(EngineMode::Auto, available(), false).unwrap();
        let mut state = SelectionState::new();

        service.select_section(&doc, doc.section("box").unwrap(), &mut state);
        service.clear(&mut state);
        let cleared = state.clone();
        service.clear(&mut state);

        assert!(state.is_empty());
        assert_eq!(state, cleared);
    }

    #[test]
    fn engine_mode_parses_aliases() {
        assert_eq!("range".parse::<EngineMode>().unwrap(), EngineMode::Modern);
        assert_eq!("SWEEP".parse::<EngineMode>().unwrap(), EngineMode::Legacy);
        assert!("turbo".parse::<EngineMode>().is_err());
    }
}
