//! Error collector for batch runs with cargo-style output
//!
//! Events are grouped by the unit they were raised in so a batch can be
//! reported unit by unit once all workers finish.

use super::events::LogEvent;
use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// UNIT CONTEXT
// ============================================================================

/// The unit a thread is currently analysing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    pub unit: String,
    pub unit_id: usize,
}

impl UnitContext {
    pub fn new(unit: impl Into<String>, unit_id: usize) -> Self {
        Self {
            unit: unit.into(),
            unit_id,
        }
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub total_units: usize,
    pub units_with_errors: usize,
    pub units_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe per-unit event store
#[derive(Default)]
pub struct ErrorCollector {
    unit_events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, BTreeMap<String, Vec<LogEvent>>> {
        self.unit_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a unit, bounded per unit and overall
    pub fn record_event(&self, unit: &str, event: LogEvent) {
        let mut events = self.guard();
        let total: usize = events.values().map(Vec::len).sum();
        if total >= LOG_BUFFER_SIZE {
            return;
        }

        let unit_events = events.entry(unit.to_string()).or_default();
        if unit_events.len() < MAX_LOG_EVENTS_PER_FILE {
            unit_events.push(event);
        } else if unit_events.len() == MAX_LOG_EVENTS_PER_FILE {
            unit_events.push(LogEvent::warning(&format!(
                "Too many events for unit (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_unit_events(&self, unit: &str) -> Vec<LogEvent> {
        self.guard().get(unit).cloned().unwrap_or_default()
    }

    pub fn get_all_unit_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        self.guard().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.guard();
        let mut summary = ProcessingSummary {
            total_units: events.len(),
            ..ProcessingSummary::default()
        };

        for unit_events in events.values() {
            let errors = unit_events.iter().filter(|e| e.is_error()).count();
            let warnings = unit_events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                summary.units_with_errors += 1;
            } else if warnings > 0 {
                summary.units_with_warnings += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn clear(&self) {
        self.guard().clear();
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

/// Format collected errors and warnings grouped by unit
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (unit, events) in &collector.get_all_unit_events() {
        let reportable: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", unit));
        for event in reportable {
            let label = if event.is_error() { "error" } else { "warning" };
            let location = event
                .line
                .map(|line| format!(" --> {}:{}", unit, line))
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label,
                event.code.as_str(),
                event.message,
                location
            ));

            if event.is_error() {
                output.push_str(&format!(
                    "  = severity: {}, category: {}\n",
                    event.severity(),
                    event.category()
                ));
            }

            for (key, value) in &event.context {
                if key != "unit" && key != "unit_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            let action = event.recommended_action();
            if event.is_error() && action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 || summary.total_warnings > 0 {
        output.push_str(&format!(
            "{} error(s), {} warning(s) across {} unit(s)\n",
            summary.total_errors, summary.total_warnings, summary.total_units
        ));
    }

    output
}
