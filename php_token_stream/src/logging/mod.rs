//! Global logging module
//!
//! Thread-safe global logging with per-unit attribution for batch runs,
//! cargo-style error reporting, and a macro interface. Logging is a no-op
//! until [`init_global_logging`] runs, so library callers that never
//! initialise it pay nothing.

pub mod codes;
pub mod collector;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::LoggingPreferences;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, UnitContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static UNIT_CONTEXT: RefCell<Option<UnitContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from runtime preferences
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    let service = Arc::new(LoggingService::from_preferences(preferences));
    init_global_logging_with_service(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

/// Whether debug events would reach a sink
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// UNIT CONTEXT MANAGEMENT
// ============================================================================

pub fn set_unit_context(unit: &str, unit_id: usize) {
    UNIT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(UnitContext::new(unit, unit_id));
    });
}

pub fn clear_unit_context() {
    UNIT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with events on this thread attributed to `unit`
pub fn with_unit_context<F, R>(unit: &str, unit_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_unit_context(unit, unit_id);
    let result = f();
    clear_unit_context();
    result
}

pub fn get_current_unit_context() -> Option<UnitContext> {
    UNIT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn dispatch(mut event: LogEvent, context: Vec<(&str, String)>, collect: bool) {
    for (key, value) in context {
        event = event.with_context(key, &value);
    }

    let unit = get_current_unit_context();
    if let Some(unit_ctx) = &unit {
        event = event.with_context("unit", &unit_ctx.unit);
    }

    if collect {
        if let (Some(unit_ctx), Some(collector)) = (&unit, try_get_global_error_collector()) {
            collector.record_event(&unit_ctx.unit, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    line: Option<u32>,
    context: Vec<(&str, String)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(line) = line {
        event = event.with_line(line);
    }
    dispatch(event, context, true);
}

/// Used by `log_warning!`
pub fn log_warning_with_context(message: &str, line: Option<u32>, context: Vec<(&str, String)>) {
    let mut event = LogEvent::warning(message);
    if let Some(line) = line {
        event = event.with_line(line);
    }
    dispatch(event, context, true);
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    dispatch(LogEvent::success(code, message), context, false);
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, String)>) {
    dispatch(LogEvent::info(message), context, false);
}

/// Used by `log_debug!`
pub fn log_debug_with_context(message: &str, context: Vec<(&str, String)>) {
    dispatch(LogEvent::debug(message), context, false);
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

/// Cargo-style report of everything collected so far
pub fn cargo_style_summary() -> String {
    try_get_global_error_collector()
        .map(collector::format_cargo_style_errors)
        .unwrap_or_default()
}

pub fn clear_error_collection() {
    if let Some(collector) = try_get_global_error_collector() {
        collector.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_context_management() {
        assert!(get_current_unit_context().is_none());

        set_unit_context("a.php", 1);
        assert_eq!(
            get_current_unit_context(),
            Some(UnitContext::new("a.php", 1))
        );

        clear_unit_context();
        assert!(get_current_unit_context().is_none());
    }

    #[test]
    fn test_with_unit_context() {
        let result = with_unit_context("b.php", 2, || {
            assert_eq!(get_current_unit_context().map(|c| c.unit_id), Some(2));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_unit_context().is_none());
    }

    #[test]
    fn test_logging_without_initialization_does_not_panic() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "boom", Some(1), Vec::new());
        log_info_with_context("hello", vec![("k", "v".to_string())]);
        let _ = cargo_style_summary();
    }
}
