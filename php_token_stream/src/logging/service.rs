//! Logging service and sinks

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::LoggingPreferences;
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service: level filter in front of one sink
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Build the sink selected by the runtime preferences
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let min_level = preferences.min_log_level;
        let logger: Arc<dyn Logger> = if !preferences.enable_console_logging {
            Arc::new(NullLogger)
        } else if preferences.use_structured_logging {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };

        Self::new(logger, min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }
}

/// Human-readable lines; errors and warnings to stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        match event.level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", event.format()),
            _ => println!("{}", event.format()),
        }
    }
}

/// One JSON object per line on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Discards everything
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Memory logger for testing
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.guard().clone()
    }

    pub fn event_count(&self) -> usize {
        self.guard().len()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.guard().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.guard().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.guard().iter().any(|e| e.is_info() && e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        self.guard().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_level_filtering() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_error(codes::scope::UNMATCHED_SCOPE, "unmatched");
        service.log_event(LogEvent::warning("careful"));
        service.log_event(LogEvent::info("chatty"));
        service.log_event(LogEvent::debug("very chatty"));

        assert_eq!(memory.event_count(), 2);
        assert!(memory.has_error_with_code(codes::scope::UNMATCHED_SCOPE));
        assert_eq!(memory.get_errors().len(), 1);
    }

    #[test]
    fn test_success_events_are_info() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log_success(codes::success::BATCH_COMPLETE, "done");

        assert!(memory.has_success_with_code(codes::success::BATCH_COMPLETE));
        memory.clear();
        assert_eq!(memory.event_count(), 0);
    }

    #[test]
    fn test_from_preferences_respects_level() {
        let preferences = LoggingPreferences {
            use_structured_logging: true,
            enable_console_logging: false,
            min_log_level: LogLevel::Debug,
        };
        let service = LoggingService::from_preferences(&preferences);
        assert!(service.should_log(LogLevel::Debug));
        assert_eq!(service.min_level(), LogLevel::Debug);
    }
}
