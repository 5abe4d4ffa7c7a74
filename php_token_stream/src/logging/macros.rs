//! Logging macros taking `"key" => value` context pairs (any `Display` value)

/// Log an error with a [`Code`](crate::logging::Code), optional `line = n`, and context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, Vec::new())
    };

    ($code:expr, $message:expr, line = $line:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($line), Vec::new())
    };

    ($code:expr, $message:expr, line = $line:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_error_with_context($code, $message, Some($line), context)
    }};

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_error_with_context($code, $message, None, context)
    }};
}

/// Log a success code with context
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, Vec::new())
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_success_with_context($code, $message, context)
    }};
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, Vec::new())
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_info_with_context($message, context)
    }};
}

/// Log a warning, optionally pinned to a source line
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context($message, None, Vec::new())
    };

    ($message:expr, line = $line:expr) => {
        $crate::logging::log_warning_with_context($message, Some($line), Vec::new())
    };

    ($message:expr, line = $line:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_warning_with_context($message, Some($line), context)
    }};

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_warning_with_context($message, None, context)
    }};
}

/// Log a debug message; context is only formatted when debug output is on
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, Vec::new())
        }
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        if $crate::logging::debug_enabled() {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_debug_with_context($message, context)
        }
    };
}
