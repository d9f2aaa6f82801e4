//! Logging macros taking `"key" => value` context lists
//!
//! Context values only need `Display`. Every macro is a no-op when the global
//! logger has not been initialized.

/// Formats a `"key" => value` list and passes it to `$call` as `$context`
#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_context {
    ($context:ident => $call:expr; $($key:expr => $value:expr),*) => {{
        let owned: ::std::vec::Vec<(&str, ::std::string::String)> =
            ::std::vec![$(($key, ::std::string::ToString::to_string(&$value))),*];
        let pairs: ::std::vec::Vec<(&str, &str)> =
            owned.iter().map(|(key, value)| (*key, value.as_str())).collect();
        let $context: &[(&str, &str)] = &pairs;
        $call
    }};
}

/// Log an error event and record it against the current file
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, position = $position:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(context =>
            $crate::logging::log_error_with_context($code, $message, Some($position), context);
            $($key => $value),*)
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(context =>
            $crate::logging::log_error_with_context($code, $message, None, context);
            $($key => $value),*)
    };
}

/// Log a coded warning and record it against the current file
#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(context =>
            $crate::logging::log_warning_with_context($code, $message, context);
            $($key => $value),*)
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(context =>
            $crate::logging::log_success_with_context($code, $message, context);
            $($key => $value),*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(context =>
            $crate::logging::log_info_with_context($message, context);
            $($key => $value),*)
    };
}

/// Context is only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::__log_with_context!(context =>
                $crate::logging::log_debug_with_context($message, context);
                $($key => $value),*)
        }
    };
}

/// Success event with a `duration_ms` entry
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::log_success!($code, $message,
            "duration_ms" => $crate::logging::duration_ms($duration)
            $(, $key => $value)*)
    };
}
