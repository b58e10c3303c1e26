//! Tracing macros that compile to nothing when the `tracing` feature is disabled.

/// Emit a warn-level log message.
#[cfg(any(test, feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        tracing::warn!($($arg)*);
    }};
}

/// Emit a warn-level log message (no-op version).
#[cfg(not(any(test, feature = "tracing")))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Emit a debug-level log message.
#[cfg(any(test, feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        tracing::debug!($($arg)*);
    }};
}

/// Emit a debug-level log message (no-op version).
#[cfg(not(any(test, feature = "tracing")))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}
