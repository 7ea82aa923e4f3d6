//! Error types for the Ember3D engine
//!
//! Lookup misses (unknown entity, camera or resource) are never errors:
//! they surface as `Option`, an `INVALID` sentinel or a silent no-op.
//! The variants below cover the failures a caller can act on.

use std::fmt;

/// Result type for Ember3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ember3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (render backend, lock poisoning, ...)
    BackendError(String),

    /// Invalid resource, e.g. the command handler of an unloaded module
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// No console command registered under `namespace.name`
    CommandNotFound(String),

    /// Console command called with an argument count outside its range
    InvalidArguments(String),

    /// A renderable phase hook reported a failure
    HookFailed(String),

    /// A module was compiled for a link table version range that does
    /// not contain the published version
    AbiMismatch {
        module: String,
        expected_min: u32,
        expected_max: u32,
        found: u32,
    },

    /// A module refused to load or could not be located
    PluginLoadFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::CommandNotFound(msg) => write!(f, "Command not found: {}", msg),
            Error::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            Error::HookFailed(msg) => write!(f, "Hook failed: {}", msg),
            Error::AbiMismatch { module, expected_min, expected_max, found } => write!(
                f,
                "ABI mismatch: module '{}' supports link table versions {}..={}, host publishes {}",
                module, expected_min, expected_max, found
            ),
            Error::PluginLoadFailed(msg) => write!(f, "Plugin load failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an `Error::BackendError` and log it at ERROR level with file:line
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("ember3d::Scene", "Camera {} not found", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::ember3d::Error::BackendError(message)
    }};
}

/// Log and return an `Error::BackendError` from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
