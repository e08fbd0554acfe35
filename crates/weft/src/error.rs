//! Error types for handler resolution and the widget lifecycle.

use std::fmt;

/// Boxed error produced by a fallible factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving, creating or using handlers.
#[derive(Debug)]
pub enum WeftError {
    /// Direct lookup, the preferred-handler redirect and module auto-loading
    /// all failed to produce a factory.
    HandlerNotFound {
        /// Name of the type that was looked up.
        type_name: &'static str,
    },

    /// A factory was found but returned an error.
    CreationFailed {
        /// Name of the type being created.
        type_name: &'static str,
        /// The error returned by the factory.
        source: BoxError,
    },

    /// The factory produced a different instance type than the caller asked for.
    InstanceMismatch {
        /// Name of the type being created.
        type_name: &'static str,
        /// The instance type the caller requested.
        expected: &'static str,
        /// The instance type the factory was registered with.
        actual: &'static str,
    },

    /// The factory for a widget type was registered without handler support.
    NotAHandler {
        /// Name of the widget type.
        type_name: &'static str,
    },

    /// A process-wide platform is already set and reinitialization is not allowed.
    AlreadyInitialized {
        /// Id of the platform that is currently installed.
        platform: String,
    },

    /// Neither a thread-scoped nor a process-wide platform is available.
    NoPlatform,

    /// The widget was used after it was disposed.
    ObjectDisposed {
        /// Name of the widget type.
        type_name: &'static str,
    },

    /// An extension module was requested by name but is not in the catalog.
    ModuleNotFound {
        /// The module name.
        name: String,
    },
}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeftError::HandlerNotFound { type_name } => {
                write!(f, "No handler registered for type: {}", type_name)
            }
            WeftError::CreationFailed { type_name, source } => {
                write!(f, "Failed to create instance of '{}': {}", type_name, source)
            }
            WeftError::InstanceMismatch {
                type_name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Factory for '{}' produces {}, but {} was requested",
                    type_name, actual, expected
                )
            }
            WeftError::NotAHandler { type_name } => {
                write!(f, "Factory for '{}' does not produce a handler", type_name)
            }
            WeftError::AlreadyInitialized { platform } => {
                write!(f, "Platform already initialized with '{}'", platform)
            }
            WeftError::NoPlatform => {
                write!(f, "No platform is active on this thread and none was initialized")
            }
            WeftError::ObjectDisposed { type_name } => {
                write!(f, "Cannot access a disposed object: {}", type_name)
            }
            WeftError::ModuleNotFound { name } => {
                write!(f, "Extension module not found: {}", name)
            }
        }
    }
}

impl std::error::Error for WeftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeftError::CreationFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for Weft operations.
pub type WeftResult<T> = Result<T, WeftError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_creation_failed_exposes_source() {
        let err = WeftError::CreationFailed {
            type_name: "Button",
            source: "native widget unavailable".into(),
        };

        assert_eq!(
            err.to_string(),
            "Failed to create instance of 'Button': native widget unavailable"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("native widget unavailable")
        );
    }

    #[test]
    fn test_other_errors_have_no_source() {
        let err = WeftError::HandlerNotFound { type_name: "Button" };
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "No handler registered for type: Button");
    }
}
