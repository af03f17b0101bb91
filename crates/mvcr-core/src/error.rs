//! Core error types for the mvcr-rs framework.
//!
//! This module provides the error enum [`MvcrError`] shared by the hook
//! gateway, the component resolvers and the router. Each variant is one of
//! the failure kinds a dispatch can end with.

use thiserror::Error;

/// The primary error type for the mvcr-rs framework.
///
/// Propagation rules worth knowing:
///
/// - [`NotFound`](MvcrError::NotFound) raised while the default dispatcher
///   resolves a controller or view is downgraded to an unsatisfied route so the
///   router moves on to the next candidate. Anywhere else it propagates.
/// - [`Halt`](MvcrError::Halt) always aborts the whole `route()` call.
/// - [`TypeMismatch`](MvcrError::TypeMismatch) and
///   [`InvalidArgument`](MvcrError::InvalidArgument) are programmer errors and
///   always propagate.
#[derive(Error, Debug)]
pub enum MvcrError {
    // ── Resolution ───────────────────────────────────────────────────

    /// A caller supplied an unusable argument, such as an empty component name.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nothing matched: no component file, no type, or no satisfied route.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resolved type does not carry the requested role.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A get-hook cancelled the resolution on purpose.
    #[error("Refused: {0}")]
    Refused(String),

    // ── Dispatch ─────────────────────────────────────────────────────

    /// A dispatch hook or a view marker stopped the route.
    #[error("Halted: {0}")]
    Halt(String),

    /// A hook listener failed while the named hook was being fired.
    #[error("Hook '{hook}' failed: {message}")]
    HookFailure {
        /// The name of the hook that was being fired.
        hook: String,
        /// What went wrong inside the listener.
        message: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// The framework is improperly configured (bad route pattern, bad registration).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// Settings could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MvcrError {
    /// Builds a [`HookFailure`](MvcrError::HookFailure) for the named hook.
    pub fn hook_failure(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailure {
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for [`NotFound`](MvcrError::NotFound).
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`Halt`](MvcrError::Halt).
    pub const fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }

    /// Returns the HTTP status code an HTTP adapter should answer with.
    ///
    /// - `InvalidArgument` -> 400
    /// - `Refused`, `Halt` -> 403
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::Refused(_) | Self::Halt(_) => 403,
            Self::NotFound(_) => 404,
            Self::TypeMismatch(_)
            | Self::HookFailure { .. }
            | Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, MvcrError>`.
pub type MvcrResult<T> = Result<T, MvcrError>;
