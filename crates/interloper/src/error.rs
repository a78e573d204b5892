//! Error types for interloper
//!
//! This module defines the error hierarchy for the interloper crate using `thiserror`.
//! Declarations, dispatch and user-supplied hooks and operations all report
//! failures as [`InterloperError`].
//!
//! # Error Variants
//!
//! - [`InterloperError::UnknownOperation`]: a hook names an operation no scope in the ancestry defines
//! - [`InterloperError::NoHookedAncestor`]: hook inheritance found no intercepting ancestor
//! - [`InterloperError::NoSuchOperation`]: an object was asked to run an operation it does not respond to
//! - [`InterloperError::NoSuperOperation`]: an operation called through with nothing left to call
//! - [`InterloperError::Hook`]: failure raised by a hook body
//! - [`InterloperError::Operation`]: failure raised by an operation body
//! - [`InterloperError::Json`]: argument decoding errors (auto-converts from `serde_json::Error`)
//! - [`InterloperError::Other`]: any other boxed error raised by user code
//!
//! # Example
//!
//! ```rust
//! use interloper::error::InterloperError;
//!
//! fn parse_amount(args: &serde_json::Value) -> Result<u64, InterloperError> {
//!     // Auto-conversion from serde_json::Error
//!     let amount: u64 = serde_json::from_value(args["amount"].clone())?;
//!     if amount == 0 {
//!         return Err(InterloperError::Hook("amount must be positive".to_string()));
//!     }
//!     Ok(amount)
//! }
//!
//! assert!(parse_amount(&serde_json::json!({ "amount": 5 })).is_ok());
//! assert!(parse_amount(&serde_json::json!({ "amount": "five" })).is_err());
//! ```

use thiserror::Error;

/// The main error type for all interloper operations
///
/// Declaration-time variants (`UnknownOperation`, `NoHookedAncestor`) surface to
/// the code performing the declaration. Everything raised while an intercepted
/// call runs surfaces, unchanged, to the caller of [`Object::call`](crate::Object::call).
#[derive(Error, Debug)]
pub enum InterloperError {
    /// A hook was declared for an operation that nothing in the scope's ancestry defines
    ///
    /// The declaration is rejected as a whole: no hook is appended and no
    /// interceptor is installed for any of the named operations.
    #[error("cannot hook `{operation}` on {scope}: no such operation in its ancestry")]
    UnknownOperation {
        /// Label of the declaring scope
        scope: String,
        /// The operation name that could not be found
        operation: String,
    },

    /// Hook inheritance was requested but no ancestor intercepts the operation
    #[error("cannot inherit hooks for `{operation}` on {scope}: no ancestor intercepts it")]
    NoHookedAncestor {
        /// Label of the inheriting scope
        scope: String,
        /// The operation whose hooks were requested
        operation: String,
    },

    /// The object's scope hierarchy has no implementation of the operation
    #[error("undefined operation `{operation}` for {scope}")]
    NoSuchOperation {
        /// Label of the object's dynamic scope
        scope: String,
        /// The operation that was called
        operation: String,
    },

    /// An operation called its overridden version but none exists
    #[error("no overridden implementation of `{operation}` to call")]
    NoSuperOperation {
        /// The operation being called through
        operation: String,
    },

    /// A hook body failed
    ///
    /// Returned verbatim to the caller of the intercepted operation.
    #[error("hook failed: {0}")]
    Hook(String),

    /// An operation body failed
    #[error("operation failed: {0}")]
    Operation(String),

    /// Failed to decode or encode operation arguments
    ///
    /// This error is automatically converted from `serde_json::Error`, so user
    /// code can decode its arguments with `?`.
    #[error("invalid arguments: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other error raised by user code
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias used throughout the crate
pub type Result<T, E = InterloperError> = std::result::Result<T, E>;
