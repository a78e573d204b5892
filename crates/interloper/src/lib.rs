//! Interloper - before/after hooks around named operations
//!
//! Interloper lets a declaring scope attach ordered hooks that run before and
//! after its operations, without editing the operation bodies. Scopes form a
//! single-parent hierarchy: a subscope inherits operations from its parent,
//! may override them and call through to the overridden version, may declare
//! its own hooks, and may explicitly inherit a copy of its ancestor's hooks.
//!
//! # Overview
//!
//! - Ordered before and after hook chains per scope, operation and phase
//! - Idempotent interception: the first hook installs one interceptor, later
//!   hooks only extend the chains it reads on every call
//! - Explicit [`Operation`](operation::Operation) decorators with a
//!   [`Next`](operation::Next) link instead of method redefinition
//! - Explicit, by-value hook inheritance from the nearest hooked ancestor
//! - Procedural macros for hook and operation types
//!
//! # Architecture
//!
//! - `scope`: enrollment, operation tables, declarations and hierarchy resolution
//! - `registry`: per-scope hook storage
//! - `intercept`: the installer and the installed interceptor
//! - `object`: instances and dispatch
//! - `hooks`: hook trait, chains and phases
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```
//! use interloper::prelude::*;
//! use serde_json::json;
//!
//! let base = Scope::<Vec<&'static str>>::new("Base");
//! base.define("save", |this, _args, _next| {
//!     this.state_mut().push("base save");
//!     Ok(json!(true))
//! });
//! base.before("save", |this, _args| {
//!     this.state_mut().push("base before");
//!     Ok(())
//! })?;
//!
//! let record = base.subscope("Record");
//! record.define("save", |this, args, next| {
//!     this.state_mut().push("record save");
//!     next.call(this, args)
//! });
//! record.after("save", |this, _args| {
//!     this.state_mut().push("record after");
//!     Ok(())
//! })?;
//!
//! let mut object = record.instantiate(Vec::new());
//! assert_eq!(object.call("save", &mut json!({}))?, true);
//! assert_eq!(
//!     object.state(),
//!     &["record save", "base before", "base save", "record after"]
//! );
//! # Ok::<(), InterloperError>(())
//! ```
//!
//! # License
//!
//! Licensed under MIT. See LICENSE file for details.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export macros from interloper_macros
pub use interloper_macros::*;

/// Error types and utilities
///
/// This module defines the `InterloperError` enum and the `Result` alias used
/// by every fallible operation in the crate:
///
/// - `UnknownOperation` - A declaration names an operation with no reachable body
/// - `NoHookedAncestor` - Inheritance found no ancestor intercepting the operation
/// - `NoSuchOperation` - An object was called with an operation it does not respond to
/// - `NoSuperOperation` - A body called through with no overridden implementation left
/// - `Hook` / `Operation` - Failures raised by user code
/// - `Json` - Argument decoding errors (auto-converts from `serde_json::Error`)
/// - `Other` - Any other boxed error
pub mod error;

/// Hook callables, phases and ordered chains
///
/// Key types:
/// - `Hook` - Trait for implementing hook logic
/// - `HookChain` - Ordered hooks for one operation and phase
/// - `Phase` - `Before` or `After`
/// - `OperationName` / `OperationNames` - Names a declaration applies to
pub mod hooks;

/// Per-scope hook storage
///
/// `ScopeRegistry` maps phase and operation name to the hook chain declared
/// by exactly one scope. `RegistrySnapshot` is its serializable view.
pub mod registry;

/// Operation bodies and the link to the overridden implementation
pub mod operation;

/// Interception installer and call interceptor
///
/// `ensure_intercepted` installs at most one `Interceptor` per scope and
/// operation. The interceptor runs the scope's before chain, the wrapped
/// layers, then the after chain, and returns the wrapped result unchanged.
pub mod intercept;

/// Declaring scopes and the hierarchy resolver
///
/// `Scope` carries identity, parent link, operations, its registry and its
/// interceptors. `ScopeBuilder` declares a scope in one block.
pub mod scope;

/// Instances of a scope and dispatch
pub mod object;

// Public API re-exports
pub use object::Object;
pub use scope::Scope;
pub use serde_json::Value;

// Prelude module for common imports
pub mod prelude {
    //! Common imports for interloper users
    //!
    //! Use `use interloper::prelude::*;` to import commonly used types.

    pub use crate::error::InterloperError;
    pub use crate::hooks::{Hook, HookChain, OperationName, OperationNames, Phase};
    pub use crate::intercept::{ensure_intercepted, Interceptor};
    pub use crate::object::Object;
    pub use crate::operation::{Next, Operation};
    pub use crate::registry::{RegistrySnapshot, ScopeRegistry};
    pub use crate::scope::{Ancestry, Scope, ScopeBuilder, ScopeId, ScopeSnapshot};
    pub use interloper_macros::{hook, operation};
    pub use serde_json::Value;
}
