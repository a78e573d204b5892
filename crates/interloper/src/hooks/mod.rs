//! Hook callables, phases and ordered chains.
//!
//! A hook runs at a fixed point relative to an intercepted operation:
//!
//! - [`Phase::Before`] hooks run, in declaration order, before the operation body
//! - [`Phase::After`] hooks run, in declaration order, after the body returns
//!
//! Hooks observe the call and may mutate the object and the shared arguments,
//! but never the value the operation returns.
//!
//! # Architecture
//!
//! - [`Hook`] - Trait for hook logic (closures implement it via a blanket impl)
//! - [`HookChain`] - Ordered hooks for one (operation, phase) pair of one scope
//! - [`Phase`] - `Before` or `After`
//! - [`OperationName`] / [`OperationNames`] - Names a declaration applies to
//!
//! # Examples
//!
//! ## Audit a call before and after
//!
//! ```
//! use interloper::prelude::*;
//! use serde_json::json;
//!
//! let ledger = Scope::<Vec<String>>::new("Ledger");
//! ledger.define("post", |this, args, _next| {
//!     this.state_mut().push(format!("post {}", args["amount"]));
//!     Ok(json!("posted"))
//! });
//! ledger.before("post", |this, _args| {
//!     this.state_mut().push("open".to_string());
//!     Ok(())
//! })?;
//! ledger.after("post", |this, _args| {
//!     this.state_mut().push("close".to_string());
//!     Ok(())
//! })?;
//!
//! let mut object = ledger.instantiate(Vec::new());
//! let result = object.call("post", &mut json!({ "amount": 3 }))?;
//!
//! assert_eq!(result, "posted");
//! assert_eq!(object.state(), &["open", "post 3", "close"]);
//! # Ok::<(), InterloperError>(())
//! ```
//!
//! ## Mutate shared arguments
//!
//! ```
//! use interloper::prelude::*;
//! use serde_json::json;
//!
//! let counter = Scope::<()>::new("Counter");
//! counter.define("inspect", |_this, args, _next| Ok(args["value"].clone()));
//! counter.before("inspect", |_this, args| {
//!     let value = args["value"].as_i64().unwrap_or_default();
//!     args["value"] = json!(value + 1);
//!     Ok(())
//! })?;
//!
//! let mut args = json!({ "value": 0 });
//! let seen = counter.instantiate(()).call("inspect", &mut args)?;
//! assert_eq!(seen, 1);
//! assert_eq!(args["value"], 1);
//! # Ok::<(), InterloperError>(())
//! ```

mod callback;
mod chain;
mod types;

pub use callback::Hook;
pub use chain::HookChain;
pub use types::{OperationName, OperationNames, Phase};
