//! Interception installer and the installed call interceptor.
//!
//! Hooking an operation installs one [`Interceptor`] on the declaring scope.
//! The interceptor is an [`Operation`] decorator: dispatch places it in front
//! of the scope's own body (if any), and it reaches that body, or the next
//! more general layer, through its [`Next`] link.
//!
//! ```text
//! Object::call("m")
//!   └─ B interceptor   before hooks of B
//!        └─ B body     calls next
//!             └─ A interceptor   before hooks of A
//!                  └─ A body
//!                  after hooks of A
//!        after hooks of B
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{InterloperError, Result};
use crate::hooks::{OperationName, Phase};
use crate::object::Object;
use crate::operation::{Next, Operation};
use crate::registry::{write_lock, ScopeRegistry};
use crate::scope::Scope;

/// Wrapper installed by the first hook declared for a (scope, operation) pair
///
/// Hook chains are read from the owning scope's registry on every call, so
/// hooks declared after installation take effect on the next call.
pub struct Interceptor<S> {
    scope: String,
    operation: OperationName,
    registry: Arc<ScopeRegistry<S>>,
}

impl<S> Interceptor<S> {
    /// Label of the scope that owns this interceptor
    pub fn scope_label(&self) -> &str {
        &self.scope
    }

    /// The intercepted operation
    pub fn operation(&self) -> &OperationName {
        &self.operation
    }
}

impl<S: 'static> Operation<S> for Interceptor<S> {
    fn call(&self, this: &mut Object<S>, args: &mut Value, next: Next<'_, S>) -> Result<Value> {
        let before = self.registry.hooks_for(Phase::Before, self.operation.as_str());
        trace!(
            scope = %self.scope,
            operation = %self.operation,
            phase = %Phase::Before,
            hooks = before.len(),
            "Running hooks"
        );
        before.run(this, args)?;

        let result = next.call(this, args)?;

        let after = self.registry.hooks_for(Phase::After, self.operation.as_str());
        trace!(
            scope = %self.scope,
            operation = %self.operation,
            phase = %Phase::After,
            hooks = after.len(),
            "Running hooks"
        );
        after.run(this, args)?;

        Ok(result)
    }
}

impl<S> std::fmt::Debug for Interceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("scope", &self.scope)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

/// Make sure `scope` has an interceptor for `operation`
///
/// Returns `Ok(true)` if this call installed it and `Ok(false)` if one was
/// already in place. Repeat calls never install a second layer.
///
/// # Errors
///
/// [`InterloperError::UnknownOperation`] if no scope in the ancestry defines
/// a body for `operation`. Nothing is installed in that case.
///
/// # Example
///
/// ```
/// use interloper::prelude::*;
/// use interloper::intercept::ensure_intercepted;
///
/// let scope = Scope::<()>::new("Report");
/// scope.define("render", |_this, _args, _next| Ok(Value::Null));
///
/// assert!(ensure_intercepted(&scope, "render")?);
/// assert!(!ensure_intercepted(&scope, "render")?);
/// assert!(ensure_intercepted(&scope, "publish").is_err());
/// # Ok::<(), InterloperError>(())
/// ```
pub fn ensure_intercepted<S: 'static>(scope: &Scope<S>, operation: &str) -> Result<bool> {
    if !scope.responds_to(operation) {
        return Err(InterloperError::UnknownOperation {
            scope: scope.label(),
            operation: operation.to_string(),
        });
    }

    let mut interceptors = write_lock(scope.interceptor_table());
    if interceptors.contains_key(operation) {
        return Ok(false);
    }

    let operation = OperationName::from(operation);
    interceptors.insert(
        operation.clone(),
        Arc::new(Interceptor {
            scope: scope.label(),
            operation: operation.clone(),
            registry: scope.shared_registry(),
        }),
    );
    debug!(scope = %scope, %operation, "Installed interceptor");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Scope<Vec<String>> {
        let scope = Scope::new("Recorder");
        scope.define("record", |this: &mut Object<Vec<String>>, args: &mut Value, _next: Next<'_, Vec<String>>| {
            this.state_mut().push("body".to_string());
            Ok(args.clone())
        });
        scope
    }

    #[test]
    fn test_install_is_idempotent() {
        let scope = scope();
        assert!(ensure_intercepted(&scope, "record").unwrap());
        assert!(!ensure_intercepted(&scope, "record").unwrap());
        assert_eq!(scope.intercepted_operations().len(), 1);

        let mut object = scope.instantiate(Vec::new());
        object.call("record", &mut Value::Null).unwrap();
        assert_eq!(object.state(), &["body"]);
    }

    #[test]
    fn test_unknown_operation_installs_nothing() {
        let scope = scope();
        let err = ensure_intercepted(&scope, "erase").unwrap_err();
        assert!(matches!(err, InterloperError::UnknownOperation { .. }));
        assert!(scope.intercepted_operations().is_empty());
    }

    #[test]
    fn test_interceptor_reads_registry_per_call() {
        let scope = scope();
        ensure_intercepted(&scope, "record").unwrap();

        let mut object = scope.instantiate(Vec::new());
        object.call("record", &mut Value::Null).unwrap();

        scope
            .before("record", |this, _args| {
                this.state_mut().push("late".to_string());
                Ok(())
            })
            .unwrap();
        object.call("record", &mut Value::Null).unwrap();

        assert_eq!(object.state(), &["body", "late", "body"]);
    }

    #[test]
    fn test_result_passes_through_untouched() {
        let scope = scope();
        scope
            .after("record", |_this, args| {
                args["after"] = json!(true);
                Ok(())
            })
            .unwrap();

        let mut object = scope.instantiate(Vec::new());
        let mut args = json!({ "id": 7 });
        let result = object.call("record", &mut args).unwrap();

        assert_eq!(result, json!({ "id": 7 }));
        assert_eq!(args, json!({ "id": 7, "after": true }));
    }

    #[test]
    fn test_interceptor_debug() {
        let scope = scope();
        ensure_intercepted(&scope, "record").unwrap();
        let interceptor = scope.interceptor("record").unwrap();

        assert_eq!(interceptor.scope_label(), "Recorder");
        assert_eq!(interceptor.operation(), "record");
        assert!(format!("{:?}", interceptor).starts_with("Interceptor { scope: \"Recorder\""));
    }
}
