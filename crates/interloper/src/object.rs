//! Instances of a scope and operation dispatch.

use std::fmt;

use serde_json::Value;
use tracing::trace;

use crate::error::{InterloperError, Result};
use crate::hooks::OperationName;
use crate::operation::Next;
use crate::scope::Scope;

/// An instance of a scope
///
/// The object's scope is its dynamic scope: dispatch starts there and walks
/// toward the root. `state` is the instance data hooks and bodies act on.
pub struct Object<S> {
    scope: Scope<S>,
    state: S,
}

impl<S: 'static> Object<S> {
    /// Create an object of `scope`; usually spelled [`Scope::instantiate`]
    pub fn new(scope: Scope<S>, state: S) -> Self {
        Self { scope, state }
    }

    /// Call `operation` with shared, mutable arguments
    ///
    /// Hooks and bodies see the same `args`; mutations made by a before hook
    /// are visible to the body and to after hooks, and to the caller once
    /// the call returns.
    ///
    /// # Errors
    ///
    /// [`InterloperError::NoSuchOperation`] if nothing in the ancestry
    /// responds to `operation`. Otherwise whatever the first failing hook or
    /// body returned, unchanged.
    pub fn call(&mut self, operation: &str, args: &mut Value) -> Result<Value> {
        let scope = self.scope.clone();
        let layers = scope.resolve(operation);
        if layers.is_empty() {
            return Err(InterloperError::NoSuchOperation {
                scope: scope.label(),
                operation: operation.to_string(),
            });
        }

        let name = OperationName::from(operation);
        trace!(scope = %scope, operation, layers = layers.len(), "Dispatching");
        Next::new(&name, &layers).call(self, args)
    }

    /// Call `operation` with owned arguments, discarding any mutations
    ///
    /// ```
    /// use interloper::prelude::*;
    /// use serde_json::json;
    ///
    /// let math = Scope::<()>::new("Math");
    /// math.define("double", |_this, args, _next| {
    ///     let n: i64 = serde_json::from_value(args.clone())?;
    ///     Ok(json!(n * 2))
    /// });
    ///
    /// assert_eq!(math.instantiate(()).call_with("double", json!(21))?, 42);
    /// # Ok::<(), InterloperError>(())
    /// ```
    pub fn call_with(&mut self, operation: &str, mut args: Value) -> Result<Value> {
        self.call(operation, &mut args)
    }

    /// Whether a body for `operation` is reachable from the object's scope
    pub fn responds_to(&self, operation: &str) -> bool {
        self.scope.responds_to(operation)
    }
}

impl<S> Object<S> {
    /// The object's dynamic scope
    pub fn scope(&self) -> &Scope<S> {
        &self.scope
    }

    /// Instance state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable instance state
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consume the object, returning its state
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for Object<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("scope", &self.scope.label())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_unknown_operation() {
        let mut object = Scope::<()>::new("Empty").instantiate(());
        let err = object.call("missing", &mut json!({})).unwrap_err();

        assert!(!object.responds_to("missing"));
        assert_eq!(err.to_string(), "undefined operation `missing` for Empty");
    }

    #[test]
    fn test_call_inherited_body() {
        let parent = Scope::<u32>::new("Parent");
        parent.define("bump", |this, _args, _next| {
            *this.state_mut() += 1;
            Ok(json!(*this.state()))
        });
        let child = parent.subscope("Child");

        let mut object = child.instantiate(0);
        assert_eq!(object.call_with("bump", Value::Null).unwrap(), 1);
        assert_eq!(object.scope(), &child);
        assert_eq!(object.into_state(), 1);
    }

    #[test]
    fn test_super_call_past_root_fails() {
        let scope = Scope::<()>::new("Root");
        scope.define("up", |this, args, next| next.call(this, args));

        let err = scope.instantiate(()).call_with("up", Value::Null).unwrap_err();
        assert!(matches!(err, InterloperError::NoSuperOperation { .. }));
    }

    #[test]
    fn test_object_debug() {
        let object = Scope::new("Counter").instantiate(3u8);
        assert_eq!(format!("{:?}", object), r#"Object { scope: "Counter", state: 3 }"#);
    }
}
