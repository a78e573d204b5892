//! Operation bodies and the explicit link to the overridden implementation.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{InterloperError, Result};
use crate::hooks::OperationName;
use crate::object::Object;

/// Capability interface shared by operation bodies and installed interceptors
///
/// Every implementation receives the calling object, the shared arguments and
/// a [`Next`] link to the next more general implementation of the same
/// operation. Calling through `next` is the explicit form of "call the
/// overridden version"; not calling it replaces the inherited behavior.
///
/// # Examples
///
/// ```
/// use interloper::prelude::*;
/// use serde_json::json;
///
/// let base = Scope::<()>::new("Greeter");
/// base.define("greet", |_this, args, _next| {
///     Ok(json!(format!("hello {}", args["name"].as_str().unwrap_or("you"))))
/// });
///
/// let loud = base.subscope("LoudGreeter");
/// loud.define("greet", |this, args, next| {
///     let inherited = next.call(this, args)?;
///     Ok(json!(inherited.as_str().unwrap_or_default().to_uppercase()))
/// });
///
/// let mut object = loud.instantiate(());
/// assert_eq!(object.call("greet", &mut json!({ "name": "ada" }))?, "HELLO ADA");
/// # Ok::<(), InterloperError>(())
/// ```
pub trait Operation<S>: Send + Sync {
    /// Run the operation
    ///
    /// # Arguments
    ///
    /// * `this` - The object the operation was called on
    /// * `args` - The shared arguments of the call
    /// * `next` - The next more general implementation
    fn call(&self, this: &mut Object<S>, args: &mut Value, next: Next<'_, S>) -> Result<Value>;
}

/// Blanket implementation for closures and functions
impl<S, F> Operation<S> for F
where
    F: Fn(&mut Object<S>, &mut Value, Next<'_, S>) -> Result<Value> + Send + Sync,
{
    fn call(&self, this: &mut Object<S>, args: &mut Value, next: Next<'_, S>) -> Result<Value> {
        self(this, args, next)
    }
}

/// Link to the remaining, more general implementations of one operation
///
/// Produced by dispatch; each layer of a call receives the link to the
/// layers below it. `Next` is `Copy`, so a body may call through more than
/// once.
pub struct Next<'a, S> {
    operation: &'a OperationName,
    layers: &'a [Arc<dyn Operation<S>>],
}

impl<'a, S> Next<'a, S> {
    pub(crate) fn new(operation: &'a OperationName, layers: &'a [Arc<dyn Operation<S>>]) -> Self {
        Self { operation, layers }
    }

    /// Name of the operation being dispatched
    pub fn operation(&self) -> &str {
        self.operation.as_str()
    }

    /// Whether there is a more general implementation to call
    pub fn exists(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Number of layers (interceptors and bodies) left below this point
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Call the next more general implementation
    ///
    /// Returns [`InterloperError::NoSuperOperation`] when no implementation
    /// is left.
    pub fn call(self, this: &mut Object<S>, args: &mut Value) -> Result<Value> {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.call(this, args, Next::new(self.operation, rest)),
            None => Err(InterloperError::NoSuperOperation {
                operation: self.operation.to_string(),
            }),
        }
    }
}

impl<S> Clone for Next<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Next<'_, S> {}

impl<S> std::fmt::Debug for Next<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("operation", &self.operation.as_str())
            .field("depth", &self.layers.len())
            .finish()
    }
}
