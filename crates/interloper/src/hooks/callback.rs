//! Hook trait and implementations.

use crate::error::Result;
use crate::object::Object;
use serde_json::Value;

/// A callable run before or after an intercepted operation
///
/// Hooks receive the calling object explicitly, so they can read and
/// mutate its state or call other operations on it, together with the
/// arguments of the call. The arguments are the very value the operation
/// body will see; mutations made here are visible to later hooks, to the
/// body and to after hooks.
///
/// A successful hook carries no value. A failing hook stops the call and
/// its error reaches the caller unchanged.
///
/// This trait can be implemented directly or used with closures via the blanket implementation.
///
/// # Examples
///
/// ## Using a closure
///
/// ```
/// use interloper::prelude::*;
///
/// let counter = Scope::<u32>::new("Counter");
/// counter.define("increment", |this, _args, _next| {
///     *this.state_mut() += 1;
///     Ok(Value::Null)
/// });
/// counter.before("increment", |this, _args| {
///     *this.state_mut() += 10;
///     Ok(())
/// })?;
///
/// let mut object = counter.instantiate(0);
/// object.call("increment", &mut Value::Null)?;
/// assert_eq!(*object.state(), 11);
/// # Ok::<(), InterloperError>(())
/// ```
///
/// ## Implementing directly
///
/// ```
/// use interloper::prelude::*;
/// use std::sync::Arc;
///
/// struct RequireAmount;
///
/// impl Hook<i64> for RequireAmount {
///     fn name(&self) -> &str {
///         "require_amount"
///     }
///
///     fn call(&self, _this: &mut Object<i64>, args: &mut Value) -> Result<(), InterloperError> {
///         if args.get("amount").is_none() {
///             return Err(InterloperError::Hook("missing amount".to_string()));
///         }
///         Ok(())
///     }
/// }
///
/// let account = Scope::<i64>::new("Account");
/// account.define("deposit", |this, args, _next| {
///     *this.state_mut() += args["amount"].as_i64().unwrap_or_default();
///     Ok(Value::Null)
/// });
/// account.before_hook("deposit", Arc::new(RequireAmount))?;
///
/// let mut object = account.instantiate(0);
/// assert!(object.call("deposit", &mut serde_json::json!({})).is_err());
/// # Ok::<(), InterloperError>(())
/// ```
pub trait Hook<S>: Send + Sync {
    /// Name used in logs and registry snapshots
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Run the hook
    ///
    /// # Arguments
    ///
    /// * `this` - The object the intercepted operation was called on
    /// * `args` - The shared arguments of the call
    fn call(&self, this: &mut Object<S>, args: &mut Value) -> Result<()>;
}

/// Blanket implementation for closures and functions
///
/// This allows any function with the right signature to be used as a Hook.
impl<S, F> Hook<S> for F
where
    F: Fn(&mut Object<S>, &mut Value) -> Result<()> + Send + Sync,
{
    fn call(&self, this: &mut Object<S>, args: &mut Value) -> Result<()> {
        self(this, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterloperError;
    use crate::scope::Scope;
    use serde_json::json;
    use std::sync::Arc;

    struct Limit {
        max: i64,
    }

    impl Hook<i64> for Limit {
        fn name(&self) -> &str {
            "limit"
        }

        fn call(&self, _this: &mut Object<i64>, args: &mut Value) -> Result<()> {
            match args["amount"].as_i64() {
                Some(amount) if amount > self.max => {
                    Err(InterloperError::Hook(format!("{} exceeds {}", amount, self.max)))
                }
                _ => Ok(()),
            }
        }
    }

    fn scope() -> Scope<i64> {
        Scope::new("Wallet")
    }

    #[test]
    fn test_struct_implementation() {
        let hook = Limit { max: 100 };
        let mut object = scope().instantiate(0);

        assert!(hook.call(&mut object, &mut json!({ "amount": 50 })).is_ok());
        let err = hook
            .call(&mut object, &mut json!({ "amount": 150 }))
            .unwrap_err();
        assert_eq!(err.to_string(), "hook failed: 150 exceeds 100");
        assert_eq!(hook.name(), "limit");
    }

    #[test]
    fn test_closure_implementation() {
        let hook = |this: &mut Object<i64>, args: &mut Value| -> Result<()> {
            *this.state_mut() += 1;
            args["seen"] = json!(true);
            Ok(())
        };

        let mut object = scope().instantiate(0);
        let mut args = json!({});
        Hook::call(&hook, &mut object, &mut args).unwrap();

        assert_eq!(*object.state(), 1);
        assert_eq!(args["seen"], true);
    }

    #[test]
    fn test_closure_default_name() {
        let hook: Arc<dyn Hook<i64>> =
            Arc::new(|_: &mut Object<i64>, _: &mut Value| -> Result<()> { Ok(()) });
        assert_eq!(hook.name(), "anonymous");
    }

    #[test]
    fn test_function_implementation() {
        fn mark(this: &mut Object<i64>, _args: &mut Value) -> Result<()> {
            *this.state_mut() = -1;
            Ok(())
        }

        let hook: Arc<dyn Hook<i64>> = Arc::new(mark);
        let mut object = scope().instantiate(7);
        hook.call(&mut object, &mut Value::Null).unwrap();
        assert_eq!(*object.state(), -1);
    }
}
