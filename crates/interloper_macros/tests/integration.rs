//! Integration tests for the #[hook] and #[operation] macros
//!
//! These tests verify that the macros generate hook and operation types that
//! plug into a scope the same way hand-written implementations do.

use interloper::prelude::*;
use interloper_macros::{hook, operation};
use serde_json::json;

/// Test hook returning a result, with the inferred name
#[test]
fn test_hook_inferred_name() {
    #[hook]
    fn require_positive(_this: &mut Object<i64>, args: &mut Value) -> Result<(), InterloperError> {
        if args["amount"].as_i64().unwrap_or_default() <= 0 {
            return Err(InterloperError::Hook("amount must be positive".to_string()));
        }
        Ok(())
    }

    let hook = require_positive();
    assert_eq!(hook.name(), "require_positive");
    assert_eq!(RequirePositiveHook.name(), "require_positive");
}

/// Test hook with explicit name
#[test]
fn test_hook_explicit_name() {
    #[hook(name = "audit-trail")]
    fn audit(this: &mut Object<Vec<String>>, args: &mut Value) {
        this.state_mut().push(args.to_string());
    }

    assert_eq!(audit().name(), "audit-trail");
}

/// Test unit-returning hook runs around an operation
#[test]
fn test_unit_hook_runs() {
    #[hook]
    fn count_calls(this: &mut Object<u64>, _args: &mut Value) {
        *this.state_mut() += 1;
    }

    let scope = Scope::<u64>::new("Counter");
    scope.define("tick", |_this, _args, _next| Ok(Value::Null));
    scope.before_hook("tick", count_calls()).unwrap();
    scope.after_hook("tick", count_calls()).unwrap();

    let mut object = scope.instantiate(0);
    object.call("tick", &mut json!({})).unwrap();
    object.call("tick", &mut json!({})).unwrap();
    assert_eq!(*object.state(), 4);
    assert_eq!(
        scope.snapshot().hooks.before["tick"],
        vec!["count_calls".to_string()]
    );
}

/// Test failing hook stops the call
#[test]
fn test_failing_hook_stops_call() {
    #[hook]
    fn reject(_this: &mut Object<u64>, _args: &mut Value) -> Result<(), InterloperError> {
        Err(InterloperError::Hook("rejected".to_string()))
    }

    let scope = Scope::<u64>::new("Guarded");
    scope.define("run", |this, _args, _next| {
        *this.state_mut() += 1;
        Ok(Value::Null)
    });
    scope.before_hook("run", reject()).unwrap();

    let mut object = scope.instantiate(0);
    let err = object.call("run", &mut json!({})).unwrap_err();
    assert_eq!(err.to_string(), "hook failed: rejected");
    assert_eq!(*object.state(), 0);
}

/// Test hook propagating a JSON error with `?`
#[test]
fn test_hook_question_mark() {
    #[hook]
    fn parse_limit(this: &mut Object<u64>, args: &mut Value) -> Result<(), InterloperError> {
        let limit: u64 = serde_json::from_value(args["limit"].clone())?;
        *this.state_mut() = limit;
        Ok(())
    }

    let scope = Scope::<u64>::new("Limits");
    scope.define("apply", |this, _args, _next| Ok(json!(*this.state())));
    scope.before_hook("apply", parse_limit()).unwrap();

    let mut object = scope.instantiate(0);
    assert_eq!(object.call("apply", &mut json!({ "limit": 9 })).unwrap(), 9);
    assert!(matches!(
        object.call("apply", &mut json!({ "limit": "nine" })),
        Err(InterloperError::Json(_))
    ));
}

/// Test operation with inferred name
#[test]
fn test_operation_inferred_name() {
    #[operation]
    fn deposit(
        this: &mut Object<i64>,
        args: &mut Value,
        _next: Next<'_, i64>,
    ) -> Result<Value, InterloperError> {
        *this.state_mut() += args["amount"].as_i64().unwrap_or_default();
        Ok(json!(*this.state()))
    }

    assert_eq!(DepositOperation::NAME, "deposit");

    let scope = Scope::<i64>::new("Account");
    scope.define_operation(DepositOperation::NAME, deposit());

    let mut object = scope.instantiate(10);
    assert_eq!(object.call("deposit", &mut json!({ "amount": 5 })).unwrap(), 15);
}

/// Test operation calling through to the overridden implementation
#[test]
fn test_operation_calls_next() {
    #[operation(name = "describe")]
    fn describe_loudly(
        this: &mut Object<()>,
        args: &mut Value,
        next: Next<'_, ()>,
    ) -> Result<Value, InterloperError> {
        let inherited = next.call(this, args)?;
        Ok(json!(inherited.as_str().unwrap_or_default().to_uppercase()))
    }

    let base = Scope::<()>::new("Base");
    base.define("describe", |_this, _args, _next| Ok(json!("base")));
    let loud = base.subscope("Loud");
    loud.define_operation(DescribeLoudlyOperation::NAME, describe_loudly());

    let mut object = loud.instantiate(());
    assert_eq!(object.call("describe", &mut json!({})).unwrap(), "BASE");
}

/// Test generated hooks and operations compose
#[test]
fn test_hook_and_operation_together() {
    #[operation]
    fn save(this: &mut Object<Vec<String>>, _args: &mut Value, _next: Next<'_, Vec<String>>) -> Result<Value, InterloperError> {
        this.state_mut().push("save".to_string());
        Ok(json!(true))
    }

    #[hook]
    fn validate(this: &mut Object<Vec<String>>, _args: &mut Value) {
        this.state_mut().push("validate".to_string());
    }

    #[hook]
    fn notify(this: &mut Object<Vec<String>>, _args: &mut Value) {
        this.state_mut().push("notify".to_string());
    }

    let scope = Scope::builder()
        .name("Record")
        .define_operation(SaveOperation::NAME, save())
        .before_hook("save", validate())
        .after_hook("save", notify())
        .build()
        .unwrap();

    let mut object = scope.instantiate(Vec::new());
    assert_eq!(object.call("save", &mut json!({})).unwrap(), true);
    assert_eq!(object.state(), &["validate", "save", "notify"]);
}
