//! Hooks and guardrails example using before hooks as validation.
//!
//! This example shows how to:
//! - Guard an operation with before hooks that refuse bad input
//! - Normalize arguments for the body in a before hook
//! - Audit every completed call in an after hook
//! - Share one hook across several operations
//! - Declare the whole scope in one block with `Scope::builder()`
//!
//! # Usage
//!
//! ```bash
//! cargo run -p demos --example hooks_guardrails
//! ```

use interloper::prelude::*;
use serde_json::json;

/// Account state: balance in cents plus an audit trail
#[derive(Debug, Default)]
struct Account {
    balance: i64,
    audit: Vec<String>,
}

fn amount(args: &Value) -> Result<i64, InterloperError> {
    Ok(serde_json::from_value(args["amount"].clone())?)
}

// Guardrail 1: refuse non-positive amounts before any body runs
fn require_positive(_this: &mut Object<Account>, args: &mut Value) -> Result<(), InterloperError> {
    if amount(args)? <= 0 {
        return Err(InterloperError::Hook("amount must be positive".to_string()));
    }
    Ok(())
}

// Guardrail 2: refuse withdrawals larger than the balance
fn require_funds(this: &mut Object<Account>, args: &mut Value) -> Result<(), InterloperError> {
    let requested = amount(args)?;
    if requested > this.state().balance {
        return Err(InterloperError::Hook(format!(
            "insufficient funds: {} requested, {} available",
            requested,
            this.state().balance
        )));
    }
    Ok(())
}

// Normalization: round amounts down to whole cents given as floats
fn normalize_amount(_this: &mut Object<Account>, args: &mut Value) -> Result<(), InterloperError> {
    if let Some(raw) = args["amount"].as_f64() {
        args["amount"] = json!(raw.trunc() as i64);
    }
    Ok(())
}

// Audit: record each completed operation
fn audit(this: &mut Object<Account>, args: &mut Value) -> Result<(), InterloperError> {
    let entry = format!("{} -> balance {}", args, this.state().balance);
    this.state_mut().audit.push(entry);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("interloper=warn")),
        )
        .init();

    println!("=== Hooks and Guardrails ===\n");

    let account = Scope::builder()
        .name("Account")
        .before(["deposit", "withdraw"], normalize_amount)
        .before(["deposit", "withdraw"], require_positive)
        .before("withdraw", require_funds)
        .after(["deposit", "withdraw"], audit)
        .define("deposit", |this: &mut Object<Account>, args: &mut Value, _next: Next<'_, Account>| {
            this.state_mut().balance += amount(args)?;
            Ok(json!(this.state().balance))
        })
        .define("withdraw", |this: &mut Object<Account>, args: &mut Value, _next: Next<'_, Account>| {
            this.state_mut().balance -= amount(args)?;
            Ok(json!(this.state().balance))
        })
        .build()?;

    println!("Guarded operations: {:?}\n", account.intercepted_operations());

    let mut object = account.instantiate(Account::default());
    let attempts = [
        ("deposit", json!({ "amount": 500 })),
        ("deposit", json!({ "amount": 12.75 })),
        ("withdraw", json!({ "amount": 200 })),
        ("withdraw", json!({ "amount": 10_000 })),
        ("deposit", json!({ "amount": -3 })),
        ("deposit", json!({ "amount": "lots" })),
    ];

    for (operation, mut args) in attempts {
        let shown = args.to_string();
        match object.call(operation, &mut args) {
            Ok(balance) => println!("  {:8} {:18} → ok, balance {}", operation, shown, balance),
            Err(err) => println!("  {:8} {:18} → refused: {}", operation, shown, err),
        }
    }

    println!("\nAudit trail:");
    for entry in &object.state().audit {
        println!("  {}", entry);
    }
    assert_eq!(object.state().balance, 312);
    assert_eq!(object.state().audit.len(), 3);

    println!("\nDone: three calls passed the guardrails, three were refused.");
    Ok(())
}
