//! Hook callbacks: the ways to write and register a hook.
//!
//! This example demonstrates the hook system:
//! - Closures registered with `Scope::before` / `Scope::after`
//! - Struct-based `Hook` implementations registered with `before_hook`
//! - Function-based hooks generated by `#[hook]`
//! - Operation bodies generated by `#[operation]`
//! - Introspection with `Scope::snapshot`
//!
//! ## Run
//! ```sh
//! RUST_LOG=interloper=debug cargo run -p demos --example hook_callbacks
//! ```

use std::sync::Arc;

use interloper::prelude::*;
use serde_json::json;

/// Log lines collected by the hooks
type Journal = Vec<String>;

// --- 1. Struct-based Hook ---
// Best for stateful hooks that need configuration.

/// Rejects payloads larger than `max_bytes`
struct SizeLimit {
    max_bytes: usize,
}

impl Hook<Journal> for SizeLimit {
    fn name(&self) -> &str {
        "size_limit"
    }

    fn call(&self, this: &mut Object<Journal>, args: &mut Value) -> Result<(), InterloperError> {
        let size = args["payload"].as_str().map(str::len).unwrap_or_default();
        if size > self.max_bytes {
            return Err(InterloperError::Hook(format!(
                "payload of {} bytes exceeds {}",
                size, self.max_bytes
            )));
        }
        this.state_mut().push(format!("size ok ({} bytes)", size));
        Ok(())
    }
}

// --- 2. Function-based hooks via #[hook] ---
// Best for simple, stateless hooks.

/// Stamp the arguments before the body sees them
#[hook(name = "stamp")]
fn stamp_request(this: &mut Object<Journal>, args: &mut Value) {
    args["stamped"] = json!(true);
    this.state_mut().push("stamped".to_string());
}

#[hook]
fn record_completion(this: &mut Object<Journal>, args: &mut Value) {
    this.state_mut().push(format!("completed {}", args["payload"]));
}

// --- 3. Operation body via #[operation] ---

#[operation(name = "upload")]
fn upload_payload(
    this: &mut Object<Journal>,
    args: &mut Value,
    _next: Next<'_, Journal>,
) -> Result<Value, InterloperError> {
    this.state_mut().push(format!("uploading (stamped: {})", args["stamped"]));
    Ok(json!({ "status": "stored" }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("interloper=warn")),
        )
        .with_target(false)
        .init();

    println!("=== Hook Callbacks ===\n");

    let storage = Scope::<Journal>::new("Storage");
    storage.define_operation(UploadPayloadOperation::NAME, upload_payload());

    // --- Registering hooks ---
    println!("--- Registering Hooks ---\n");

    storage.before_hook("upload", Arc::new(SizeLimit { max_bytes: 16 }))?;
    storage.before_hook("upload", stamp_request())?;
    storage.after_hook("upload", record_completion())?;
    storage.after("upload", |this, _args| {
        this.state_mut().push("closure after hook".to_string());
        Ok(())
    })?;

    for phase in Phase::ALL {
        println!("  {:6} → {:?}", phase.as_str(), storage.hooks_for(phase, "upload").names());
    }

    // --- Calling through the hooks ---
    println!("\n--- Calling Through Hooks ---\n");

    let mut object = storage.instantiate(Journal::new());
    let mut args = json!({ "payload": "hello" });
    let result = object.call("upload", &mut args)?;
    println!("  result: {}", result);
    println!("  args after call: {}", args);
    for line in object.state() {
        println!("    {}", line);
    }

    // --- A hook refusing the call ---
    println!("\n--- SizeLimit Rejecting a Call ---\n");

    let mut object = storage.instantiate(Journal::new());
    match object.call("upload", &mut json!({ "payload": "far too large for the limit" })) {
        Ok(result) => println!("  unexpected success: {}", result),
        Err(err) => println!("  rejected: {}", err),
    }
    println!("  journal: {:?}", object.state());
    assert!(object.state().is_empty());

    // --- Introspection ---
    println!("\n--- Scope Snapshot ---\n");

    println!("{}", serde_json::to_string_pretty(&storage.snapshot())?);

    println!("\nDone: demonstrated closure, struct and macro hooks.");
    Ok(())
}
