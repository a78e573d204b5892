//! Scope inheritance: how hooks layer across a scope hierarchy.
//!
//! This example walks through:
//! - A subscope that calls through to its parent (both hook chains run,
//!   the subscope's outermost)
//! - A subscope that overrides without calling through and explicitly
//!   inherits its parent's hooks
//! - A subscope with no hooks of its own reaching its parent's hooks
//! - Inheritance as a copy taken at declaration time
//!
//! ## Run
//! ```sh
//! RUST_LOG=interloper=trace cargo run -p demos --example scope_inheritance
//! ```

use interloper::prelude::*;
use serde_json::json;

type Trace = Vec<String>;

fn mark(label: &'static str) -> impl Fn(&mut Object<Trace>, &mut Value) -> Result<(), InterloperError> {
    move |this, _args| {
        this.state_mut().push(label.to_string());
        Ok(())
    }
}

fn show(title: &str, scope: &Scope<Trace>) -> Result<(), InterloperError> {
    let mut object = scope.instantiate(Trace::new());
    let result = object.call("render", &mut json!({}))?;
    let chain: Vec<String> = scope.ancestry().map(|scope| scope.label()).collect();
    println!("{} ({})", title, chain.join(" < "));
    println!("  result: {}", result);
    println!("  order:  {}\n", object.state().join(" → "));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("interloper=warn")),
        )
        .with_target(false)
        .init();

    println!("=== Scope Inheritance ===\n");

    let page = Scope::<Trace>::new("Page");
    page.define("render", |this, _args, _next| {
        this.state_mut().push("Page body".to_string());
        Ok(json!("<page>"))
    });
    page.before("render", mark("Page before"))?;
    page.after("render", mark("Page after"))?;

    // --- Calling through ---
    let article = page.subscope("Article");
    article.define("render", |this, args, next| {
        this.state_mut().push("Article body".to_string());
        next.call(this, args)
    });
    article.before("render", mark("Article before"))?;
    article.after("render", mark("Article after"))?;
    show("Calling through", &article)?;

    // --- Overriding and inheriting ---
    let landing = page.subscope("Landing");
    landing.define("render", |this, _args, _next| {
        this.state_mut().push("Landing body".to_string());
        Ok(json!("<landing>"))
    });
    let copied = landing.inherit_hooks_for("render")?;
    println!("Landing copied {} hooks from {:?}\n", copied, page.label());
    show("Overriding with inherited hooks", &landing)?;

    // --- No hooks of its own ---
    let draft = article.anonymous_subscope();
    println!(
        "Nearest hooked scope for the draft: {:?}",
        draft.nearest_hooked_scope("render").map(|scope| scope.label())
    );
    show("Unhooked subscope", &draft)?;

    // --- Copies do not follow later declarations ---
    page.before("render", mark("Page before (late)"))?;
    show("Parent after a late declaration", &page)?;
    show("Inherited copy after a late declaration", &landing)?;

    // --- Inheriting with no hooked ancestor ---
    let orphan = Scope::<Trace>::new("Orphan").subscope("Child");
    if let Err(err) = orphan.inherit_hooks_for("render") {
        println!("Orphan: {}", err);
    }

    Ok(())
}
