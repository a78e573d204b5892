//! Ancestry walking, per-call layer resolution and explicit hook inheritance.

use std::sync::Arc;

use tracing::debug;

use crate::error::{InterloperError, Result};
use crate::hooks::{OperationNames, Phase};
use crate::intercept;
use crate::operation::Operation;

use super::Scope;

/// Iterator over a scope and its ancestors, most specific first
///
/// Created by [`Scope::ancestry`]. Derived from parent links on demand and
/// never cached.
pub struct Ancestry<S> {
    next: Option<Scope<S>>,
}

impl<S> Iterator for Ancestry<S> {
    type Item = Scope<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent().cloned();
        Some(current)
    }
}

impl<S> std::iter::FusedIterator for Ancestry<S> {}

impl<S: 'static> Scope<S> {
    /// This scope followed by its ancestors up to the root
    ///
    /// ```
    /// use interloper::prelude::*;
    ///
    /// let base = Scope::<()>::new("Base");
    /// let leaf = base.subscope("Middle").subscope("Leaf");
    ///
    /// let labels: Vec<String> = leaf.ancestry().map(|scope| scope.label()).collect();
    /// assert_eq!(labels, ["Leaf", "Middle", "Base"]);
    /// ```
    pub fn ancestry(&self) -> Ancestry<S> {
        Ancestry {
            next: Some(self.clone()),
        }
    }

    /// Layers a call of `operation` on an object of this scope runs through
    ///
    /// For every scope from this one to the root: its interceptor, then its
    /// body, each only if present. Empty when nothing responds.
    pub(crate) fn resolve(&self, operation: &str) -> Vec<Arc<dyn Operation<S>>> {
        let mut layers: Vec<Arc<dyn Operation<S>>> = Vec::new();
        for scope in self.ancestry() {
            if let Some(interceptor) = scope.interceptor(operation) {
                layers.push(interceptor);
            }
            if let Some(body) = scope.operation(operation) {
                layers.push(body);
            }
        }
        layers
    }

    /// Nearest scope, this one included, that intercepts `operation`
    ///
    /// Its hooks are the first to run when `operation` is called on an
    /// object of this scope.
    pub fn nearest_hooked_scope(&self, operation: &str) -> Option<Scope<S>> {
        self.ancestry().find(|scope| scope.is_intercepted(operation))
    }

    /// Nearest proper ancestor that intercepts `operation`
    pub fn nearest_hooked_ancestor(&self, operation: &str) -> Option<Scope<S>> {
        self.parent()?.nearest_hooked_scope(operation)
    }

    /// Copy both hook chains of the nearest hooked ancestor for each name
    ///
    /// The copy is taken by value: hooks the ancestor declares later are not
    /// picked up. Copied hooks append after whatever this scope already
    /// declared, and this scope's interceptor is installed if anything was
    /// copied.
    ///
    /// # Errors
    ///
    /// [`InterloperError::NoHookedAncestor`] if some name has no
    /// intercepting ancestor. All names are checked before anything is
    /// copied.
    ///
    /// # Example
    ///
    /// ```
    /// use interloper::prelude::*;
    /// use serde_json::json;
    ///
    /// let base = Scope::<Vec<&'static str>>::new("Base");
    /// base.define("run", |this, _args, _next| {
    ///     this.state_mut().push("base body");
    ///     Ok(Value::Null)
    /// });
    /// base.before("run", |this, _args| {
    ///     this.state_mut().push("base before");
    ///     Ok(())
    /// })?;
    ///
    /// let custom = base.subscope("Custom");
    /// custom.define("run", |this, _args, _next| {
    ///     this.state_mut().push("custom body");
    ///     Ok(Value::Null)
    /// });
    /// custom.inherit_hooks_for("run")?;
    ///
    /// let mut object = custom.instantiate(Vec::new());
    /// object.call("run", &mut json!({}))?;
    /// assert_eq!(object.state(), &["base before", "custom body"]);
    /// # Ok::<(), InterloperError>(())
    /// ```
    pub fn inherit_hooks_for(&self, names: impl OperationNames) -> Result<usize> {
        self.inherit(&Phase::ALL, names)
    }

    /// Copy only the before chain of the nearest hooked ancestor
    pub fn inherit_before_hooks_for(&self, names: impl OperationNames) -> Result<usize> {
        self.inherit(&[Phase::Before], names)
    }

    /// Copy only the after chain of the nearest hooked ancestor
    pub fn inherit_after_hooks_for(&self, names: impl OperationNames) -> Result<usize> {
        self.inherit(&[Phase::After], names)
    }

    pub(crate) fn inherit(&self, phases: &[Phase], names: impl OperationNames) -> Result<usize> {
        let names = names.into_operation_names();

        let mut sources = Vec::with_capacity(names.len());
        for name in &names {
            match self.nearest_hooked_ancestor(name.as_str()) {
                Some(ancestor) => sources.push((name, ancestor)),
                None => {
                    return Err(InterloperError::NoHookedAncestor {
                        scope: self.label(),
                        operation: name.to_string(),
                    });
                }
            }
        }

        let mut total = 0;
        for (name, ancestor) in sources {
            let mut copied = 0;
            for &phase in phases {
                let chain = ancestor.hooks_for(phase, name.as_str());
                copied += self.registry().extend(phase, name.clone(), &chain);
            }
            if copied > 0 {
                intercept::ensure_intercepted(self, name.as_str())?;
            }
            debug!(
                scope = %self,
                from = %ancestor,
                operation = %name,
                copied,
                "Inherited hooks"
            );
            total += copied;
        }
        Ok(total)
    }
}
