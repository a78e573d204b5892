//! Builder for scopes declared in one block.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::hooks::{Hook, OperationName, OperationNames, Phase};
use crate::object::Object;
use crate::operation::{Next, Operation};

use super::Scope;

enum Declaration<S> {
    Hook {
        phase: Phase,
        names: Vec<OperationName>,
        hook: Arc<dyn Hook<S>>,
    },
    Inherit {
        phases: Vec<Phase>,
        names: Vec<OperationName>,
    },
}

/// Builder for [`Scope`]
///
/// Operations are defined before any declaration is applied, so a hook may
/// name an operation defined later in the same chain. Declarations are then
/// applied in the order they were added.
///
/// # Example
///
/// ```
/// use interloper::prelude::*;
/// use serde_json::json;
///
/// let base = Scope::<Vec<String>>::new("Base");
///
/// let scope = Scope::builder()
///     .name("Worker")
///     .parent(&base)
///     .before("work", |this, _args| {
///         this.state_mut().push("ready".to_string());
///         Ok(())
///     })
///     .define("work", |this, _args, _next| {
///         this.state_mut().push("working".to_string());
///         Ok(json!("done"))
///     })
///     .build()?;
///
/// let mut object = scope.instantiate(Vec::new());
/// assert_eq!(object.call("work", &mut json!({}))?, "done");
/// assert_eq!(object.state(), &["ready", "working"]);
/// # Ok::<(), InterloperError>(())
/// ```
pub struct ScopeBuilder<S> {
    name: Option<String>,
    parent: Option<Scope<S>>,
    operations: Vec<(OperationName, Arc<dyn Operation<S>>)>,
    declarations: Vec<Declaration<S>>,
}

impl<S: 'static> ScopeBuilder<S> {
    /// Display name of the scope; anonymous when unset
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parent scope
    pub fn parent(mut self, parent: &Scope<S>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Define an operation body
    pub fn define<F>(self, name: impl Into<OperationName>, body: F) -> Self
    where
        F: Fn(&mut Object<S>, &mut Value, Next<'_, S>) -> Result<Value> + Send + Sync + 'static,
    {
        self.define_operation(name, Arc::new(body))
    }

    /// Define an operation from a shared implementation
    pub fn define_operation(
        mut self,
        name: impl Into<OperationName>,
        operation: Arc<dyn Operation<S>>,
    ) -> Self {
        self.operations.push((name.into(), operation));
        self
    }

    /// Declare a before hook
    pub fn before<F>(self, names: impl OperationNames, hook: F) -> Self
    where
        F: Fn(&mut Object<S>, &mut Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_hook(Phase::Before, names, Arc::new(hook))
    }

    /// Declare an after hook
    pub fn after<F>(self, names: impl OperationNames, hook: F) -> Self
    where
        F: Fn(&mut Object<S>, &mut Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_hook(Phase::After, names, Arc::new(hook))
    }

    /// Declare a shared before hook
    pub fn before_hook(self, names: impl OperationNames, hook: Arc<dyn Hook<S>>) -> Self {
        self.add_hook(Phase::Before, names, hook)
    }

    /// Declare a shared after hook
    pub fn after_hook(self, names: impl OperationNames, hook: Arc<dyn Hook<S>>) -> Self {
        self.add_hook(Phase::After, names, hook)
    }

    /// Declare a hook for `phase`
    pub fn add_hook(
        mut self,
        phase: Phase,
        names: impl OperationNames,
        hook: Arc<dyn Hook<S>>,
    ) -> Self {
        self.declarations.push(Declaration::Hook {
            phase,
            names: names.into_operation_names(),
            hook,
        });
        self
    }

    /// Inherit both chains from the nearest hooked ancestor
    pub fn inherit_hooks_for(self, names: impl OperationNames) -> Self {
        self.inherit(Phase::ALL.to_vec(), names)
    }

    /// Inherit the before chain from the nearest hooked ancestor
    pub fn inherit_before_hooks_for(self, names: impl OperationNames) -> Self {
        self.inherit(vec![Phase::Before], names)
    }

    /// Inherit the after chain from the nearest hooked ancestor
    pub fn inherit_after_hooks_for(self, names: impl OperationNames) -> Self {
        self.inherit(vec![Phase::After], names)
    }

    fn inherit(mut self, phases: Vec<Phase>, names: impl OperationNames) -> Self {
        self.declarations.push(Declaration::Inherit {
            phases,
            names: names.into_operation_names(),
        });
        self
    }

    /// Create the scope, define its operations and apply its declarations
    ///
    /// # Errors
    ///
    /// The first declaration error, as returned by [`Scope::add_hook`] or
    /// [`Scope::inherit_hooks_for`]. The partially declared scope is dropped.
    pub fn build(self) -> Result<Scope<S>> {
        let scope = Scope::with_parts(self.name, self.parent);
        for (name, operation) in self.operations {
            scope.define_operation(name, operation);
        }
        for declaration in self.declarations {
            match declaration {
                Declaration::Hook { phase, names, hook } => scope.add_hook(phase, names, hook)?,
                Declaration::Inherit { phases, names } => {
                    scope.inherit(&phases, names)?;
                }
            }
        }
        Ok(scope)
    }
}

impl<S> Default for ScopeBuilder<S> {
    fn default() -> Self {
        Self {
            name: None,
            parent: None,
            operations: Vec::new(),
            declarations: Vec::new(),
        }
    }
}
