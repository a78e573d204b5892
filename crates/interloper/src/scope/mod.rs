//! Declaring scopes: identity, operations and hook declarations.
//!
//! A [`Scope`] stands for one declaring type. It owns:
//!
//! - an identity ([`ScopeId`]) and an optional display name
//! - an optional parent scope, forming the ancestry chain
//! - a table of operation bodies
//! - its own [`ScopeRegistry`] of hook chains
//! - its own table of installed interceptors, at most one per operation
//!
//! `Scope` is a cheap handle; clones refer to the same scope.
//!
//! # Example
//!
//! ```
//! use interloper::prelude::*;
//! use serde_json::json;
//!
//! let account = Scope::<i64>::new("Account");
//! account.define("deposit", |this, args, _next| {
//!     let amount: i64 = serde_json::from_value(args["amount"].clone())?;
//!     *this.state_mut() += amount;
//!     Ok(json!(*this.state()))
//! });
//! account.before("deposit", |_this, args| {
//!     if args["amount"].as_i64().unwrap_or_default() <= 0 {
//!         return Err(InterloperError::Hook("deposits must be positive".to_string()));
//!     }
//!     Ok(())
//! })?;
//!
//! let mut object = account.instantiate(100);
//! assert_eq!(object.call("deposit", &mut json!({ "amount": 5 }))?, 105);
//! assert!(object.call("deposit", &mut json!({ "amount": -5 })).is_err());
//! assert_eq!(*object.state(), 105);
//! # Ok::<(), InterloperError>(())
//! ```

mod ancestry;
mod builder;

pub use ancestry::Ancestry;
pub use builder::ScopeBuilder;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{InterloperError, Result};
use crate::hooks::{Hook, HookChain, OperationName, OperationNames, Phase};
use crate::intercept::{self, Interceptor};
use crate::object::Object;
use crate::operation::{Next, Operation};
use crate::registry::{read_lock, write_lock, RegistrySnapshot, ScopeRegistry};

/// Identity token of a scope
///
/// Freshly allocated for every scope, named or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(Uuid);

impl ScopeId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ScopeInner<S> {
    id: ScopeId,
    name: Option<String>,
    parent: Option<Scope<S>>,
    operations: RwLock<HashMap<OperationName, Arc<dyn Operation<S>>>>,
    registry: Arc<ScopeRegistry<S>>,
    interceptors: RwLock<HashMap<OperationName, Arc<Interceptor<S>>>>,
}

/// A declaring scope
///
/// `S` is the state type of the objects instantiated from this scope and
/// from every scope in its hierarchy.
pub struct Scope<S> {
    inner: Arc<ScopeInner<S>>,
}

impl<S: 'static> Scope<S> {
    /// Create a named root scope
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parts(Some(name.into()), None)
    }

    /// Create a root scope without a name
    ///
    /// Anonymous scopes behave exactly like named ones; they are labelled by
    /// their [`ScopeId`].
    pub fn anonymous() -> Self {
        Self::with_parts(None, None)
    }

    /// Create a named scope whose parent is `self`
    pub fn subscope(&self, name: impl Into<String>) -> Self {
        Self::with_parts(Some(name.into()), Some(self.clone()))
    }

    /// Create an anonymous scope whose parent is `self`
    pub fn anonymous_subscope(&self) -> Self {
        Self::with_parts(None, Some(self.clone()))
    }

    /// Builder that collects operations and declarations before creating the scope
    pub fn builder() -> ScopeBuilder<S> {
        ScopeBuilder::default()
    }

    pub(crate) fn with_parts(name: Option<String>, parent: Option<Scope<S>>) -> Self {
        let scope = Self {
            inner: Arc::new(ScopeInner {
                id: ScopeId::generate(),
                name,
                parent,
                operations: RwLock::new(HashMap::new()),
                registry: Arc::new(ScopeRegistry::new()),
                interceptors: RwLock::new(HashMap::new()),
            }),
        };
        debug!(scope = %scope, parent = ?scope.parent().map(Scope::label), "Created scope");
        scope
    }

    /// Define (or redefine) an operation body on this scope
    ///
    /// Redefining replaces the body; an interceptor installed for the
    /// operation stays in place and keeps wrapping the new body.
    pub fn define<F>(&self, name: impl Into<OperationName>, body: F)
    where
        F: Fn(&mut Object<S>, &mut Value, Next<'_, S>) -> Result<Value> + Send + Sync + 'static,
    {
        self.define_operation(name, Arc::new(body));
    }

    /// Define (or redefine) an operation from a shared implementation
    pub fn define_operation(&self, name: impl Into<OperationName>, operation: Arc<dyn Operation<S>>) {
        let name = name.into();
        let replaced = write_lock(&self.inner.operations)
            .insert(name.clone(), operation)
            .is_some();
        debug!(scope = %self, operation = %name, replaced, "Defined operation");
    }

    /// Register `hook` to run before each named operation
    ///
    /// Installs the interceptor for an operation the first time it is hooked.
    /// Fails with [`InterloperError::UnknownOperation`] if any name has no
    /// body anywhere in the ancestry; in that case nothing is registered.
    pub fn before<N, F>(&self, names: N, hook: F) -> Result<()>
    where
        N: OperationNames,
        F: Fn(&mut Object<S>, &mut Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_hook(Phase::Before, names, Arc::new(hook))
    }

    /// Register `hook` to run after each named operation
    ///
    /// See [`Scope::before`] for installation and error behavior.
    pub fn after<N, F>(&self, names: N, hook: F) -> Result<()>
    where
        N: OperationNames,
        F: Fn(&mut Object<S>, &mut Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_hook(Phase::After, names, Arc::new(hook))
    }

    /// Register a shared before hook
    pub fn before_hook(&self, names: impl OperationNames, hook: Arc<dyn Hook<S>>) -> Result<()> {
        self.add_hook(Phase::Before, names, hook)
    }

    /// Register a shared after hook
    pub fn after_hook(&self, names: impl OperationNames, hook: Arc<dyn Hook<S>>) -> Result<()> {
        self.add_hook(Phase::After, names, hook)
    }

    /// Register `hook` for `phase` on each named operation
    pub fn add_hook(
        &self,
        phase: Phase,
        names: impl OperationNames,
        hook: Arc<dyn Hook<S>>,
    ) -> Result<()> {
        let names = names.into_operation_names();
        self.require_reachable(&names)?;
        for name in &names {
            self.inner.registry.append(phase, name.clone(), Arc::clone(&hook));
            intercept::ensure_intercepted(self, name.as_str())?;
        }
        Ok(())
    }

    /// Create an object of this scope holding `state`
    pub fn instantiate(&self, state: S) -> Object<S> {
        Object::new(self.clone(), state)
    }

    /// Whether this scope itself defines a body for `operation`
    pub fn defines(&self, operation: &str) -> bool {
        read_lock(&self.inner.operations).contains_key(operation)
    }

    /// Whether a body for `operation` is reachable from this scope
    pub fn responds_to(&self, operation: &str) -> bool {
        self.ancestry().any(|scope| scope.defines(operation))
    }

    /// Names of the operations this scope itself defines, sorted
    pub fn defined_operations(&self) -> Vec<OperationName> {
        let mut names: Vec<_> = read_lock(&self.inner.operations).keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether this scope has installed an interceptor for `operation`
    pub fn is_intercepted(&self, operation: &str) -> bool {
        read_lock(&self.inner.interceptors).contains_key(operation)
    }

    /// Names of the operations this scope intercepts, sorted
    pub fn intercepted_operations(&self) -> Vec<OperationName> {
        let mut names: Vec<_> = read_lock(&self.inner.interceptors).keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of this scope's own chain for `(phase, operation)`
    pub fn hooks_for(&self, phase: Phase, operation: &str) -> HookChain<S> {
        self.inner.registry.hooks_for(phase, operation)
    }

    /// This scope's hook registry
    pub fn registry(&self) -> &ScopeRegistry<S> {
        &self.inner.registry
    }

    /// Serializable description of the scope and its hooks
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            id: self.id(),
            name: self.inner.name.clone(),
            parent: self.parent().map(Scope::id),
            operations: names_to_strings(self.defined_operations()),
            intercepted: names_to_strings(self.intercepted_operations()),
            hooks: self.inner.registry.snapshot(),
        }
    }

    pub(crate) fn operation(&self, name: &str) -> Option<Arc<dyn Operation<S>>> {
        read_lock(&self.inner.operations).get(name).cloned()
    }

    pub(crate) fn interceptor(&self, name: &str) -> Option<Arc<Interceptor<S>>> {
        read_lock(&self.inner.interceptors).get(name).cloned()
    }

    pub(crate) fn interceptor_table(
        &self,
    ) -> &RwLock<HashMap<OperationName, Arc<Interceptor<S>>>> {
        &self.inner.interceptors
    }

    pub(crate) fn shared_registry(&self) -> Arc<ScopeRegistry<S>> {
        Arc::clone(&self.inner.registry)
    }

    fn require_reachable(&self, names: &[OperationName]) -> Result<()> {
        match names.iter().find(|name| !self.responds_to(name.as_str())) {
            Some(missing) => Err(InterloperError::UnknownOperation {
                scope: self.label(),
                operation: missing.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl<S> Scope<S> {
    /// Identity of this scope
    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Display name, if the scope was given one
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Name of the scope, or `#<Scope {id}>` for anonymous scopes
    pub fn label(&self) -> String {
        match &self.inner.name {
            Some(name) => name.clone(),
            None => format!("#<Scope {}>", self.inner.id),
        }
    }

    /// The parent scope, if any
    pub fn parent(&self) -> Option<&Scope<S>> {
        self.inner.parent.as_ref()
    }

    /// Whether both handles refer to the same scope
    pub fn ptr_eq(&self, other: &Scope<S>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn names_to_strings(names: Vec<OperationName>) -> Vec<String> {
    names.into_iter().map(|name| name.to_string()).collect()
}

impl<S> Clone for Scope<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> PartialEq for Scope<S> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<S> Eq for Scope<S> {}

impl<S> fmt::Display for Scope<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl<S> fmt::Debug for Scope<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Scope::label))
            .finish_non_exhaustive()
    }
}

/// Serializable description of a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// Identity of the scope
    pub id: ScopeId,

    /// Display name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Identity of the parent scope, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ScopeId>,

    /// Operations the scope itself defines
    pub operations: Vec<String>,

    /// Operations the scope has installed interceptors for
    pub intercepted: Vec<String>,

    /// The scope's own hooks
    pub hooks: RegistrySnapshot,
}
