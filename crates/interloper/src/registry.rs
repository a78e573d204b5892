//! Per-scope hook registry.
//!
//! Every scope owns exactly one [`ScopeRegistry`], created together with the
//! scope and never shared with another scope. It maps each [`Phase`] to the
//! hook chains declared for each operation name.
//!
//! # Concurrency
//!
//! Chains sit behind a `std::sync::RwLock`:
//! - [`ScopeRegistry::append`] takes the write lock for the duration of one push
//! - [`ScopeRegistry::hooks_for`] takes the read lock and returns a snapshot
//!
//! Callers run hooks from the snapshot after the guard is dropped, so a hook
//! may declare further hooks without deadlocking, and no reader ever sees a
//! half-appended chain.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::hooks::{Hook, HookChain, OperationName, Phase};

/// Acquire a read guard, recovering the data if a writer panicked
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire a write guard, recovering the data if a writer panicked
pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Hook chains of one scope, keyed by phase and operation name
pub struct ScopeRegistry<S> {
    chains: RwLock<HashMap<Phase, HashMap<OperationName, HookChain<S>>>>,
}

impl<S> ScopeRegistry<S> {
    /// Create a registry with an empty table for each phase
    pub fn new() -> Self {
        let chains = Phase::ALL
            .into_iter()
            .map(|phase| (phase, HashMap::new()))
            .collect();
        Self {
            chains: RwLock::new(chains),
        }
    }

    /// Append a hook to the end of the chain for `(phase, operation)`
    ///
    /// Creates the chain if it does not exist yet. Always succeeds.
    pub fn append(
        &self,
        phase: Phase,
        operation: impl Into<OperationName>,
        hook: Arc<dyn Hook<S>>,
    ) {
        let operation = operation.into();
        let mut chains = write_lock(&self.chains);
        let chain = chains
            .entry(phase)
            .or_default()
            .entry(operation.clone())
            .or_default();
        chain.push(hook);
        trace!(%phase, %operation, len = chain.len(), "Appended hook");
    }

    /// Append every hook of `hooks`, in order, under a single write lock
    ///
    /// Returns the number of hooks appended.
    pub fn extend(
        &self,
        phase: Phase,
        operation: impl Into<OperationName>,
        hooks: &HookChain<S>,
    ) -> usize {
        if hooks.is_empty() {
            return 0;
        }
        let operation = operation.into();
        let mut chains = write_lock(&self.chains);
        let chain = chains
            .entry(phase)
            .or_default()
            .entry(operation.clone())
            .or_default();
        for hook in hooks {
            chain.push(Arc::clone(hook));
        }
        trace!(%phase, %operation, added = hooks.len(), len = chain.len(), "Extended hook chain");
        hooks.len()
    }

    /// Snapshot of the chain for `(phase, operation)`
    ///
    /// Empty when nothing was declared. The snapshot is independent of the
    /// registry: pushing to it does not change what runs.
    pub fn hooks_for(&self, phase: Phase, operation: &str) -> HookChain<S> {
        read_lock(&self.chains)
            .get(&phase)
            .and_then(|by_operation| by_operation.get(operation))
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every chain declared for `phase`
    pub fn all_hooks(&self, phase: Phase) -> HashMap<OperationName, HookChain<S>> {
        read_lock(&self.chains)
            .get(&phase)
            .cloned()
            .unwrap_or_default()
    }

    /// Operations with at least one hook in `phase`, sorted by name
    pub fn operations(&self, phase: Phase) -> Vec<OperationName> {
        let chains = read_lock(&self.chains);
        let mut names: Vec<OperationName> = chains
            .get(&phase)
            .map(|by_operation| {
                by_operation
                    .iter()
                    .filter(|(_, chain)| !chain.is_empty())
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Total number of hooks across both phases
    pub fn len(&self) -> usize {
        read_lock(&self.chains)
            .values()
            .flat_map(HashMap::values)
            .map(HookChain::len)
            .sum()
    }

    /// Whether no hook has been declared in either phase
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializable view of the registry: hook names per phase and operation
    pub fn snapshot(&self) -> RegistrySnapshot {
        let chains = read_lock(&self.chains);
        let names_for = |phase: Phase| -> BTreeMap<String, Vec<String>> {
            chains
                .get(&phase)
                .map(|by_operation| {
                    by_operation
                        .iter()
                        .filter(|(_, chain)| !chain.is_empty())
                        .map(|(name, chain)| (name.to_string(), chain.names()))
                        .collect()
                })
                .unwrap_or_default()
        };
        RegistrySnapshot {
            before: names_for(Phase::Before),
            after: names_for(Phase::After),
        }
    }
}

impl<S> Default for ScopeRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for ScopeRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ScopeRegistry")
            .field("before", &snapshot.before)
            .field("after", &snapshot.after)
            .finish()
    }
}

/// Hook names per operation, for each phase
///
/// # Examples
///
/// ```
/// use interloper::prelude::*;
///
/// let scope = Scope::<()>::new("Job");
/// scope.define("run", |_this, _args, _next| Ok(Value::Null));
/// scope.before("run", |_this, _args| Ok(()))?;
///
/// let snapshot = scope.registry().snapshot();
/// assert_eq!(snapshot.phase(Phase::Before)["run"], vec!["anonymous"]);
/// assert!(snapshot.phase(Phase::After).is_empty());
/// # Ok::<(), InterloperError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Before hooks, by operation name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub before: BTreeMap<String, Vec<String>>,

    /// After hooks, by operation name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub after: BTreeMap<String, Vec<String>>,
}

impl RegistrySnapshot {
    /// Hook names for one phase
    pub fn phase(&self, phase: Phase) -> &BTreeMap<String, Vec<String>> {
        match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::object::Object;
    use serde_json::{json, Value};

    struct Tag(&'static str);

    impl Hook<()> for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn call(&self, _this: &mut Object<()>, _args: &mut Value) -> Result<()> {
            Ok(())
        }
    }

    fn tag(name: &'static str) -> Arc<dyn Hook<()>> {
        Arc::new(Tag(name))
    }

    #[test]
    fn test_append_preserves_order() {
        let registry = ScopeRegistry::new();
        registry.append(Phase::Before, "save", tag("validate"));
        registry.append(Phase::Before, "save", tag("normalize"));
        registry.append(Phase::Before, "save", tag("validate"));

        let chain = registry.hooks_for(Phase::Before, "save");
        assert_eq!(chain.names(), vec!["validate", "normalize", "validate"]);
    }

    #[test]
    fn test_hooks_for_missing_chain_is_empty() {
        let registry = ScopeRegistry::<()>::new();
        assert!(registry.hooks_for(Phase::After, "save").is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_phases_are_separate() {
        let registry = ScopeRegistry::new();
        registry.append(Phase::Before, "save", tag("a"));
        registry.append(Phase::After, "save", tag("b"));

        assert_eq!(registry.hooks_for(Phase::Before, "save").names(), vec!["a"]);
        assert_eq!(registry.hooks_for(Phase::After, "save").names(), vec!["b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_cannot_reorder_registry() {
        let registry = ScopeRegistry::new();
        registry.append(Phase::Before, "save", tag("a"));

        let mut chain = registry.hooks_for(Phase::Before, "save");
        chain.push(tag("b"));

        assert_eq!(registry.hooks_for(Phase::Before, "save").len(), 1);
    }

    #[test]
    fn test_all_hooks_by_phase() {
        let registry = ScopeRegistry::new();
        registry.append(Phase::After, "save", tag("a"));
        registry.append(Phase::After, "destroy", tag("b"));
        registry.append(Phase::Before, "save", tag("c"));

        let after = registry.all_hooks(Phase::After);
        assert_eq!(after.len(), 2);
        assert_eq!(after["destroy"].names(), vec!["b"]);
        assert_eq!(
            registry.operations(Phase::After),
            vec![OperationName::from("destroy"), OperationName::from("save")]
        );
    }

    #[test]
    fn test_extend_copies_in_order() {
        let source = ScopeRegistry::new();
        source.append(Phase::Before, "save", tag("a"));
        source.append(Phase::Before, "save", tag("b"));

        let target = ScopeRegistry::new();
        target.append(Phase::Before, "save", tag("own"));
        let added = target.extend(Phase::Before, "save", &source.hooks_for(Phase::Before, "save"));

        assert_eq!(added, 2);
        assert_eq!(
            target.hooks_for(Phase::Before, "save").names(),
            vec!["own", "a", "b"]
        );
        assert_eq!(target.extend(Phase::After, "save", &HookChain::new()), 0);
        assert!(target.operations(Phase::After).is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let registry = ScopeRegistry::new();
        registry.append(Phase::Before, "save", tag("validate"));

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json, json!({ "before": { "save": ["validate"] } }));

        let parsed: RegistrySnapshot = serde_json::from_value(json).unwrap();
        assert!(parsed.after.is_empty());
        assert_eq!(parsed, registry.snapshot());
    }
}
