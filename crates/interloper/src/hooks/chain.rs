//! Ordered hook chains.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::hooks::Hook;
use crate::object::Object;

/// Ordered hooks for one (operation, phase) pair of one scope
///
/// Insertion order is call order. Chains are never reordered or
/// deduplicated: the same hook appended twice runs twice.
///
/// A chain handed out by a registry is an independent snapshot; pushing to
/// it does not change what the registry runs.
pub struct HookChain<S> {
    hooks: Vec<Arc<dyn Hook<S>>>,
}

impl<S> HookChain<S> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook to the end of the chain
    pub fn push(&mut self, hook: Arc<dyn Hook<S>>) {
        self.hooks.push(hook);
    }

    /// Number of hooks in the chain
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the chain has no hooks
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Iterate over the hooks in call order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Hook<S>>> {
        self.hooks.iter()
    }

    /// Hook names in call order
    pub fn names(&self) -> Vec<String> {
        self.hooks.iter().map(|h| h.name().to_string()).collect()
    }

    /// Run every hook in order, stopping at the first failure
    ///
    /// The failing hook's error is returned as is; hooks after it do not run.
    pub fn run(&self, this: &mut Object<S>, args: &mut Value) -> Result<()> {
        for (index, hook) in self.hooks.iter().enumerate() {
            if let Err(err) = hook.call(this, args) {
                debug!(hook = hook.name(), index, "Hook failed: {}", err);
                return Err(err);
            }
        }
        Ok(())
    }
}

impl<S> Clone for HookChain<S> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<S> Default for HookChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for HookChain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| h.name()))
            .finish()
    }
}

impl<S> FromIterator<Arc<dyn Hook<S>>> for HookChain<S> {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Hook<S>>>>(iter: I) -> Self {
        Self {
            hooks: iter.into_iter().collect(),
        }
    }
}

impl<'a, S> IntoIterator for &'a HookChain<S> {
    type Item = &'a Arc<dyn Hook<S>>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Hook<S>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hooks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterloperError;
    use crate::scope::Scope;
    use serde_json::json;

    type Log = Vec<&'static str>;

    struct Named(&'static str);

    impl Hook<Log> for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn call(&self, this: &mut Object<Log>, _args: &mut Value) -> Result<()> {
            this.state_mut().push(self.0);
            Ok(())
        }
    }

    struct Failing;

    impl Hook<Log> for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn call(&self, _this: &mut Object<Log>, _args: &mut Value) -> Result<()> {
            Err(InterloperError::Hook("stop".to_string()))
        }
    }

    fn object() -> Object<Log> {
        Scope::new("Log").instantiate(Vec::new())
    }

    #[test]
    fn test_runs_in_insertion_order() {
        let mut chain: HookChain<Log> = HookChain::new();
        chain.push(Arc::new(Named("first")));
        chain.push(Arc::new(Named("second")));
        chain.push(Arc::new(Named("first")));

        let mut object = object();
        chain.run(&mut object, &mut Value::Null).unwrap();

        assert_eq!(object.state(), &vec!["first", "second", "first"]);
        assert_eq!(chain.names(), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_failure_stops_the_chain() {
        let chain: HookChain<Log> = vec![
            Arc::new(Named("ran")) as Arc<dyn Hook<Log>>,
            Arc::new(Failing),
            Arc::new(Named("skipped")),
        ]
        .into_iter()
        .collect();

        let mut object = object();
        let err = chain.run(&mut object, &mut json!({})).unwrap_err();

        assert!(matches!(err, InterloperError::Hook(ref msg) if msg == "stop"));
        assert_eq!(object.state(), &vec!["ran"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original: HookChain<Log> = HookChain::new();
        original.push(Arc::new(Named("a")));

        let mut copy = original.clone();
        copy.push(Arc::new(Named("b")));

        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_empty_chain_runs() {
        let chain = HookChain::<Log>::default();
        assert!(chain.is_empty());
        assert!(chain.run(&mut object(), &mut Value::Null).is_ok());
        assert_eq!(format!("{:?}", chain), "[]");
    }
}
