//! Phase and operation name types.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Point at which a hook runs relative to the wrapped operation
///
/// # Examples
///
/// ```
/// use interloper::prelude::*;
///
/// assert_eq!(Phase::Before.as_str(), "before");
/// assert_eq!(serde_json::to_string(&Phase::After).unwrap(), r#""after""#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Runs before the operation body
    Before,
    /// Runs after the operation body has returned
    After,
}

impl Phase {
    /// Both phases, in execution order
    pub const ALL: [Phase; 2] = [Phase::Before, Phase::After];

    /// Lowercase name of the phase
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of an operation within a scope
///
/// Cheap to clone and usable as a map key that is looked up by `&str`.
///
/// # Examples
///
/// ```
/// use interloper::prelude::*;
///
/// let name = OperationName::from("deposit");
/// assert_eq!(name, "deposit");
/// assert_eq!(name.as_str(), "deposit");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(Arc<str>);

impl OperationName {
    /// Create a new operation name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OperationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&OperationName> for OperationName {
    fn from(name: &OperationName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for OperationName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for OperationName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// One or more operation names accepted by a declaration
///
/// Lets `before`, `after` and the inheritance calls take either a single
/// name or a list of names.
///
/// # Examples
///
/// ```
/// use interloper::prelude::*;
///
/// assert_eq!("save".into_operation_names().len(), 1);
/// assert_eq!(["save", "destroy"].into_operation_names().len(), 2);
/// assert_eq!(vec!["a".to_string()].into_operation_names()[0], "a");
/// ```
pub trait OperationNames {
    /// Collect the names in declaration order
    fn into_operation_names(self) -> Vec<OperationName>;
}

impl OperationNames for &str {
    fn into_operation_names(self) -> Vec<OperationName> {
        vec![OperationName::from(self)]
    }
}

impl OperationNames for String {
    fn into_operation_names(self) -> Vec<OperationName> {
        vec![OperationName::from(self)]
    }
}

impl OperationNames for OperationName {
    fn into_operation_names(self) -> Vec<OperationName> {
        vec![self]
    }
}

impl OperationNames for &OperationName {
    fn into_operation_names(self) -> Vec<OperationName> {
        vec![self.clone()]
    }
}

impl<T> OperationNames for &[T]
where
    T: AsRef<str>,
{
    fn into_operation_names(self) -> Vec<OperationName> {
        self.iter().map(OperationName::new).collect()
    }
}

impl<T, const N: usize> OperationNames for [T; N]
where
    T: AsRef<str>,
{
    fn into_operation_names(self) -> Vec<OperationName> {
        self.iter().map(OperationName::new).collect()
    }
}

impl<T> OperationNames for Vec<T>
where
    T: AsRef<str>,
{
    fn into_operation_names(self) -> Vec<OperationName> {
        self.iter().map(OperationName::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::ALL, [Phase::Before, Phase::After]);
        assert!(Phase::Before < Phase::After);
    }

    #[test]
    fn test_phase_serialization() {
        assert_eq!(serde_json::to_value(Phase::Before).unwrap(), "before");
        let phase: Phase = serde_json::from_str(r#""after""#).unwrap();
        assert_eq!(phase, Phase::After);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::After.to_string(), "after");
    }

    #[test]
    fn test_operation_name_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(OperationName::from("withdraw"), 1);
        assert_eq!(map.get("withdraw"), Some(&1));
        assert_eq!(map.get("deposit"), None);
    }

    #[test]
    fn test_operation_name_serializes_as_string() {
        let json = serde_json::to_value(OperationName::from("close")).unwrap();
        assert_eq!(json, "close");
    }

    #[test]
    fn test_operation_names_keep_declaration_order() {
        let names = ["open", "close", "open"].into_operation_names();
        let names: Vec<&str> = names.iter().map(OperationName::as_str).collect();
        assert_eq!(names, vec!["open", "close", "open"]);
    }

    #[test]
    fn test_operation_names_from_slice() {
        let owned = vec!["a".to_string(), "b".to_string()];
        let names = owned.as_slice().into_operation_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names[1], "b");
    }
}
