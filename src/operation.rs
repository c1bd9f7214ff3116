//! # Operation Descriptors
//!
//! An [`OperationDescriptor`] is the finished, immutable description of one
//! change to a configuration document: where the element lives ([`Path`]),
//! which attributes it carries ([`AttributeSet`]), which child elements it
//! contains ([`ChildSpec`]) and what to do when it already exists
//! ([`ConflictPolicy`]).
//!
//! Descriptors are built with [`OperationBuilder`] and consumed by the
//! [`Mutator`](crate::mutate::Mutator). The mutator never sees the builder.
//!
//! ```
//! use creaper_offline::operation::{ChildSpec, ConflictPolicy, OperationBuilder};
//! use creaper_offline::path::Path;
//!
//! let path: Path = "profile/subsystem{urn:jboss:domain:logging:}/console-handler[CONSOLE]"
//!     .parse()
//!     .unwrap();
//! let op = OperationBuilder::new(path)
//!     .attribute("autoflush", "true")
//!     .child(ChildSpec::new("level").attribute("name", "INFO"))
//!     .replace_existing()
//!     .build();
//!
//! assert_eq!(op.on_conflict(), ConflictPolicy::Replace);
//! assert_eq!(op.children().len(), 1);
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::path::Path;

/// What to do when the target element already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Refuse to touch the document and report `CommandFailed`.
    #[default]
    Fail,
    /// Replace the existing element in place.
    Replace,
}

/// Ordered attribute mapping
///
/// Insertion order is kept. Setting a name that is already present replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<(String, String)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Insert only when a value is present; unset attributes are omitted.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributeSetVisitor;

        impl<'de> Visitor<'de> for AttributeSetVisitor {
            type Value = AttributeSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of attribute names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AttributeSet, A::Error> {
                let mut set = AttributeSet::new();
                while let Some((name, value)) = map.next_entry::<String, ScalarValue>()? {
                    set.insert(name, value.0);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(AttributeSetVisitor)
    }
}

/// A YAML scalar (string, bool or number) read as its textual form.
struct ScalarValue(String);

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Ok(ScalarValue(s)),
            serde_yaml::Value::Bool(b) => Ok(ScalarValue(b.to_string())),
            serde_yaml::Value::Number(n) => Ok(ScalarValue(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "attribute values must be scalars, got {:?}",
                other
            ))),
        }
    }
}

/// A child element of the element being added, possibly with its own children
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildSpec {
    #[serde(rename = "element")]
    element_type: String,
    #[serde(default)]
    attributes: AttributeSet,
    #[serde(default)]
    children: Vec<ChildSpec>,
}

impl ChildSpec {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            attributes: AttributeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn child(mut self, child: ChildSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn children(&self) -> &[ChildSpec] {
        &self.children
    }
}

/// A complete, immutable description of one change to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    path: Path,
    attributes: AttributeSet,
    children: Vec<ChildSpec>,
    on_conflict: ConflictPolicy,
}

impl OperationDescriptor {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn children(&self) -> &[ChildSpec] {
        &self.children
    }

    pub fn on_conflict(&self) -> ConflictPolicy {
        self.on_conflict
    }
}

/// Accumulates options before producing an [`OperationDescriptor`]
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    path: Path,
    attributes: AttributeSet,
    children: Vec<ChildSpec>,
    on_conflict: ConflictPolicy,
}

impl OperationBuilder {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            attributes: AttributeSet::new(),
            children: Vec::new(),
            on_conflict: ConflictPolicy::Fail,
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn attribute_opt(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.attributes.insert_opt(name, value);
        self
    }

    pub fn attributes(mut self, attributes: AttributeSet) -> Self {
        for (name, value) in attributes.iter() {
            self.attributes.insert(name, value);
        }
        self
    }

    pub fn child(mut self, child: ChildSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn child_opt(mut self, child: Option<ChildSpec>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    pub fn replace_existing(self) -> Self {
        self.on_conflict(ConflictPolicy::Replace)
    }

    pub fn build(self) -> OperationDescriptor {
        OperationDescriptor {
            path: self.path,
            attributes: self.attributes,
            children: self.children,
            on_conflict: self.on_conflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_path() -> Path {
        "profile/console-handler[h]".parse().unwrap()
    }

    #[test]
    fn test_attribute_set_keeps_insertion_order() {
        let mut set = AttributeSet::new();
        set.insert("enabled", "true");
        set.insert("autoflush", "false");
        set.insert("name", "h");
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["enabled", "autoflush", "name"]);
    }

    #[test]
    fn test_attribute_set_replaces_in_place() {
        let mut set = AttributeSet::new();
        set.insert("a", "1");
        set.insert("b", "2");
        set.insert("a", "3");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("a"), Some("3"));
        assert_eq!(set.iter().next(), Some(("a", "3")));
    }

    #[test]
    fn test_attribute_set_omits_unset_values() {
        let mut set = AttributeSet::new();
        set.insert_opt("encoding", None::<String>);
        set.insert_opt("level", Some("INFO"));
        assert_eq!(set.len(), 1);
        assert!(!set.contains("encoding"));
    }

    #[test]
    fn test_builder_defaults_to_fail_policy() {
        let op = OperationBuilder::new(handler_path()).build();
        assert_eq!(op.on_conflict(), ConflictPolicy::Fail);
        assert!(op.attributes().is_empty());
        assert!(op.children().is_empty());
    }

    #[test]
    fn test_builder_collects_children_in_order() {
        let op = OperationBuilder::new(handler_path())
            .child(ChildSpec::new("target").attribute("name", "System.out"))
            .child_opt(None)
            .child(ChildSpec::new("level").attribute("name", "INFO"))
            .replace_existing()
            .build();
        let types: Vec<&str> = op.children().iter().map(|c| c.element_type()).collect();
        assert_eq!(types, vec!["target", "level"]);
        assert_eq!(op.on_conflict(), ConflictPolicy::Replace);
    }

    #[test]
    fn test_nested_child_spec() {
        let formatter =
            ChildSpec::new("formatter").child(ChildSpec::new("named-formatter").attribute("name", "PATTERN"));
        assert_eq!(formatter.children().len(), 1);
        assert_eq!(formatter.children()[0].attributes().get("name"), Some("PATTERN"));
    }

    #[test]
    fn test_deserialize_child_spec_from_yaml() {
        let yaml = r#"
element: formatter
children:
  - element: pattern-formatter
    attributes:
      pattern: "%d %-5p %m%n"
"#;
        let spec: ChildSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.element_type(), "formatter");
        assert_eq!(
            spec.children()[0].attributes().get("pattern"),
            Some("%d %-5p %m%n")
        );
    }

    #[test]
    fn test_deserialize_attribute_set_scalars() {
        let set: AttributeSet = serde_yaml::from_str("enabled: false\nmax: 3\nname: x").unwrap();
        let entries: Vec<(&str, &str)> = set.iter().collect();
        assert_eq!(entries, vec![("enabled", "false"), ("max", "3"), ("name", "x")]);
    }

    #[test]
    fn test_deserialize_attribute_set_rejects_nested_values() {
        let result = serde_yaml::from_str::<AttributeSet>("nested: {a: 1}");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_conflict_policy() {
        let policy: ConflictPolicy = serde_yaml::from_str("replace").unwrap();
        assert_eq!(policy, ConflictPolicy::Replace);
    }
}
