use super::{ConfigError, Payload, ValueType};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Identifies a stream or side packet slot, either by tag or by position.
///
/// In configuration documents an identifier written as a canonical
/// unsigned integer (digits only, no leading zero) is positional; anything
/// else, including `"007"` or `"+1"`, is a tag. Parsing and printing
/// therefore round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PortId {
    Tag(String),
    Index(usize),
}

impl PortId {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    pub fn parse(raw: &str) -> Self {
        let canonical = raw.bytes().all(|b| b.is_ascii_digit()) && (raw == "0" || !raw.starts_with('0'));
        match raw.parse::<usize>() {
            Ok(index) if canonical => Self::Index(index),
            _ => Self::Tag(raw.to_string()),
        }
    }
}

impl From<&str> for PortId {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for PortId {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<usize> for PortId {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<PortId> for String {
    fn from(id: PortId) -> Self {
        match id {
            PortId::Tag(tag) => tag,
            PortId::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "\"{}\"", tag),
            Self::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Type accepted by a port once negotiation has run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortType {
    /// Declared in the graph but not yet claimed by the node.
    Unset,
    Any,
    Exact(ValueType),
    /// Whatever the named input accepts.
    SameAs(PortId),
}

/// One declared stream or side packet slot
#[derive(Debug, Clone)]
pub struct Port {
    port_type: PortType,
    pub(crate) header: Option<Payload>,
}

impl Port {
    pub fn new() -> Self {
        Self {
            port_type: PortType::Unset,
            header: None,
        }
    }

    pub fn of<T: Any>() -> Self {
        let mut port = Self::new();
        port.set::<T>();
        port
    }

    pub fn port_type(&self) -> &PortType {
        &self.port_type
    }

    pub fn set_any(&mut self) {
        self.port_type = PortType::Any;
    }

    pub fn set<T: Any>(&mut self) {
        self.port_type = PortType::Exact(ValueType::of::<T>());
    }

    pub fn set_same_as(&mut self, other: PortId) {
        self.port_type = PortType::SameAs(other);
    }

    pub fn header(&self) -> Option<&Payload> {
        self.header.as_ref()
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered identifier to entry mapping.
///
/// Iteration always follows declaration order, so the same collection
/// walks identically during negotiation, open and every tick.
#[derive(Debug, Clone)]
pub struct PortCollection<T = Port> {
    entries: Vec<(PortId, T)>,
}

impl<T> PortCollection<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<PortId>, value: T) -> Result<(), ConfigError> {
        let id = id.into();
        if self.contains(&id) {
            return Err(ConfigError::DuplicatePort { port: id });
        }
        self.entries.push((id, value));
        Ok(())
    }

    pub fn get(&self, id: &PortId) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, id: &PortId) -> Option<&mut T> {
        self.entries.iter_mut().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn contains(&self, id: &PortId) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortId, &T)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PortId, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &PortId> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Same identifier set, regardless of order.
    pub fn same_ids_as<U>(&self, other: &PortCollection<U>) -> bool {
        self.len() == other.len() && self.ids().all(|id| other.contains(id))
    }

    /// Like [`map`](Self::map), with mutable access to each entry.
    pub fn map_mut<U>(&mut self, mut f: impl FnMut(&PortId, &mut T) -> U) -> PortCollection<U> {
        PortCollection {
            entries: self.entries.iter_mut().map(|(k, v)| (k.clone(), f(k, v))).collect(),
        }
    }

    /// New collection with the same identifiers in the same order.
    pub fn map<U>(&self, mut f: impl FnMut(&PortId, &T) -> U) -> PortCollection<U> {
        PortCollection {
            entries: self.entries.iter().map(|(k, v)| (k.clone(), f(k, v))).collect(),
        }
    }
}

impl PortCollection<Port> {
    /// Declare untyped ports, as a graph config would before negotiation.
    pub fn declare<I, P>(ids: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PortId>,
    {
        let mut collection = Self::new();
        for id in ids {
            collection.insert(id, Port::new())?;
        }
        Ok(collection)
    }
}

impl<T> Default for PortCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_ids() {
        assert_eq!(PortId::parse("VIDEO"), PortId::tag("VIDEO"));
        assert_eq!(PortId::parse("2"), PortId::index(2));
        assert_eq!(PortId::parse("-1"), PortId::tag("-1"));
        assert_eq!(PortId::parse("0"), PortId::index(0));
    }

    #[test]
    fn test_non_canonical_numbers_stay_tags() {
        for raw in ["007", "00", "+1", ""] {
            let id = PortId::parse(raw);
            assert_eq!(id, PortId::tag(raw));
            assert_eq!(String::from(id), raw);
        }
        assert_eq!(String::from(PortId::parse("12")), "12");
    }

    #[test]
    fn test_leading_zero_does_not_collide_with_index() {
        let ports = PortCollection::declare(["007", "7"]).unwrap();
        assert!(ports.contains(&PortId::tag("007")));
        assert!(ports.contains(&PortId::index(7)));
    }

    #[test]
    fn test_iteration_follows_declaration_order() {
        let ports = PortCollection::declare(["Z", "A", "0", "M"]).unwrap();
        let ids: Vec<String> = ports.ids().cloned().map(String::from).collect();
        assert_eq!(ids, vec!["Z", "A", "0", "M"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = PortCollection::declare(["A", "B", "A"]);
        assert!(matches!(result, Err(ConfigError::DuplicatePort { .. })));
    }

    #[test]
    fn test_same_ids_ignores_order() {
        let a = PortCollection::declare(["A", "B"]).unwrap();
        let b = PortCollection::declare(["B", "A"]).unwrap();
        let c = PortCollection::declare(["A", "C"]).unwrap();
        let d = PortCollection::declare(["A"]).unwrap();

        assert!(a.same_ids_as(&b));
        assert!(!a.same_ids_as(&c));
        assert!(!a.same_ids_as(&d));
    }

    #[test]
    fn test_map_keeps_identifiers() {
        let ports = PortCollection::declare(["A", "B"]).unwrap();
        let slots: PortCollection<Option<u32>> = ports.map(|_, _| None);
        assert!(slots.same_ids_as(&ports));
        assert_eq!(slots.get(&PortId::tag("B")), Some(&None));
    }
}
