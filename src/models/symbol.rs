//! Symbol outline model
//!
//! Raw document-symbol responses as they come back from one or more language
//! servers. The shape is heterogeneous: a response may be a single node, a
//! sequence of nodes, or a node wrapping another payload in a `result` envelope.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// A symbol outline tree
///
/// Built leniently from raw JSON: arrays become [`SymbolTree::Sequence`],
/// objects become [`SymbolTree::Node`] and any other value is kept as
/// [`SymbolTree::Other`], which traversal ignores. A malformed entry never
/// rejects its siblings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SymbolTree {
    Sequence(Vec<SymbolTree>),
    Node(Box<SymbolNode>),
    Other(Value),
}

impl SymbolTree {
    pub fn node(node: SymbolNode) -> Self {
        Self::Node(Box::new(node))
    }

    /// Wrap a payload in a `result` envelope
    pub fn envelope(payload: SymbolTree) -> Self {
        Self::node(SymbolNode {
            result: Some(payload),
            ..Default::default()
        })
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from_value).collect())
            }
            Value::Object(map) => Self::node(SymbolNode::from_map(map)),
            other => Self::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for SymbolTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// One entry of a symbol outline
///
/// Fields with an unexpected shape are dropped: a non-integer `kind` reads as
/// no kind, a non-array `children` as no children, a scalar `result` as no
/// envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SymbolTree>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SymbolTree>,
}

impl SymbolNode {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.code()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<SymbolTree>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn into_tree(self) -> SymbolTree {
        SymbolTree::node(self)
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let name = match map.remove("name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };
        let kind = map
            .get("kind")
            .and_then(Value::as_u64)
            .and_then(|code| u32::try_from(code).ok());
        let children = match map.remove("children") {
            Some(Value::Array(items)) => {
                Some(items.into_iter().map(SymbolTree::from_value).collect())
            }
            _ => None,
        };
        let result = match map.remove("result") {
            Some(payload @ (Value::Array(_) | Value::Object(_))) => {
                Some(SymbolTree::from_value(payload))
            }
            _ => None,
        };

        Self {
            name,
            kind,
            children,
            result,
        }
    }
}

impl<'de> Deserialize<'de> for SymbolNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}

/// Raw outline response. `None` means the server answered `null`.
pub type SymbolResponse = Option<SymbolTree>;

/// Parse a raw JSON payload into a [`SymbolResponse`]
///
/// Only the top level must be a node or a sequence; nested entries are
/// accepted in any shape.
pub fn parse_symbol_response(value: Value) -> serde_json::Result<SymbolResponse> {
    match value {
        Value::Null => Ok(None),
        Value::Array(_) | Value::Object(_) => Ok(Some(SymbolTree::from_value(value))),
        other => Err(serde::de::Error::custom(format!(
            "expected a symbol node or sequence, got {other}"
        ))),
    }
}

/// LSP symbol kinds (wire format is the integer code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize_repr, Deserialize_repr)]
#[repr(u32)]
pub enum SymbolKind {
    File = 1,
    Module = 2,
    Namespace = 3,
    Package = 4,
    Class = 5,
    Method = 6,
    Property = 7,
    Field = 8,
    Constructor = 9,
    Enum = 10,
    Interface = 11,
    Function = 12,
    Variable = 13,
    Constant = 14,
    String = 15,
    Number = 16,
    Boolean = 17,
    Array = 18,
    Object = 19,
    Key = 20,
    Null = 21,
    EnumMember = 22,
    Struct = 23,
    Event = 24,
    Operator = 25,
    TypeParameter = 26,
}

impl SymbolKind {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let kind = match code {
            1 => Self::File,
            2 => Self::Module,
            3 => Self::Namespace,
            4 => Self::Package,
            5 => Self::Class,
            6 => Self::Method,
            7 => Self::Property,
            8 => Self::Field,
            9 => Self::Constructor,
            10 => Self::Enum,
            11 => Self::Interface,
            12 => Self::Function,
            13 => Self::Variable,
            14 => Self::Constant,
            15 => Self::String,
            16 => Self::Number,
            17 => Self::Boolean,
            18 => Self::Array,
            19 => Self::Object,
            20 => Self::Key,
            21 => Self::Null,
            22 => Self::EnumMember,
            23 => Self::Struct,
            24 => Self::Event,
            25 => Self::Operator,
            26 => Self::TypeParameter,
            _ => return None,
        };
        Some(kind)
    }

    /// Kinds that add noise to a context query rather than meaning
    pub fn default_excluded() -> Vec<SymbolKind> {
        vec![
            Self::String,
            Self::Number,
            Self::Key,
            Self::Null,
            Self::Operator,
        ]
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Set of kind codes whose nodes are never offered to a visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    codes: BTreeSet<u32>,
}

impl ExclusionSet {
    pub fn new(kinds: impl IntoIterator<Item = SymbolKind>) -> Self {
        Self::from_codes(kinds.into_iter().map(SymbolKind::code))
    }

    pub fn from_codes(codes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            codes: BTreeSet::new(),
        }
    }

    /// A node without a kind is never excluded
    pub fn excludes(&self, kind: Option<u32>) -> bool {
        kind.is_some_and(|code| self.codes.contains(&code))
    }

    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.codes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(SymbolKind::default_excluded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let set = ExclusionSet::default();
        assert_eq!(set.codes().collect::<Vec<_>>(), vec![15, 16, 20, 21, 25]);
        assert!(set.excludes(Some(15)));
        assert!(!set.excludes(Some(12)));
        assert!(!set.excludes(None));
    }

    #[test]
    fn test_parse_array_response() {
        let value = serde_json::json!([
            {"name": "main", "kind": 12, "range": {}, "selectionRange": {}},
            {"name": "Config", "kind": 23, "children": [{"name": "port", "kind": 8}]}
        ]);
        let response = parse_symbol_response(value).unwrap();
        let Some(SymbolTree::Sequence(items)) = response else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 2);
        let SymbolTree::Node(config) = &items[1] else {
            panic!("expected node");
        };
        assert_eq!(config.name.as_deref(), Some("Config"));
        assert_eq!(config.children.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_envelope_and_null() {
        let response = parse_symbol_response(serde_json::json!({
            "result": [{"name": "foo", "kind": 12}]
        }))
        .unwrap();
        let Some(SymbolTree::Node(node)) = response else {
            panic!("expected node");
        };
        assert!(node.name.is_none());
        assert!(matches!(node.result, Some(SymbolTree::Sequence(_))));

        assert!(parse_symbol_response(serde_json::Value::Null).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(parse_symbol_response(serde_json::json!(42)).is_err());
    }

    #[test]
    fn test_parse_unrecognized_kind() {
        let response =
            parse_symbol_response(serde_json::json!([{"name": "foo", "kind": "Function"}]))
                .unwrap();
        let Some(SymbolTree::Sequence(items)) = response else {
            panic!("expected sequence");
        };
        let SymbolTree::Node(node) = &items[0] else {
            panic!("expected node");
        };
        assert_eq!(node.name.as_deref(), Some("foo"));
        assert_eq!(node.kind, None);

        let response =
            parse_symbol_response(serde_json::json!({"name": "big", "kind": 5_000_000_000u64}))
                .unwrap();
        let Some(SymbolTree::Node(node)) = response else {
            panic!("expected node");
        };
        assert_eq!(node.kind, None);
    }

    #[test]
    fn test_parse_ignores_misshapen_fields() {
        let response = parse_symbol_response(serde_json::json!({
            "name": 7,
            "kind": 12,
            "children": {},
            "result": "pending"
        }))
        .unwrap();
        let Some(SymbolTree::Node(node)) = response else {
            panic!("expected node");
        };
        assert_eq!(node.name, None);
        assert_eq!(node.kind, Some(12));
        assert!(node.children.is_none());
        assert!(node.result.is_none());
    }

    #[test]
    fn test_parse_keeps_stray_values() {
        let response =
            parse_symbol_response(serde_json::json!([{"name": "foo", "kind": 12}, "stray", 3]))
                .unwrap();
        let Some(SymbolTree::Sequence(items)) = response else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], SymbolTree::Node(_)));
        assert_eq!(items[1], SymbolTree::Other(serde_json::json!("stray")));
    }

    #[test]
    fn test_symbol_kind_codes() {
        assert_eq!(SymbolKind::Operator.code(), 25);
        assert_eq!(SymbolKind::from_code(23), Some(SymbolKind::Struct));
        assert_eq!(SymbolKind::from_code(99), None);

        let kinds: Vec<SymbolKind> = serde_json::from_str("[15, 21]").unwrap();
        assert_eq!(kinds, vec![SymbolKind::String, SymbolKind::Null]);
    }
}
