use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host-assigned node identifier, stable for the lifetime of the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Element,
    Text,
}

impl NodeKind {
    /// Numeric node type as the host reports it.
    pub fn node_type(self) -> u16 {
        match self {
            NodeKind::Element => 1,
            NodeKind::Text => 3,
        }
    }
}

/// Raw `class` value of an element.
///
/// Most elements carry a whitespace separated token string. Some (SVG
/// elements in particular) expose a structured object instead; those are
/// kept verbatim and never match a token lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassValue {
    Tokens(String),
    Opaque(Value),
}

impl ClassValue {
    pub fn tokens(&self) -> Option<ClassTokens<'_>> {
        match self {
            ClassValue::Tokens(raw) => Some(ClassTokens(raw)),
            ClassValue::Opaque(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClassValue::Tokens(raw) => Some(raw),
            ClassValue::Opaque(_) => None,
        }
    }
}

impl From<&str> for ClassValue {
    fn from(value: &str) -> Self {
        ClassValue::Tokens(value.to_string())
    }
}

/// Borrowed view over a token string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassTokens<'a>(&'a str);

impl<'a> ClassTokens<'a> {
    pub fn contains(&self, token: &str) -> bool {
        self.0.split_ascii_whitespace().any(|t| t == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> {
        self.0.split_ascii_whitespace()
    }

    pub fn raw(&self) -> &'a str {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub tag: Option<String>,
    pub class: Option<ClassValue>,
    pub attrs: BTreeMap<String, String>,
    pub data: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn class_tokens(&self) -> Option<ClassTokens<'_>> {
        self.class.as_ref().and_then(ClassValue::tokens)
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_tokens()
            .map(|tokens| tokens.contains(token))
            .unwrap_or(false)
    }
}

/// Serialized form of a node subtree, as carried by host traces.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeDescriptor {
    pub id: NodeId,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescriptor>,
}

impl NodeDescriptor {
    pub fn element(id: u64, tag: &str, class: &str) -> Self {
        Self {
            id: NodeId(id),
            kind: NodeKind::Element,
            tag: Some(tag.to_string()),
            class: if class.is_empty() {
                None
            } else {
                Some(ClassValue::from(class))
            },
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn text(id: u64, data: &str) -> Self {
        Self {
            id: NodeId(id),
            kind: NodeKind::Text,
            tag: None,
            class: None,
            attrs: BTreeMap::new(),
            text: Some(data.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeDescriptor>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_class_value(mut self, class: ClassValue) -> Self {
        self.class = Some(class);
        self
    }
}
