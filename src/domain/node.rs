//! Normalized report tree nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Identifier of a node, unique within one build. Assigned in pre-order, root is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ROOT {
            write!(f, "root")
        } else {
            write!(f, "node_{}", self.0)
        }
    }
}

impl FromStr for NodeId {
    type Err = String;

    /// Accepts `root`, `node_<n>` or a bare index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("root") {
            return Ok(Self::ROOT);
        }
        let digits = s.strip_prefix("node_").unwrap_or(s);
        digits
            .parse::<usize>()
            .map(NodeId)
            .map_err(|_| format!("invalid node id: {}", s))
    }
}

/// Value type of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Code,
    Num,
    DateTime,
    Date,
    Time,
    UidRef,
    PName,
    Composite,
    Image,
    Waveform,
    Scoord,
    Scoord3d,
    Tcoord,
    Container,
    Table,
    /// Synthetic document root.
    Root,
    /// The source item carries no value type.
    Unknown,
    /// A value type string outside the known set, kept verbatim.
    Other(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Text => "TEXT",
            ValueType::Code => "CODE",
            ValueType::Num => "NUM",
            ValueType::DateTime => "DATETIME",
            ValueType::Date => "DATE",
            ValueType::Time => "TIME",
            ValueType::UidRef => "UIDREF",
            ValueType::PName => "PNAME",
            ValueType::Composite => "COMPOSITE",
            ValueType::Image => "IMAGE",
            ValueType::Waveform => "WAVEFORM",
            ValueType::Scoord => "SCOORD",
            ValueType::Scoord3d => "SCOORD3D",
            ValueType::Tcoord => "TCOORD",
            ValueType::Container => "CONTAINER",
            ValueType::Table => "TABLE",
            ValueType::Root => "ROOT",
            ValueType::Unknown => "UNKNOWN",
            ValueType::Other(s) => s,
        }
    }

    /// Map a value type string from the document. Unrecognised strings become `Other`.
    pub fn from_source(s: &str) -> Self {
        let s = s.trim();
        match s {
            "TEXT" => ValueType::Text,
            "CODE" => ValueType::Code,
            "NUM" => ValueType::Num,
            "DATETIME" => ValueType::DateTime,
            "DATE" => ValueType::Date,
            "TIME" => ValueType::Time,
            "UIDREF" => ValueType::UidRef,
            "PNAME" => ValueType::PName,
            "COMPOSITE" => ValueType::Composite,
            "IMAGE" => ValueType::Image,
            "WAVEFORM" => ValueType::Waveform,
            "SCOORD" => ValueType::Scoord,
            "SCOORD3D" => ValueType::Scoord3d,
            "TCOORD" => ValueType::Tcoord,
            "CONTAINER" => ValueType::Container,
            "TABLE" => ValueType::Table,
            other => ValueType::Other(other.to_string()),
        }
    }

    /// Case-insensitive comparison against a query string.
    pub fn matches(&self, query: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(query.trim())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Coded triple. Missing sub-fields are normalized to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodedConcept {
    pub meaning: String,
    pub value: String,
    pub scheme: String,
}

impl CodedConcept {
    pub fn new(
        meaning: impl Into<String>,
        value: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            meaning: meaning.into(),
            value: value.into(),
            scheme: scheme.into(),
        }
    }
}

impl fmt::Display for CodedConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.meaning, self.value, self.scheme)
    }
}

/// Referenced SOP instance of an IMAGE, COMPOSITE or WAVEFORM item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SopReference {
    pub class_uid: Option<String>,
    pub instance_uid: Option<String>,
}

/// Structured data carried by a node besides its display value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    #[default]
    None,
    Code(CodedConcept),
    Measurement {
        numeric: String,
        unit: Option<CodedConcept>,
    },
    Reference(SopReference),
}

/// Node of the report tree. Each node owns its children, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_name: Option<CodedConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "is_no_payload")]
    pub payload: Payload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub children: Vec<Node>,
}

fn is_no_payload(payload: &Payload) -> bool {
    matches!(payload, Payload::None)
}

impl Node {
    pub fn new(id: NodeId, value_type: ValueType) -> Self {
        Self {
            id,
            value_type,
            concept_name: None,
            value: None,
            payload: Payload::None,
            relationship: None,
            children: Vec::new(),
        }
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels, a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.iter().find(|node| node.id == id)
    }

    /// One-line label used by the tree renderer and result listings.
    pub fn label(&self) -> String {
        let head = match &self.relationship {
            Some(rel) => format!("{}: {}", rel, self.value_type),
            None => self.value_type.to_string(),
        };
        match &self.value {
            Some(value) => format!("{} {}", head, value),
            None => head,
        }
    }
}

pub struct PreOrderIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}
