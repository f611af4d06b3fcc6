//! Content item decoder: turns one raw content item into a normalized `Node`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::trace;

use crate::domain::content::{ContentItem, ContentValue, MeasuredValue};
use crate::domain::dataset::Dataset;
use crate::domain::node::{CodedConcept, Node, NodeId, Payload, ValueType};

pub const UNKNOWN_ITEM_VALUE: &str = "Unknown content item";

/// Decodes content items. Decoding never fails; missing attributes yield partial nodes.
///
/// When a content item has no concept name, its value shows the payload alone
/// (raw text, `<meaning> (<code>)` for codes, the bare number for measurements).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentItemDecoder;

impl ContentItemDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a content item into a node without children.
    pub fn decode(&self, id: NodeId, item: &Dataset) -> Node {
        self.render(id, ContentItem::read(item))
    }

    pub fn render(&self, id: NodeId, item: ContentItem) -> Node {
        let ContentItem::Typed {
            concept_name,
            relationship,
            value,
        } = item
        else {
            trace!(%id, "content item without value type");
            let mut node = Node::new(id, ValueType::Unknown);
            node.value = Some(UNKNOWN_ITEM_VALUE.to_string());
            return node;
        };

        let mut node = Node::new(id, value.value_type());
        let name = concept_name.as_ref();

        match value {
            ContentValue::Text(text) => {
                node.value = text.map(|text| compose_named(name, &text));
            }
            ContentValue::Code(code) => {
                if let Some(code) = code {
                    let coded = format!("{} ({})", code.meaning, code.value);
                    node.value = Some(match name {
                        Some(name) => format!("{} : {}", name, coded),
                        None => coded,
                    });
                    node.payload = Payload::Code(code);
                }
            }
            ContentValue::Num(measured) => {
                if let Some(MeasuredValue { numeric, unit }) = measured {
                    node.value = Some(compose_named(name, &numeric));
                    node.payload = Payload::Measurement { numeric, unit };
                }
            }
            ContentValue::Container => {
                node.value = name.map(CodedConcept::to_string);
            }
            ContentValue::Literal {
                value_type,
                literal,
            } => {
                node.value = literal
                    .map(|literal| compose_named(name, &normalize_literal(&value_type, &literal)));
            }
            ContentValue::Reference { reference, .. } => {
                if let Some(reference) = reference {
                    node.payload = Payload::Reference(reference);
                }
            }
            ContentValue::Unhandled(value_type) => {
                node.value = Some(format!("ValueType: {}", value_type));
            }
        }

        node.concept_name = concept_name;
        node.relationship = relationship;
        node
    }
}

/// `<meaning> : <payload> (<code> <scheme>)`, or the payload alone without a name.
fn compose_named(name: Option<&CodedConcept>, payload: &str) -> String {
    match name {
        Some(name) => format!(
            "{} : {} ({} {})",
            name.meaning, payload, name.value, name.scheme
        ),
        None => payload.to_string(),
    }
}

/// Render DA, TM and DT literals in ISO form when they parse, unchanged otherwise.
fn normalize_literal(value_type: &ValueType, literal: &str) -> String {
    let parsed = match value_type {
        ValueType::Date => NaiveDate::parse_from_str(literal, "%Y%m%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string()),
        ValueType::Time => ["%H%M%S%.f", "%H%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(literal, fmt).ok())
            .map(|t| t.format("%H:%M:%S").to_string()),
        ValueType::DateTime => NaiveDateTime::parse_from_str(literal, "%Y%m%d%H%M%S%.f")
            .ok()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        _ => None,
    };
    parsed.unwrap_or_else(|| literal.to_string())
}
