//! Read-only queries over a built report tree.
//!
//! Every query walks the tree in pre-order, so results are in document order.

use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId};

/// Combined query. Unset or blank criteria are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    text: Option<String>,
    value_type: Option<String>,
    relationship: Option<String>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn text(&self) -> Option<&str> {
        non_blank(&self.text)
    }

    pub fn value_type(&self) -> Option<&str> {
        non_blank(&self.value_type)
    }

    pub fn relationship(&self) -> Option<&str> {
        non_blank(&self.relationship)
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.value_type().is_none() && self.relationship().is_none()
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Query engine over an immutable tree snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    root: &'a Node,
}

impl<'a> SearchEngine<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { root }
    }

    pub fn all_nodes(&self) -> Vec<&'a Node> {
        self.root.iter().collect()
    }

    pub fn find_by_id(&self, id: NodeId) -> DomainResult<&'a Node> {
        self.root.find(id).ok_or(DomainError::NodeNotFound(id))
    }

    /// Nodes whose value contains `term`, case-insensitively.
    ///
    /// # Errors
    /// `DomainError::InvalidQuery` for an empty or blank term.
    pub fn search_text(&self, term: &str) -> DomainResult<Vec<&'a Node>> {
        if term.trim().is_empty() {
            return Err(DomainError::InvalidQuery("search term is empty".into()));
        }
        let needle = term.to_lowercase();
        let results: Vec<_> = self
            .root
            .iter()
            .filter(|node| value_contains(node, &needle))
            .collect();
        debug!(term, hits = results.len(), "text search");
        Ok(results)
    }

    /// Nodes whose value type equals `value_type`, case-insensitively.
    pub fn search_by_type(&self, value_type: &str) -> Vec<&'a Node> {
        self.root
            .iter()
            .filter(|node| node.value_type.matches(value_type))
            .collect()
    }

    /// Nodes whose relationship equals `relationship`, case-insensitively.
    /// Nodes without a relationship never match.
    pub fn search_by_relationship(&self, relationship: &str) -> Vec<&'a Node> {
        self.root
            .iter()
            .filter(|node| relationship_matches(node, relationship))
            .collect()
    }

    /// Narrow the full node list by text, then type, then relationship.
    /// Without criteria, returns every node.
    pub fn advanced_search(&self, criteria: &SearchCriteria) -> Vec<&'a Node> {
        let mut results = self.all_nodes();

        if let Some(text) = criteria.text() {
            let needle = text.to_lowercase();
            results.retain(|node| value_contains(node, &needle));
        }
        if let Some(value_type) = criteria.value_type() {
            results.retain(|node| node.value_type.matches(value_type));
        }
        if let Some(relationship) = criteria.relationship() {
            results.retain(|node| relationship_matches(node, relationship));
        }

        debug!(?criteria, hits = results.len(), "advanced search");
        results
    }
}

fn value_contains(node: &Node, lowercase_needle: &str) -> bool {
    node.value
        .as_deref()
        .is_some_and(|value| value.to_lowercase().contains(lowercase_needle))
}

fn relationship_matches(node: &Node, relationship: &str) -> bool {
    node.relationship
        .as_deref()
        .is_some_and(|rel| rel.trim().eq_ignore_ascii_case(relationship.trim()))
}
