//! Tree builder for assembling the report tree from nested content sequences.

use tracing::{debug, instrument};

use crate::domain::dataset::{tags, Dataset};
use crate::domain::decoder::ContentItemDecoder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId, ValueType};

pub const DEFAULT_ROOT_LABEL: &str = "Structured Report";

/// Constructs the report tree from a document.
///
/// The top-level content sequence is wrapped under a synthetic `ROOT` node,
/// so a document with several top-level items still yields a single tree.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    decoder: ContentItemDecoder,
    root_label: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            decoder: ContentItemDecoder::new(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    /// Build the tree of a document.
    ///
    /// # Errors
    /// `DomainError::NotStructuredReport` if the document has no content sequence.
    /// An empty content sequence yields a root without children.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, document: &Dataset) -> DomainResult<Node> {
        let items = document
            .sequence(tags::CONTENT_SEQUENCE)
            .ok_or(DomainError::NotStructuredReport)?;

        let mut next_id = NodeId::ROOT.0;
        let mut root = Node::new(NodeId::ROOT, ValueType::Root);
        root.value = Some(self.root_label.clone());
        root.children = self.build_children(items, &mut next_id);

        debug!(nodes = next_id + 1, "built report tree");
        Ok(root)
    }

    fn build_children(&self, items: &[Dataset], next_id: &mut usize) -> Vec<Node> {
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            *next_id += 1;
            let mut node = self.decoder.decode(NodeId(*next_id), item);
            if let Some(nested) = item.sequence(tags::CONTENT_SEQUENCE) {
                node.children = self.build_children(nested, next_id);
            }
            children.push(node);
        }
        children
    }
}
