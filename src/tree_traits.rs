//! Text rendering of report trees via termtree

use std::collections::HashSet;

use colored::Colorize;
use termtree::Tree;
use tracing::instrument;

use crate::config::DisplaySettings;
use crate::domain::{Node, NodeId, Payload};

pub trait TreeNodeConvert {
    /// Render the subtree as a termtree.
    fn to_tree_string(&self, display: &DisplaySettings) -> Tree<String> {
        self.to_highlighted_tree(display, &HashSet::new())
    }

    /// Render the subtree, emphasising the nodes in `highlight`.
    fn to_highlighted_tree(
        &self,
        display: &DisplaySettings,
        highlight: &HashSet<NodeId>,
    ) -> Tree<String>;
}

impl TreeNodeConvert for Node {
    #[instrument(level = "trace", skip_all, fields(id = %self.id))]
    fn to_highlighted_tree(
        &self,
        display: &DisplaySettings,
        highlight: &HashSet<NodeId>,
    ) -> Tree<String> {
        let line = node_line(self, display);
        let line = if highlight.contains(&self.id) {
            line.yellow().bold().to_string()
        } else {
            line
        };

        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|c| c.to_highlighted_tree(display, highlight))
            .collect();

        Tree::new(line).with_leaves(leaves)
    }
}

/// One display line for a node: `[node_3] CONTAINS: TEXT Description : ...`.
///
/// Nodes without a display value but with a SOP reference show the
/// referenced instance instead.
pub fn node_line(node: &Node, display: &DisplaySettings) -> String {
    let mut line = String::new();
    if display.show_ids {
        line.push_str(&format!("[{}] ", node.id));
    }
    if display.show_relationship {
        if let Some(rel) = &node.relationship {
            line.push_str(&format!("{}: ", rel));
        }
    }
    line.push_str(node.value_type.as_str());

    match (&node.value, &node.payload) {
        (Some(value), _) => {
            line.push(' ');
            line.push_str(value);
        }
        (None, Payload::Reference(reference)) => {
            let class = reference.class_uid.as_deref().unwrap_or("?");
            let instance = reference.instance_uid.as_deref().unwrap_or("?");
            line.push_str(&format!(" -> {} / {}", class, instance));
        }
        _ => {}
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SopReference, ValueType};

    fn plain() -> DisplaySettings {
        DisplaySettings {
            color: false,
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn given_text_node_when_rendering_line_then_shows_id_relationship_and_value() {
        let mut node = Node::new(NodeId(3), ValueType::Text);
        node.relationship = Some("CONTAINS".into());
        node.value = Some("Finding : mass".into());

        assert_eq!(
            node_line(&node, &plain()),
            "[node_3] CONTAINS: TEXT Finding : mass"
        );

        let terse = DisplaySettings {
            show_ids: false,
            show_relationship: false,
            color: false,
        };
        assert_eq!(node_line(&node, &terse), "TEXT Finding : mass");
    }

    #[test]
    fn given_image_node_without_value_when_rendering_line_then_shows_reference() {
        let mut node = Node::new(NodeId(5), ValueType::Image);
        node.payload = Payload::Reference(SopReference {
            class_uid: Some("1.2.3".into()),
            instance_uid: None,
        });

        assert_eq!(node_line(&node, &plain()), "[node_5] IMAGE -> 1.2.3 / ?");
    }

    #[test]
    fn given_nested_nodes_when_rendering_tree_then_children_are_leaves() {
        let mut root = Node::new(NodeId::ROOT, ValueType::Root);
        root.value = Some("Structured Report".into());
        let mut child = Node::new(NodeId(1), ValueType::Container);
        child.children.push(Node::new(NodeId(2), ValueType::Text));
        root.children.push(child);

        let tree = root.to_tree_string(&plain());
        let rendered = tree.to_string();

        assert!(rendered.starts_with("[root] ROOT Structured Report"));
        assert!(rendered.contains("[node_1] CONTAINER"));
        assert!(rendered.contains("[node_2] TEXT"));
        assert_eq!(tree.leaves.len(), 1);
    }
}
