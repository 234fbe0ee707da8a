use serde::{Deserialize, Serialize};

use crate::model::tree::{NodeId, NodeMap, Observer};

/// Remembers which child of each node is selected.
///
/// Only composite tab docks show the selection, but every parent tracks one
/// so a node that later becomes a tab keeps a sensible choice.
#[derive(Default, Serialize, Deserialize)]
pub struct Selection {
    nodes: slotmap::SecondaryMap<NodeId, NodeId>,
}

impl Selection {
    pub fn selected_child(&self, map: &NodeMap, node: NodeId) -> Option<NodeId> {
        let child = self.nodes.get(node).copied();
        if let Some(child) = child {
            debug_assert_eq!(child.parent(map), Some(node));
        }
        child
    }

    /// Selects `node` within its parent. Returns true if the selection changed.
    pub fn select_locally(&mut self, map: &NodeMap, node: NodeId) -> bool {
        let Some(parent) = node.parent(map) else {
            return false;
        };
        self.nodes.insert(parent, node).map(|old| old != node).unwrap_or(true)
    }
}

impl Observer for Selection {
    fn added_to_forest(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        if let Some(parent) = node.parent(map) {
            if !self.nodes.contains_key(parent) {
                self.nodes.insert(parent, node);
            }
        }
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        let Some(parent) = node.parent(map) else { return };
        if self.nodes.get(parent) == Some(&node) {
            match node.next_sibling(map).or(node.prev_sibling(map)) {
                Some(next) => {
                    self.nodes.insert(parent, next);
                }
                None => {
                    self.nodes.remove(parent);
                }
            }
        }
    }

    fn removed_from_forest(&mut self, _map: &NodeMap, node: NodeId) { self.nodes.remove(node); }
}
