//! Node Registry - id to composition node mapping.
//!
//! Owned by a composer rather than global, so independent trees (and tests)
//! never share entries. Entries are never removed; registering an id again
//! replaces the earlier node.

use std::collections::HashMap;

use super::node::CompositionNode;

#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<String, CompositionNode>,
    id_counter: usize,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under its id. Returns the node it replaced, if any.
    pub fn insert(&mut self, node: CompositionNode) -> Option<CompositionNode> {
        let replaced = self.nodes.insert(node.id.clone(), node);
        if let Some(old) = &replaced {
            tracing::warn!(id = %old.id, "node id registered twice, earlier node replaced");
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<&CompositionNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CompositionNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Generate an id of the form `node-N` that is not registered yet.
    pub fn generate_id(&mut self) -> String {
        loop {
            let id = format!("node-{}", self.id_counter);
            self.id_counter += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }
}
