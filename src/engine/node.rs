//! CompositionNode - a markup template plus the nodes it references.
//!
//! A node starts Unresolved. Resolving it (see
//! [`Composer::resolve`](crate::pipeline::Composer::resolve)) rewrites its
//! template with placeholders, parses it and splices the referenced nodes'
//! roots in. Its ready callback runs once, after every node in its subtree
//! has run its own.

use std::fmt;

use crate::error::MarkupError;
use crate::markup::{Document, DomId};
use crate::types::{Delimiters, NodeFlags, NodeState};

// =============================================================================
// Ready Callback
// =============================================================================

/// What a ready callback can see: the node, its root and the whole document.
pub struct ReadyContext<'a> {
    /// Id of the node being initialized.
    pub id: &'a str,
    /// Root of the node, `None` if it failed to resolve.
    pub root: Option<DomId>,
    /// The composer's document, including every spliced subtree.
    pub document: &'a mut Document,
}

/// Post-mount callback of a node. Runs at most once.
pub type ReadyCallback = Box<dyn FnOnce(&mut ReadyContext<'_>)>;

// =============================================================================
// Composition Node
// =============================================================================

pub struct CompositionNode {
    pub(crate) id: String,
    pub(crate) template: String,
    pub(crate) delimiters: Option<Delimiters>,
    pub(crate) children: Vec<String>,
    pub(crate) root: Option<DomId>,
    pub(crate) on_ready: Option<ReadyCallback>,
    pub(crate) flags: NodeFlags,
    pub(crate) failure: Option<MarkupError>,
}

impl CompositionNode {
    /// Create an unresolved node. It becomes visible to other nodes once
    /// registered with a composer.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
            delimiters: None,
            children: Vec::new(),
            root: None,
            on_ready: None,
            flags: NodeFlags::NONE,
            failure: None,
        }
    }

    /// Use these delimiters instead of the composer default.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Set the callback run after the assembled tree is initialized.
    pub fn on_ready<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut ReadyContext<'_>) + 'static,
    {
        self.on_ready = Some(Box::new(callback));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current template. After a successful resolution, tokens of registered
    /// nodes have been replaced by placeholder markup.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Node-specific delimiters, if any.
    pub fn delimiters(&self) -> Option<&Delimiters> {
        self.delimiters.as_ref()
    }

    /// Ids of referenced nodes, one entry per token occurrence, in scan order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Root of the resolved subtree. The document owns the element.
    pub fn root(&self) -> Option<DomId> {
        self.root
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn state(&self) -> NodeState {
        NodeState::from(self.flags)
    }

    pub fn is_resolved(&self) -> bool {
        self.flags.contains(NodeFlags::RESOLVED)
    }

    pub fn is_initialized(&self) -> bool {
        self.flags.contains(NodeFlags::INITIALIZED)
    }

    /// Why the node's markup did not parse. Such a node is never parsed again.
    pub fn failure(&self) -> Option<&MarkupError> {
        self.failure.as_ref()
    }

    pub fn has_ready_callback(&self) -> bool {
        self.on_ready.is_some()
    }
}

impl fmt::Debug for CompositionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionNode")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("delimiters", &self.delimiters)
            .field("children", &self.children)
            .field("root", &self.root)
            .field("on_ready", &self.on_ready.is_some())
            .field("flags", &self.flags)
            .field("failure", &self.failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_unresolved() {
        let node = CompositionNode::new("card", "<div></div>");
        assert_eq!(node.id(), "card");
        assert_eq!(node.template(), "<div></div>");
        assert_eq!(node.state(), NodeState::Unresolved);
        assert!(node.children().is_empty());
        assert!(node.root().is_none());
        assert!(!node.has_ready_callback());
    }

    #[test]
    fn test_builder() {
        let d = Delimiters::new("[[", "]]").unwrap();
        let node = CompositionNode::new("list", "<ul>[[item]]</ul>")
            .with_delimiters(d.clone())
            .on_ready(|_ctx| {});
        assert_eq!(node.delimiters(), Some(&d));
        assert!(node.has_ready_callback());
        assert!(format!("{node:?}").contains("on_ready: true"));
    }
}
