//! Mount - attach a resolved tree to a host element and initialize it.
//!
//! Initialization is post-order: for each node, every referenced node's ready
//! callback runs first (in token order), then the node's own. A callback runs
//! at most once per node, however many times the node is referenced.
//!
//! # Example
//!
//! ```
//! use spark_compose::{Composer, CompositionNode};
//!
//! let mut composer = Composer::new();
//! composer.register(CompositionNode::new("app", "<div id=\"app\"></div>").on_ready(|ctx| {
//!     // The host is already in place here
//!     let body = ctx.root.and_then(|root| ctx.document.parent(root));
//!     assert!(body.is_some());
//! }));
//!
//! let body = composer.document_mut().create_element("body");
//! composer.mount("app", body).unwrap();
//! ```

use crate::engine::ReadyContext;
use crate::error::CompositionError;
use crate::markup::{DomId, MarkupParser};
use crate::types::NodeFlags;
use super::composer::Composer;

impl<P: MarkupParser> Composer<P> {
    /// Resolve `id`, append its root to `host`, then initialize.
    ///
    /// Ready callbacks see the tree already attached to `host`.
    pub fn mount(&mut self, id: &str, host: DomId) -> Result<DomId, CompositionError> {
        let root = self.assemble(id)?;
        self.document.append_child(host, root);
        tracing::debug!(id, ?host, "mounted node");
        self.initialize(id);
        Ok(root)
    }

    /// Run ready callbacks of `id`'s subtree, children first.
    ///
    /// Nodes already initialized are skipped. Attach the root to its host
    /// before calling this if callbacks walk up the tree.
    pub fn initialize(&mut self, id: &str) {
        let Some(node) = self.registry.get_mut(id) else {
            tracing::warn!(id, "cannot initialize unregistered node");
            return;
        };
        if node
            .flags
            .intersects(NodeFlags::INITIALIZING | NodeFlags::INITIALIZED)
        {
            return;
        }
        node.flags.insert(NodeFlags::INITIALIZING);
        let children = node.children.clone();

        for child in &children {
            self.initialize(child);
        }

        let Some(node) = self.registry.get_mut(id) else {
            return;
        };
        node.flags.remove(NodeFlags::INITIALIZING);
        node.flags.insert(NodeFlags::INITIALIZED);
        let callback = node.on_ready.take();
        let root = node.root;

        if let Some(callback) = callback {
            tracing::debug!(id, "running ready callback");
            callback(&mut ReadyContext {
                id,
                root,
                document: &mut self.document,
            });
        }
    }
}
