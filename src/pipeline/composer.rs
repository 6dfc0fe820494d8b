//! Composer - the composition context.
//!
//! Owns everything one component tree needs: the node registry, the shared
//! document arena, the markup parser, configuration and the diagnostics
//! collected while resolving. Independent composers never see each other's
//! nodes.
//!
//! # Example
//!
//! ```
//! use spark_compose::{Composer, CompositionNode};
//!
//! let mut composer = Composer::new();
//! composer.register(CompositionNode::new("title", "<h1>Hello</h1>"));
//! composer.register(CompositionNode::new("page", "<main>#{title}</main>"));
//!
//! let root = composer.resolve("page").unwrap();
//! assert_eq!(composer.document().to_markup(root), "<main><h1>Hello</h1></main>");
//! ```

use crate::engine::{CompositionNode, NodeRegistry};
use crate::error::CompositionError;
use crate::markup::{Document, DomId, HtmlParser, MarkupParser};
use crate::types::ComposerConfig;

pub struct Composer<P = HtmlParser> {
    pub(crate) config: ComposerConfig,
    pub(crate) registry: NodeRegistry,
    pub(crate) document: Document,
    pub(crate) parser: P,
    pub(crate) diagnostics: Vec<CompositionError>,
}

impl Composer {
    /// Composer with the default configuration and the built-in [`HtmlParser`].
    pub fn new() -> Self {
        Self::with_config(ComposerConfig::default())
    }

    pub fn with_config(config: ComposerConfig) -> Self {
        Self::with_parser(config, HtmlParser)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: MarkupParser> Composer<P> {
    /// Composer using a custom markup parser.
    pub fn with_parser(config: ComposerConfig, parser: P) -> Self {
        Self {
            config,
            registry: NodeRegistry::new(),
            document: Document::new(),
            parser,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a node so templates can reference it. Returns the node that
    /// was registered under the same id before, if any.
    pub fn register(&mut self, node: CompositionNode) -> Option<CompositionNode> {
        tracing::debug!(id = %node.id, "registering node");
        self.registry.insert(node)
    }

    /// A fresh `node-N` id that is not registered yet.
    pub fn generate_id(&mut self) -> String {
        self.registry.generate_id()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn node(&self, id: &str) -> Option<&CompositionNode> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Root of a resolved node.
    pub fn root(&self, id: &str) -> Option<DomId> {
        self.registry.get(id).and_then(CompositionNode::root)
    }

    // =========================================================================
    // Document
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document, e.g. to create a host element to mount into.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Serialized markup of a resolved node's root.
    pub fn to_markup(&self, id: &str) -> Option<String> {
        self.root(id).map(|root| self.document.to_markup(root))
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Non-fatal errors recorded since the last `take_diagnostics`.
    pub fn diagnostics(&self) -> &[CompositionError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<CompositionError> {
        std::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn record(&mut self, error: CompositionError) {
        tracing::warn!(node = %error.node_id(), error = %error, "composition diagnostic");
        self.diagnostics.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut composer = Composer::new();
        assert!(composer.register(CompositionNode::new("a", "<p></p>")).is_none());
        assert!(composer.contains("a"));
        assert_eq!(composer.node("a").map(|n| n.template()), Some("<p></p>"));
        assert_eq!(composer.root("a"), None);
        assert_eq!(composer.to_markup("a"), None);
        assert_eq!(composer.registry().len(), 1);
    }

    #[test]
    fn test_composers_are_isolated() {
        let mut first = Composer::new();
        let second = Composer::new();
        first.register(CompositionNode::new("shared", "<p></p>"));
        assert!(first.contains("shared"));
        assert!(!second.contains("shared"));
    }

    #[test]
    fn test_generate_id() {
        let mut composer = Composer::new();
        let id = composer.generate_id();
        assert_eq!(id, "node-0");
        composer.register(CompositionNode::new(id, "<p></p>"));
        assert_eq!(composer.generate_id(), "node-1");
    }

    #[test]
    fn test_take_diagnostics() {
        let mut composer = Composer::new();
        composer.record(CompositionError::UnregisteredNode { id: "x".into() });
        assert_eq!(composer.diagnostics().len(), 1);
        assert_eq!(composer.take_diagnostics().len(), 1);
        assert!(composer.diagnostics().is_empty());
    }
}
