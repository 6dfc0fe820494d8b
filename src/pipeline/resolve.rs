//! Resolution - turn a node's template and its referenced nodes into one tree.
//!
//! Post-order: every referenced node is resolved before the referencing
//! node's own markup is parsed. Tokens are rewritten at their scan position,
//! one placeholder per occurrence, then each placeholder element is replaced
//! by the referenced node's root.
//!
//! Failures below the node being resolved are recorded as diagnostics and
//! leave visible traces instead of aborting:
//! - unregistered id: the token text stays in the markup
//! - referenced node failed: its placeholder stays, empty
//! - cycle: empty placeholder, the id is not added to `children`
//!
//! A node whose markup does not parse keeps its original template and the
//! children found while scanning it. The failure is cached; later references
//! get the same error without another parse.

use crate::engine::scan_tokens;
use crate::error::CompositionError;
use crate::markup::{DomId, MarkupParser};
use crate::types::NodeFlags;
use super::composer::Composer;

impl<P: MarkupParser> Composer<P> {
    /// Resolve a node and run the ready callbacks of its subtree.
    ///
    /// Callbacks run before the caller gets the root, so they cannot rely on
    /// the root being attached to a host element. Use [`Composer::mount`] or
    /// [`Composer::assemble`] + [`Composer::initialize`] when they must.
    pub fn resolve(&mut self, id: &str) -> Result<DomId, CompositionError> {
        let root = self.assemble(id)?;
        self.initialize(id);
        Ok(root)
    }

    /// Resolve a node without running any ready callback.
    ///
    /// A node that is already resolved returns its existing root.
    pub fn assemble(&mut self, id: &str) -> Result<DomId, CompositionError> {
        self.resolve_node(id)
    }

    fn resolve_node(&mut self, id: &str) -> Result<DomId, CompositionError> {
        let Some(node) = self.registry.get_mut(id) else {
            return Err(CompositionError::UnregisteredNode { id: id.to_string() });
        };
        if let (true, Some(root)) = (node.is_resolved(), node.root) {
            return Ok(root);
        }
        if let (true, Some(source)) = (node.flags.contains(NodeFlags::FAILED), &node.failure) {
            tracing::debug!(id, "markup failed before, not parsing again");
            return Err(CompositionError::Markup { id: id.to_string(), source: source.clone() });
        }
        if node.flags.contains(NodeFlags::RESOLVING) {
            return Err(CompositionError::CyclicReference { id: id.to_string() });
        }
        node.flags.insert(NodeFlags::RESOLVING);

        let template = node.template.clone();
        let delimiters = node
            .delimiters
            .clone()
            .unwrap_or_else(|| self.config.delimiters().clone());

        tracing::debug!(id, "resolving node");

        // 1-2. Scan, resolve referenced nodes, rewrite tokens in place
        let mut expanded = String::with_capacity(template.len());
        let mut children = Vec::new();
        let mut occurrences: Vec<(String, Option<DomId>)> = Vec::new();
        let mut cursor = 0;

        for span in scan_tokens(&template, &delimiters) {
            expanded.push_str(&template[cursor..span.token.start]);
            cursor = span.token.end;
            let child_id = span.id_in(&template);

            if !self.registry.contains(child_id) {
                self.record(CompositionError::UnregisteredNode { id: child_id.to_string() });
                expanded.push_str(span.token_in(&template));
                continue;
            }

            let child_root = match self.resolve_node(child_id) {
                Ok(root) => Some(root),
                Err(err @ CompositionError::CyclicReference { .. }) => {
                    self.record(err);
                    expanded.push_str(&self.placeholder_markup(child_id));
                    continue;
                }
                Err(err) => {
                    self.record(CompositionError::UnresolvedChild {
                        parent: id.to_string(),
                        child: child_id.to_string(),
                        source: Box::new(err),
                    });
                    None
                }
            };

            expanded.push_str(&self.placeholder_markup(child_id));
            children.push(child_id.to_string());
            occurrences.push((child_id.to_string(), child_root));
        }
        expanded.push_str(&template[cursor..]);

        // 3. Parse the token-free markup
        let parsed = self.parser.parse(&mut self.document, &expanded);

        let Some(node) = self.registry.get_mut(id) else {
            return Err(CompositionError::UnregisteredNode { id: id.to_string() });
        };
        // Children are kept either way so initialization still reaches them
        node.children = children;
        let mut root = match parsed {
            Ok(root) => {
                node.template = expanded;
                root
            }
            Err(source) => {
                node.flags.remove(NodeFlags::RESOLVING);
                node.flags.insert(NodeFlags::FAILED);
                node.failure = Some(source.clone());
                tracing::error!(id, error = %source, "node markup failed to parse");
                return Err(CompositionError::Markup { id: id.to_string(), source });
            }
        };

        // 4. Replace placeholders with the referenced roots
        let placeholders = self.find_placeholders(root);
        let mut used = vec![false; placeholders.len()];

        for (child_id, child_root) in occurrences {
            let slot = placeholders
                .iter()
                .enumerate()
                .find(|(i, (_, slot_id))| !used[*i] && *slot_id == child_id)
                .map(|(i, (placeholder, _))| (i, *placeholder));

            let Some((index, placeholder)) = slot else {
                self.record(CompositionError::MissingPlaceholder {
                    parent: id.to_string(),
                    child: child_id,
                });
                continue;
            };
            used[index] = true;

            let Some(child_root) = child_root else {
                continue;
            };
            let subtree = self.claim_root(&child_id, child_root);
            if placeholder == root {
                root = subtree;
            } else {
                self.document.replace_with(placeholder, subtree);
            }
        }

        if let Some(node) = self.registry.get_mut(id) {
            node.root = Some(root);
            node.flags.remove(NodeFlags::RESOLVING);
            node.flags.insert(NodeFlags::RESOLVED);
        }
        tracing::debug!(id, ?root, "node resolved");
        Ok(root)
    }

    /// Root of `id` ready to be spliced: the root itself the first time, a
    /// deep copy once it already sits in some tree.
    fn claim_root(&mut self, id: &str, root: DomId) -> DomId {
        let already_placed = self.document.parent(root).is_some()
            || self
                .registry
                .get(id)
                .is_some_and(|node| node.flags.contains(NodeFlags::SPLICED));

        if already_placed {
            tracing::debug!(id, "node referenced again, splicing a copy");
            return self.document.clone_subtree(root);
        }
        if let Some(node) = self.registry.get_mut(id) {
            node.flags.insert(NodeFlags::SPLICED);
        }
        root
    }

    fn placeholder_markup(&self, child_id: &str) -> String {
        let escaped = child_id
            .replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;");
        format!(
            "<{tag} {attr}=\"{escaped}\"></{tag}>",
            tag = self.config.placeholder_tag(),
            attr = self.config.placeholder_attribute(),
        )
    }

    /// Placeholder elements under `root` (root included), in document order,
    /// with the id each one stands for.
    fn find_placeholders(&self, root: DomId) -> Vec<(DomId, String)> {
        let tag = self.config.placeholder_tag();
        let attr = self.config.placeholder_attribute();
        self.document
            .find_all(root, |node| self.document.tag(node) == Some(tag))
            .into_iter()
            .filter_map(|node| {
                self.document
                    .attribute(node, attr)
                    .map(|value| (node, value.to_string()))
            })
            .collect()
    }
}
