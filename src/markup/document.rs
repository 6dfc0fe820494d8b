//! Document - Arena of markup nodes.
//!
//! Every element, text and comment produced while composing lives in one
//! arena and is addressed by a [`DomId`]. Moving a subtree (splicing a child
//! into a parent) only rewires parent/children links; nodes are never freed,
//! detached nodes simply have no parent.
//!
//! A `DomId` is only meaningful for the document that created it.

// =============================================================================
// Types
// =============================================================================

/// Index of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomId(usize);

impl DomId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a document node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    kind: DomKind,
    parent: Option<DomId>,
    children: Vec<DomId>,
}

/// Arena-backed markup tree.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<DomNode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn push(&mut self, kind: DomKind) -> DomId {
        let id = DomId(self.nodes.len());
        self.nodes.push(DomNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element. The tag is lower-cased.
    pub fn create_element(&mut self, tag: &str) -> DomId {
        self.push(DomKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> DomId {
        self.push(DomKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> DomId {
        self.push(DomKind::Comment(text.into()))
    }

    // =========================================================================
    // Node Data
    // =========================================================================

    pub fn kind(&self, id: DomId) -> &DomKind {
        &self.nodes[id.0].kind
    }

    pub fn is_element(&self, id: DomId) -> bool {
        matches!(self.nodes[id.0].kind, DomKind::Element { .. })
    }

    /// Tag name, `None` for text and comment nodes.
    pub fn tag(&self, id: DomId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            DomKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// All attributes in source order. Empty for non-elements.
    pub fn attributes(&self, id: DomId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            DomKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: DomId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value. No-op on non-elements.
    pub fn set_attribute(&mut self, id: DomId, name: &str, value: impl Into<String>) {
        if let DomKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            let value = value.into();
            match attributes.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                Some(slot) => slot.1 = value,
                None => attributes.push((name.to_ascii_lowercase(), value)),
            }
        }
    }

    pub fn remove_attribute(&mut self, id: DomId, name: &str) -> Option<String> {
        if let DomKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            let pos = attributes.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))?;
            return Some(attributes.remove(pos).1);
        }
        None
    }

    // =========================================================================
    // Tree Structure
    // =========================================================================

    pub fn parent(&self, id: DomId) -> Option<DomId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: DomId) -> &[DomId] {
        &self.nodes[id.0].children
    }

    /// Children that are elements (skips text and comments).
    pub fn child_elements(&self, id: DomId) -> Vec<DomId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: DomId, id: DomId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes[node.0].parent;
        }
        false
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: DomId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    ///
    /// Returns false (and changes nothing) if `child` is `parent` or one of
    /// its ancestors.
    pub fn append_child(&mut self, parent: DomId, child: DomId) -> bool {
        if self.is_ancestor(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to append a node into its own subtree");
            return false;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Put `replacement` where `old` is, detaching `old`.
    ///
    /// Returns false if `old` has no parent or `replacement` contains `old`.
    pub fn replace_with(&mut self, old: DomId, replacement: DomId) -> bool {
        if old == replacement {
            return true;
        }
        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        if self.is_ancestor(replacement, parent) {
            return false;
        }
        self.detach(replacement);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };
        self.nodes[parent.0].children[pos] = replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Deep copy of a subtree. The copy is detached.
    pub fn clone_subtree(&mut self, id: DomId) -> DomId {
        let copy = self.push(self.nodes[id.0].kind.clone());
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: DomId) -> String {
        let mut out = String::new();
        for node in self.traverse(id) {
            if let DomKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node (or set the text of a
    /// text node).
    pub fn set_text_content(&mut self, id: DomId, text: impl Into<String>) {
        let text = text.into();
        match &mut self.nodes[id.0].kind {
            DomKind::Text(existing) | DomKind::Comment(existing) => {
                *existing = text;
                return;
            }
            DomKind::Element { .. } => {}
        }
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.nodes[text_node.0].parent = Some(id);
            self.nodes[id.0].children.push(text_node);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Pre-order walk of the subtree rooted at `root`, `root` included.
    pub fn traverse(&self, root: DomId) -> Vec<DomId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    /// First element in pre-order (root included) matching `pred`.
    pub fn find_element(&self, root: DomId, mut pred: impl FnMut(DomId) -> bool) -> Option<DomId> {
        self.traverse(root)
            .into_iter()
            .find(|&node| self.is_element(node) && pred(node))
    }

    /// All elements in pre-order (root included) matching `pred`.
    pub fn find_all(&self, root: DomId, mut pred: impl FnMut(DomId) -> bool) -> Vec<DomId> {
        self.traverse(root)
            .into_iter()
            .filter(|&node| self.is_element(node) && pred(node))
            .collect()
    }

    /// Element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, root: DomId, id: &str) -> Option<DomId> {
        self.find_element(root, |node| self.attribute(node, "id") == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Document, DomId, DomId, DomId) {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        let p = doc.create_element("p");
        let text = doc.create_text("hello");
        doc.append_child(div, p);
        doc.append_child(p, text);
        (doc, div, p, text)
    }

    #[test]
    fn test_create_and_append() {
        let (doc, div, p, text) = tree();
        assert_eq!(doc.tag(div), Some("div"));
        assert_eq!(doc.children(div), &[p]);
        assert_eq!(doc.parent(text), Some(p));
        assert_eq!(doc.tag(text), None);
        assert_eq!(doc.text_content(div), "hello");
    }

    #[test]
    fn test_attributes() {
        let mut doc = Document::new();
        let el = doc.create_element("a");
        doc.set_attribute(el, "HREF", "/x");
        assert_eq!(doc.attribute(el, "href"), Some("/x"));
        doc.set_attribute(el, "href", "/y");
        assert_eq!(doc.attributes(el).len(), 1);
        assert_eq!(doc.remove_attribute(el, "href").as_deref(), Some("/y"));
        assert_eq!(doc.attribute(el, "href"), None);
    }

    #[test]
    fn test_append_moves_node() {
        let (mut doc, div, p, _) = tree();
        let other = doc.create_element("section");
        assert!(doc.append_child(other, p));
        assert!(doc.children(div).is_empty());
        assert_eq!(doc.parent(p), Some(other));
    }

    #[test]
    fn test_append_rejects_cycle() {
        let (mut doc, div, p, _) = tree();
        assert!(!doc.append_child(p, div));
        assert_eq!(doc.parent(div), None);
    }

    #[test]
    fn test_replace_with() {
        let (mut doc, div, p, _) = tree();
        let span = doc.create_element("span");
        assert!(doc.replace_with(p, span));
        assert_eq!(doc.children(div), &[span]);
        assert_eq!(doc.parent(p), None);
        assert_eq!(doc.parent(span), Some(div));

        // Detached node cannot be replaced
        let lone = doc.create_element("b");
        let other = doc.create_element("i");
        assert!(!doc.replace_with(lone, other));
    }

    #[test]
    fn test_replace_with_sibling_keeps_position() {
        let mut doc = Document::new();
        let ul = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        let c = doc.create_element("li");
        doc.append_child(ul, a);
        doc.append_child(ul, b);
        doc.append_child(ul, c);

        assert!(doc.replace_with(b, a));
        assert_eq!(doc.children(ul), &[a, c]);
    }

    #[test]
    fn test_clone_subtree_is_deep_and_detached() {
        let (mut doc, div, p, _) = tree();
        let copy = doc.clone_subtree(div);
        assert_ne!(copy, div);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.text_content(copy), "hello");
        let copied_p = doc.children(copy)[0];
        assert_ne!(copied_p, p);
        assert_eq!(doc.parent(copied_p), Some(copy));
    }

    #[test]
    fn test_set_text_content() {
        let (mut doc, div, p, _) = tree();
        doc.set_text_content(div, "42");
        assert_eq!(doc.text_content(div), "42");
        assert_eq!(doc.parent(p), None);
        assert_eq!(doc.children(div).len(), 1);
    }

    #[test]
    fn test_queries() {
        let (mut doc, div, p, _) = tree();
        doc.set_attribute(p, "id", "greeting");
        assert_eq!(doc.element_by_id(div, "greeting"), Some(p));
        assert_eq!(doc.element_by_id(div, "missing"), None);
        assert_eq!(doc.traverse(div).len(), 3);
        assert_eq!(doc.find_all(div, |_| true), vec![div, p]);
        assert_eq!(doc.child_elements(div), vec![p]);
    }
}
