//! HTML parser boundary - markup text into [`Document`] nodes.
//!
//! [`HtmlParser`] hands the markup to html5ever (through `scraper`) as a
//! whole HTML document and keeps the first element of `<body>`, the element
//! a browser `DOMParser` would give for the same text. Everything follows
//! the HTML5 tree-construction rules: implied end tags, foster parenting,
//! head-only elements such as a leading `<style>` or `<title>` moving into
//! `<head>` (and so out of the node's root).
//!
//! The composer talks to parsers through [`MarkupParser`], so another parser
//! can be swapped in.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::error::MarkupError;
use super::document::{Document, DomId};

// =============================================================================
// Parser Boundary
// =============================================================================

/// Turns a token-free markup string into document nodes.
pub trait MarkupParser {
    /// Parse `markup` into `document` and return its first top-level element.
    fn parse(&self, document: &mut Document, markup: &str) -> Result<DomId, MarkupError>;
}

/// Default parser: html5ever document parsing, first body element.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl MarkupParser for HtmlParser {
    fn parse(&self, document: &mut Document, markup: &str) -> Result<DomId, MarkupError> {
        let html = Html::parse_document(markup);
        if let Some(first) = html.errors.first() {
            tracing::trace!(count = html.errors.len(), first = %first, "recovered from markup errors");
        }

        let root = body(&html)
            .and_then(|body| body.children().find(|child| child.value().is_element()))
            .ok_or(MarkupError::NoRootElement)?;
        import(document, root).ok_or(MarkupError::NoRootElement)
    }
}

/// The `<body>` element of a parsed document.
fn body(html: &Html) -> Option<NodeRef<'_, Node>> {
    html.tree
        .root()
        .children()
        .find(|node| node.value().is_element())?
        .children()
        .find(|node| node.value().as_element().is_some_and(|el| el.name() == "body"))
}

// =============================================================================
// Import
// =============================================================================

/// Copy `node` and its subtree into `document`. Doctypes and processing
/// instructions have no counterpart and are skipped.
fn import(document: &mut Document, node: NodeRef<'_, Node>) -> Option<DomId> {
    let id = match node.value() {
        Node::Element(element) => {
            let id = document.create_element(element.name());
            for (name, value) in element.attrs() {
                document.set_attribute(id, name, value);
            }
            id
        }
        Node::Text(text) => document.create_text(&**text),
        Node::Comment(comment) => document.create_comment(&**comment),
        _ => return None,
    };
    import_children(document, id, node);
    Some(id)
}

fn import_children(document: &mut Document, parent: DomId, node: NodeRef<'_, Node>) {
    for child in node.children() {
        // <template> contents hang off a fragment node
        if child.value().is_fragment() {
            import_children(document, parent, child);
        } else if let Some(id) = import(document, child) {
            document.append_child(parent, id);
        }
    }
}
