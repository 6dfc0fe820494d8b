//! Markup - element arena, HTML parser boundary and serializer.
//!
//! The composer hands token-free template markup to a [`MarkupParser`] and
//! gets back the root of a subtree in the shared [`Document`]. Splicing,
//! queries and serialization all work on [`DomId`] indices.

mod document;
mod parser;
mod serialize;

pub use document::{Document, DomId, DomKind};
pub use parser::{HtmlParser, MarkupParser};

/// Elements that never have children or a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are written back unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}
