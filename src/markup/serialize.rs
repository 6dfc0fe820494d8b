//! Markup serialization (outer markup of a subtree).

use super::document::{Document, DomId, DomKind};
use super::{is_raw_text_element, is_void_element};

impl Document {
    /// Serialize the subtree rooted at `id`, `id` included.
    pub fn to_markup(&self, id: DomId) -> String {
        let mut out = String::new();
        self.write_markup(id, false, &mut out);
        out
    }

    /// Serialize only the children of `id`.
    pub fn inner_markup(&self, id: DomId) -> String {
        let raw = self.tag(id).is_some_and(is_raw_text_element);
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_markup(child, raw, &mut out);
        }
        out
    }

    fn write_markup(&self, id: DomId, raw_text: bool, out: &mut String) {
        match self.kind(id) {
            DomKind::Text(text) if raw_text => out.push_str(text),
            DomKind::Text(text) => escape_into(text, false, out),
            DomKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            DomKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                let raw = is_raw_text_element(tag);
                for &child in self.children(id) {
                    self.write_markup(child, raw, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
