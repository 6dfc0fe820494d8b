//! Token Scanner - locates delimiter-enclosed node references in a template.
//!
//! No nesting: the id is whatever sits between the start marker and the first
//! end marker after it. An unterminated token ends the scan.

use std::ops::Range;

use crate::types::Delimiters;

/// Byte ranges of one token inside the scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    /// The whole token, delimiters included.
    pub token: Range<usize>,
    /// The id strictly between the delimiters.
    pub id: Range<usize>,
}

impl TokenSpan {
    /// The id text of this token in `s`.
    pub fn id_in<'s>(&self, s: &'s str) -> &'s str {
        &s[self.id.clone()]
    }

    /// The full token text in `s`.
    pub fn token_in<'s>(&self, s: &'s str) -> &'s str {
        &s[self.token.clone()]
    }
}

/// Find the first token starting at or after byte `from`.
///
/// Returns `None` when there is no start marker, when the start marker has no
/// end marker after it, or when `from` is out of range.
pub fn find_next_token(s: &str, from: usize, delimiters: &Delimiters) -> Option<TokenSpan> {
    let rest = s.get(from..)?;
    let start = from + rest.find(delimiters.start())?;
    let id_start = start + delimiters.start().len();
    let id_end = id_start + s[id_start..].find(delimiters.end())?;
    Some(TokenSpan {
        token: start..id_end + delimiters.end().len(),
        id: id_start..id_end,
    })
}

/// Iterator over successive tokens of a string.
///
/// Each search resumes just past the previous token's end marker.
pub struct TokenScanner<'a> {
    source: &'a str,
    delimiters: &'a Delimiters,
    cursor: usize,
}

impl Iterator for TokenScanner<'_> {
    type Item = TokenSpan;

    fn next(&mut self) -> Option<TokenSpan> {
        let span = find_next_token(self.source, self.cursor, self.delimiters)?;
        self.cursor = span.token.end;
        Some(span)
    }
}

/// Scan all tokens of `source`.
pub fn scan_tokens<'a>(source: &'a str, delimiters: &'a Delimiters) -> TokenScanner<'a> {
    TokenScanner {
        source,
        delimiters,
        cursor: 0,
    }
}
