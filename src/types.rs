//! Core types for spark-compose.
//!
//! Delimiters, composer configuration and node lifecycle flags. These are
//! shared by the token scanner, the node registry and the composer.

use crate::error::ConfigError;

// =============================================================================
// Delimiters
// =============================================================================

/// Start and end markers that enclose a node reference inside a template.
///
/// Default is `#{` / `}`, so `#{header}` references the node `header`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    start: String,
    end: String,
}

impl Delimiters {
    /// Create a delimiter pair. Both markers must be non-empty.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ConfigError> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() {
            return Err(ConfigError::EmptyDelimiter { which: "start" });
        }
        if end.is_empty() {
            return Err(ConfigError::EmptyDelimiter { which: "end" });
        }
        Ok(Self { start, end })
    }

    /// The start marker.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// The end marker.
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Wrap an identifier in these delimiters, e.g. `c` -> `#{c}`.
    pub fn wrap(&self, id: &str) -> String {
        format!("{}{}{}", self.start, id, self.end)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start: "#{".to_string(),
            end: "}".to_string(),
        }
    }
}

// =============================================================================
// Composer Configuration
// =============================================================================

/// Configuration for a [`Composer`](crate::pipeline::Composer).
///
/// Placeholders are emitted as `<{placeholder_tag} {placeholder_attribute}="id">`
/// while a template is being assembled and are replaced by the referenced
/// node's root before resolution finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    delimiters: Delimiters,
    placeholder_tag: String,
    placeholder_attribute: String,
}

impl ComposerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delimiters used by nodes that do not set their own.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Tag name of placeholder elements, always lower-case.
    pub fn placeholder_tag(&self) -> &str {
        &self.placeholder_tag
    }

    /// Attribute carrying the referenced node id on a placeholder, always lower-case.
    pub fn placeholder_attribute(&self) -> &str {
        &self.placeholder_attribute
    }

    /// Set the default delimiters.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Set the placeholder element tag (lower-cased).
    pub fn with_placeholder_tag(mut self, tag: impl Into<String>) -> Self {
        self.placeholder_tag = tag.into().to_ascii_lowercase();
        self
    }

    /// Set the placeholder id attribute (lower-cased).
    pub fn with_placeholder_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.placeholder_attribute = attribute.into().to_ascii_lowercase();
        self
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            placeholder_tag: "lit-slot".to_string(),
            placeholder_attribute: "data-node".to_string(),
        }
    }
}

// =============================================================================
// Node Lifecycle (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle flags of a composition node.
    ///
    /// `RESOLVED` is terminal. `INITIALIZED` guarantees the ready callback
    /// runs at most once. `SPLICED` marks a root already placed into some
    /// parent tree; later references get a copy. `FAILED` marks markup that
    /// did not parse; the node is not parsed again.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE = 0;
        const RESOLVING = 1 << 0;
        const RESOLVED = 1 << 1;
        const INITIALIZING = 1 << 2;
        const INITIALIZED = 1 << 3;
        const SPLICED = 1 << 4;
        const FAILED = 1 << 5;
    }
}

/// Resolution state of a composition node, derived from [`NodeFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unresolved,
    Resolving,
    Resolved,
}

impl From<NodeFlags> for NodeState {
    fn from(flags: NodeFlags) -> Self {
        if flags.contains(NodeFlags::RESOLVED) {
            Self::Resolved
        } else if flags.contains(NodeFlags::RESOLVING) {
            Self::Resolving
        } else {
            Self::Unresolved
        }
    }
}
