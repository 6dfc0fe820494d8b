//! Error types.
//!
//! Nothing here is fatal to the process. Composition errors are recorded as
//! diagnostics on the composer and logged; event errors are returned to the
//! caller and logged.

use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{which} delimiter must not be empty")]
    EmptyDelimiter { which: &'static str },
}

/// Failure reported by a markup parser.
///
/// HTML parsing itself recovers from every syntax error, so the only
/// failure left is markup whose body holds no element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("markup contains no element")]
    NoRootElement,
}

/// Failure while resolving a composition node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// A token references an id that no node was registered under.
    #[error("node `{id}` is not registered")]
    UnregisteredNode { id: String },

    /// A referenced node did not produce a root.
    #[error("node `{child}` referenced by `{parent}` did not resolve")]
    UnresolvedChild {
        parent: String,
        child: String,
        #[source]
        source: Box<CompositionError>,
    },

    /// A token references a node that is still being resolved.
    #[error("node `{id}` references itself through its own subtree")]
    CyclicReference { id: String },

    /// The placeholder emitted for a token was not an element of the parsed tree,
    /// e.g. the token sat inside an attribute value or a `<style>` block.
    #[error("no placeholder for node `{child}` in the markup of `{parent}`")]
    MissingPlaceholder { parent: String, child: String },

    /// The node's expanded template could not be parsed.
    #[error("markup of node `{id}` failed to parse")]
    Markup {
        id: String,
        #[source]
        source: MarkupError,
    },
}

impl CompositionError {
    /// Id of the node the error is about.
    pub fn node_id(&self) -> &str {
        match self {
            Self::UnregisteredNode { id } | Self::CyclicReference { id } | Self::Markup { id, .. } => {
                id
            }
            Self::UnresolvedChild { child, .. } | Self::MissingPlaceholder { child, .. } => child,
        }
    }
}

/// Failure of an event bus operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event `{name}` is not registered")]
    UnregisteredEvent { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CompositionError::UnregisteredNode { id: "nav".into() };
        assert_eq!(err.to_string(), "node `nav` is not registered");

        let err = EventError::UnregisteredEvent { name: "X".into() };
        assert_eq!(err.to_string(), "event `X` is not registered");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = CompositionError::UnresolvedChild {
            parent: "main".into(),
            child: "card".into(),
            source: Box::new(CompositionError::Markup {
                id: "card".into(),
                source: MarkupError::NoRootElement,
            }),
        };
        assert_eq!(err.node_id(), "card");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("markup of node `card` failed to parse"));
    }
}
