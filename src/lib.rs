//! # spark-compose
//!
//! Compose UI components from markup templates, and let them talk through an
//! event bus.
//!
//! ## Architecture
//!
//! A component is a [`CompositionNode`]: a markup template that references
//! other nodes with `#{id}` tokens. Nodes are registered with a [`Composer`],
//! which resolves them post-order into one tree in its [`Document`] arena:
//!
//! ```text
//! template → token scan → children resolved → placeholders → parse → splice → ready callbacks
//! ```
//!
//! The [`EventBus`] is independent of composition; ready callbacks typically
//! capture it to wire listeners once the tree is in place.
//!
//! ## Modules
//!
//! - [`types`] - Delimiters, composer configuration, node lifecycle flags
//! - [`engine`] - Composition nodes, node registry, token scanner
//! - [`markup`] - Document arena, html5ever parser boundary, serializer
//! - [`pipeline`] - The composer: resolve, mount, initialize
//! - [`state`] - Event bus
//! - [`error`] - Error types

pub mod engine;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{CompositionError, ConfigError, EventError, MarkupError};

pub use engine::{
    find_next_token, scan_tokens, CompositionNode, NodeRegistry, ReadyCallback, ReadyContext,
    TokenScanner, TokenSpan,
};

pub use markup::{Document, DomId, DomKind, HtmlParser, MarkupParser};

pub use pipeline::Composer;

pub use state::{Cleanup, Delivery, Event, EventBus, Listener};
