//! Composition engine - nodes, their registry and the token scanner.
//!
//! - Token: finds `#{id}` style references in a template
//! - CompositionNode: template, discovered children, root, ready callback
//! - NodeRegistry: id → node, owned by a composer

mod node;
mod registry;
mod token;

pub use node::*;
pub use registry::*;
pub use token::*;
