//! Composition pipeline.
//!
//! ```text
//! register nodes → assemble (scan, resolve children, parse, splice) → attach → initialize
//! ```
//!
//! - [`Composer`] - the context owning registry, document and diagnostics
//! - resolve: `resolve`, `assemble`
//! - mount: `mount`, `initialize`

mod composer;
mod mount;
mod resolve;

pub use composer::Composer;
