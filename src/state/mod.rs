//! State Module - runtime signaling between components
//!
//! - **Events** - named events, listener sets, fault-isolated publish

mod events;

pub use events::*;
