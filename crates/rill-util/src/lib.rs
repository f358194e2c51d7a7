//! rill-util - Shared infrastructure for the rill interpreter.
//!
//! This crate hosts the pieces every other crate leans on:
//!
//! - [`span`] - byte ranges into a source buffer
//! - [`source`] - normalized source text with a lazy line index
//! - [`diagnostic`] - error/warning collection and rendering
//! - [`arena`] - bump allocator for the abstract syntax tree

pub mod arena;
pub mod diagnostic;
pub mod source;
pub mod span;

pub use arena::{Arena, ArenaStats};
pub use diagnostic::{Diagnostic, Handler, Level};
pub use source::{Source, SourceError};
pub use span::Span;
