#![forbid(unsafe_code)]

//! In-memory presentation tree for the joko runtime.
//!
//! This crate is the host side of the runtime's render contract:
//!
//! - [`Document`]: an arena-backed node tree supporting the operations the
//!   runtime needs — lookup by identifier, clear-children, insert, replace,
//!   remove, and attribute-based descendant queries.
//! - [`Document::parse_markup`]: parses a markup fragment into exactly one
//!   detached root node; [`Document::to_markup`] serializes a subtree back
//!   to text.
//! - [`Element`]: an optional structural builder (tag, attributes,
//!   children) with a serializer — a convenience independent of the
//!   reactive path.
//!
//! # Invariants
//!
//! 1. A node has at most one parent, and appears in that parent's child
//!    list exactly once.
//! 2. Detached nodes stay allocated but are unreachable from the document
//!    root; identifier lookup never returns them.
//! 3. `parse_markup` yields exactly one root element or an error — never a
//!    partial tree reachable from the root.

pub mod document;
pub mod element;
pub mod markup;

pub use document::{Document, DomError, NodeId};
pub use element::{Child, Element};
pub use markup::MarkupError;
