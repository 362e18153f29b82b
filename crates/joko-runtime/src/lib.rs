#![forbid(unsafe_code)]

//! Component lifecycle and mount/patch mechanism.
//!
//! This crate ties the reactive state container and the presentation tree
//! together:
//!
//! - [`Component`]: the capability a view implements — render to markup,
//!   plus optional lifecycle hooks and event handlers.
//! - [`App`]: the component host. Mounting renders the component into a
//!   host location; from then on every tracked state write synchronously
//!   re-renders, replaces the live subtree wholesale, rebinds declarative
//!   event handlers, and fires the update hook.
//!
//! # Architecture
//!
//! There is no diffing: an update replaces the component's entire live
//! node with a fresh parse of its render output. The state container's
//! change listener *is* the update routine; a write session fully resolves
//! (render → replace → rebind → hook) before control returns to the
//! writer. Single-threaded by construction (`Rc`/`Cell` throughout).
//!
//! # Invariants
//!
//! 1. After any completed update the host contains exactly one node: the
//!    fresh parse of the component's current render output.
//! 2. Event bindings are assigned, not appended — N updates never cause a
//!    handler to fire more than once per interaction.
//! 3. Hooks fire after the corresponding tree operation, except
//!    `on_unmount`, which observes the still-attached node.
//! 4. A failed mount inserts nothing anywhere.

pub mod app;
pub mod component;

pub use app::{App, RuntimeError};
pub use component::{Component, Event, EventKind, HandlerResult};
