#![forbid(unsafe_code)]

//! Reactive state container for the joko runtime.
//!
//! This crate provides the change-tracking primitives the component runtime
//! is built on:
//!
//! - [`Value`]: a dynamically-typed field value (primitive, list, or nested
//!   object).
//! - [`Change`]: the ephemeral notification passed to a listener when a
//!   tracked write actually changes a value.
//! - [`StateView`]: a reactive view over a shared field map that intercepts
//!   writes and notifies a change listener.
//!
//! # Architecture
//!
//! `StateView` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! A view is a cheap handle, not an owner: reading a nested object field
//! constructs a *new* view over the same underlying map with the same
//! listener, so a write at any depth notifies the single root listener.
//!
//! # Invariants
//!
//! 1. The listener fires exactly once per value-changing write and zero
//!    times for a write that stores an equal value.
//! 2. Notification is synchronous: the listener completes before the write
//!    call returns.
//! 3. List-valued fields are never wrapped; mutating list contents in place
//!    does not notify.
//! 4. Nested views share the underlying storage with their parent.

pub mod state;
pub mod value;

pub use state::{BoxError, Change, ChangeListener, StateView};
pub use value::{Fields, Value};
