#![forbid(unsafe_code)]

//! Reactive views over a shared field map.
//!
//! # Design
//!
//! [`StateView`] pairs shared storage (`Rc<RefCell<Fields>>`) with a change
//! listener. Writes go through [`StateView::set`], which performs change
//! detection and notifies the listener synchronously. Reads of nested
//! object values re-wrap the nested map in a fresh view carrying the same
//! listener — the wrapping is deliberately uncached and happens on every
//! access, so two reads of the same nested field yield distinct views over
//! identical storage.
//!
//! # Failure Modes
//!
//! - **Listener error**: propagated synchronously out of the `set` call.
//!   The write itself has already been applied when the listener runs.
//! - **Missing field**: reads return `None`; writes create the field. The
//!   container is permissive, not schema-validated.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::{Fields, Value};

/// Error type carried by listener results.
pub type BoxError = Box<dyn std::error::Error>;

/// Change listener invoked synchronously on every value-changing write.
pub type ChangeListener = Rc<dyn Fn(&Change) -> Result<(), BoxError>>;

/// Ephemeral notification describing one tracked write.
///
/// Not retained after the listener returns.
#[derive(Debug, Clone)]
pub struct Change {
    /// Name of the written field (the leaf name for nested writes).
    pub field: String,
    /// Previously stored value; `None` when the write created the field.
    pub old: Option<Value>,
    /// Newly stored value.
    pub new: Value,
    /// Shallow snapshot of the container the write went through, taken
    /// after the write was applied.
    pub state: Fields,
}

/// A reactive view over a shared field map.
///
/// Cloning a view (or re-reading a nested field) creates a new handle over
/// the **same** storage and listener.
#[derive(Clone)]
pub struct StateView {
    target: Rc<RefCell<Fields>>,
    listener: ChangeListener,
}

impl StateView {
    /// Create a view over a private copy of `initial`.
    pub fn new(
        initial: &Fields,
        listener: impl Fn(&Change) -> Result<(), BoxError> + 'static,
    ) -> Self {
        Self {
            target: Rc::new(RefCell::new(initial.clone())),
            listener: Rc::new(listener),
        }
    }

    /// Wrap existing shared storage with an existing listener.
    ///
    /// This is how nested views and the runtime's store-swapping are built;
    /// no copy is made.
    #[must_use]
    pub fn over(target: Rc<RefCell<Fields>>, listener: ChangeListener) -> Self {
        Self { target, listener }
    }

    /// Write a field, notifying the listener if the value actually changed.
    ///
    /// Storing a value equal to the current one is a no-op: no store, no
    /// notification, no re-render downstream. Writing to an absent field
    /// creates it (and counts as a change). The listener runs synchronously
    /// before this call returns; its error, if any, is propagated.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<(), BoxError> {
        let new = value.into();
        let old = {
            let mut fields = self.target.borrow_mut();
            let old = fields.get(field).cloned();
            if old.as_ref() == Some(&new) {
                return Ok(());
            }
            fields.insert(field.to_string(), new.clone());
            old
        };
        let change = Change {
            field: field.to_string(),
            old,
            new,
            state: self.target.borrow().clone(),
        };
        (self.listener)(&change)
    }

    /// Read the raw stored value. Absent fields read as `None`.
    ///
    /// List values come back as-is (no reactivity); for object values this
    /// returns the raw `Value::Map` — use [`StateView::nested`] to get a
    /// reactive view over it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.target.borrow().get(field).cloned()
    }

    /// Read a nested object field as a **new** reactive view.
    ///
    /// The returned view shares the nested map's storage and this view's
    /// listener, so a write at any depth notifies the root listener with
    /// the leaf field name. Re-wraps on every access: no memoization, and
    /// no identity guarantee between two reads of the same field. Returns
    /// `None` for absent or non-object values (lists are never wrapped).
    #[must_use]
    pub fn nested(&self, field: &str) -> Option<StateView> {
        match self.target.borrow().get(field) {
            Some(Value::Map(map)) => Some(StateView::over(
                Rc::clone(map),
                Rc::clone(&self.listener),
            )),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(|v| v.as_bool())
    }

    #[must_use]
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(|v| v.as_i64())
    }

    #[must_use]
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|v| v.as_f64())
    }

    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| match v {
            Value::Str(s) => s,
            other => other.display_text(),
        })
    }

    /// Whether the field currently exists.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.target.borrow().contains_key(field)
    }

    /// Shallow snapshot of the current fields.
    #[must_use]
    pub fn snapshot(&self) -> Fields {
        self.target.borrow().clone()
    }

    /// Whether two views wrap the same underlying storage.
    #[must_use]
    pub fn shares_target(&self, other: &StateView) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }

    /// The change listener carried by this view.
    #[must_use]
    pub fn listener(&self) -> ChangeListener {
        Rc::clone(&self.listener)
    }
}

impl std::fmt::Debug for StateView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateView")
            .field("fields", &*self.target.borrow())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
