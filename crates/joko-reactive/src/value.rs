#![forbid(unsafe_code)]

//! Dynamically-typed field values.
//!
//! State fields are schemaless: a field may hold a primitive, a homogeneous
//! list, or a nested object. Lists and objects are reference-counted so a
//! nested view and its parent observe the same storage.
//!
//! # Equality
//!
//! [`PartialEq`] implements the strict-equality contract used for write
//! change detection: primitives compare by value (`Float` follows IEEE 754,
//! so `NaN != NaN`), while `List` and `Map` compare by *identity*
//! (`Rc::ptr_eq`). Rebuilding a structurally-equal object therefore counts
//! as a change, exactly like reassigning a fresh object literal would.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Named fields of an object value or of a state container.
///
/// `BTreeMap` keeps iteration deterministic, which snapshot-based tests
/// rely on.
pub type Fields = BTreeMap<String, Value>;

/// A single field value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A homogeneous sequence. Never wrapped reactively.
    List(Rc<RefCell<Vec<Value>>>),
    /// A nested object. Read through a view, it is re-wrapped reactively.
    Map(Rc<RefCell<Fields>>),
}

impl Value {
    /// Build a `List` value from any iterator of convertible items.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Build a `Map` value from `(name, value)` pairs.
    pub fn object<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Value::Map(Rc::new(RefCell::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`.
    ///
    /// `Int` magnitudes above 2^53 round to the nearest representable
    /// float; use [`Value::as_i64`] where exactness matters.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as display text (what a template would print).
    ///
    /// Strings render without quotes; lists and objects render in a debug
    /// shape that is stable but not meant for end users.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Identity, not structure: a rebuilt list or object is a new value.
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Build a [`Fields`] map from `(name, value)` pairs.
pub fn fields<I, K, T>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, T)>,
    K: Into<String>,
    T: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_equality_by_value() {
        assert_eq!(Value::from(3), Value::from(3));
        assert_eq!(Value::from("hi"), Value::from("hi".to_string()));
        assert_ne!(Value::from(3), Value::from(4));
        assert_ne!(Value::from(3), Value::from(3.0));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn container_equality_by_identity() {
        let a = Value::list([1, 2, 3]);
        let b = Value::list([1, 2, 3]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let m = Value::object([("x", 1)]);
        let n = Value::object([("x", 1)]);
        assert_ne!(m, n);
        assert_eq!(m, m.clone());
    }

    #[test]
    fn as_f64_widens_ints_with_rounding() {
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        // 2^53 + 1 has no exact f64 representation and rounds down.
        let big = (1i64 << 53) + 1;
        assert_eq!(Value::Int(big).as_f64(), Some(9_007_199_254_740_992.0));
        assert_eq!(Value::Int(big).as_i64(), Some(big));
    }

    #[test]
    fn display_text_renders_primitives_bare() {
        assert_eq!(Value::from("Leanne").display_text(), "Leanne");
        assert_eq!(Value::from(42).display_text(), "42");
        assert_eq!(Value::from(false).display_text(), "false");
        assert_eq!(Value::Null.display_text(), "null");
    }

    #[test]
    fn display_renders_containers() {
        assert_eq!(Value::list([1, 2]).display_text(), "[1, 2]");
        assert_eq!(Value::object([("a", 1)]).display_text(), "{a: 1}");
    }

    #[test]
    fn option_converts_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::from(7));
        assert!(!Value::from(Some(7)).is_null());
    }
}
