#![forbid(unsafe_code)]

//! Structural markup builder.
//!
//! [`Element`] is a convenience for components that prefer building their
//! render output structurally instead of via string formatting. It is
//! immutable once built (the builder consumes `self`) and has no lifecycle:
//! serialize it with [`Element::to_markup`] and let it drop. The reactive
//! path never depends on it.

use crate::markup::{VOID_TAGS, escape_attr, escape_text};

/// A child of an [`Element`]: text, a number, or a nested element.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Text(String),
    Int(i64),
    Float(f64),
    Node(Element),
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Child::Text(s.to_string())
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Child::Text(s)
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Int(n)
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Int(i64::from(n))
    }
}

impl From<f64> for Child {
    fn from(x: f64) -> Self {
        Child::Float(x)
    }
}

impl From<Element> for Child {
    fn from(el: Element) -> Self {
        Child::Node(el)
    }
}

/// A structural markup node: tag, attributes, ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute. Later writes of the same name win.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Append one child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Child::Text(text.into()))
    }

    /// Append several children.
    #[must_use]
    pub fn children<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Child>,
    {
        self.children.extend(items.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// Serialize to markup text, escaping text and attribute values.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        // Same shape the document serializer emits, so builder output
        // always satisfies the parser.
        if self.children.is_empty() && VOID_TAGS.contains(&self.tag.as_str()) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(&escape_text(text)),
                Child::Int(n) => out.push_str(&n.to_string()),
                Child::Float(x) => out.push_str(&x.to_string()),
                Child::Node(el) => el.write(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
