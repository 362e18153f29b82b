#![forbid(unsafe_code)]

//! Markup fragment parser and serializer.
//!
//! The runtime's render contract is a markup string that must parse to
//! **exactly one** root element. This parser accepts the small HTML-ish
//! grammar templates actually use:
//!
//! - elements `<tag attr="v">…</tag>`, self-closing `<tag/>`
//! - void elements (`br`, `hr`, `img`, `input`, `meta`) without a close tag
//! - single- or double-quoted attribute values, bare boolean attributes
//! - text with the entities `&amp; &lt; &gt; &quot; &#39;`
//! - comments `<!-- … -->` (skipped)
//!
//! # Failure Modes
//!
//! Spec-level configuration errors: empty output ([`MarkupError::NoRoot`]),
//! several top-level siblings ([`MarkupError::MultipleRoots`]), top-level
//! text, unclosed or mismatched tags. Parsing never leaves a partial tree
//! attached: nodes are allocated detached and only the finished root is
//! handed back.

use tracing::debug;

use crate::document::{Document, NodeId, NodeKind};

/// Tags that take no children and no closing tag.
pub(crate) const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// Parse errors for render output.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("render output contained no root element")]
    NoRoot,

    #[error("render output contained multiple root elements")]
    MultipleRoots,

    #[error("unclosed element <{tag}>")]
    UnclosedTag { tag: String },

    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClose { expected: String, found: String },

    #[error("markup syntax error at byte {pos}: {message}")]
    Syntax { pos: usize, message: String },
}

impl Document {
    /// Parse a markup fragment into exactly one detached root element.
    ///
    /// The returned node (and its subtree) is allocated in this document's
    /// arena but not attached anywhere; the caller decides where it goes.
    pub fn parse_markup(&mut self, source: &str) -> Result<NodeId, MarkupError> {
        let mut parser = Parser {
            doc: self,
            src: source,
            pos: 0,
        };
        let result = parser.parse_fragment();
        if let Err(err) = &result {
            debug!(%err, "markup parse failed");
        }
        result
    }

    /// Serialize the subtree rooted at `id` back to markup text.
    #[must_use]
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                let children = self.children(id);
                if children.is_empty() && VOID_TAGS.contains(&tag.as_str()) {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Escape text content for serialization.
#[must_use]
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape an attribute value for serialization.
#[must_use]
pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let mut matched = false;
        for (entity, ch) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&#39;", '\''),
            ("&apos;", '\''),
        ] {
            if let Some(tail) = rest.strip_prefix(entity) {
                out.push(ch);
                rest = tail;
                matched = true;
                break;
            }
        }
        if !matched {
            // Unknown entity: keep the ampersand literally.
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

struct Parser<'a, 'd> {
    doc: &'d mut Document,
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a, '_> {
    fn parse_fragment(&mut self) -> Result<NodeId, MarkupError> {
        let mut root = None;
        loop {
            self.skip_whitespace_and_comments();
            if self.at_end() {
                break;
            }
            if !self.peek_is('<') {
                return Err(MarkupError::Syntax {
                    pos: self.pos,
                    message: "text outside the root element".to_string(),
                });
            }
            if self.rest().starts_with("</") {
                return Err(MarkupError::Syntax {
                    pos: self.pos,
                    message: "closing tag without an open element".to_string(),
                });
            }
            let node = self.parse_element()?;
            if root.is_some() {
                return Err(MarkupError::MultipleRoots);
            }
            root = Some(node);
        }
        root.ok_or(MarkupError::NoRoot)
    }

    fn parse_element(&mut self) -> Result<NodeId, MarkupError> {
        self.expect('<')?;
        let tag = self.read_name("tag name")?;

        let node = self.doc.create_element(&tag);
        let mut self_closing = false;
        loop {
            self.skip_ws();
            if self.take("/>") {
                self_closing = true;
                break;
            }
            if self.take(">") {
                break;
            }
            if self.at_end() {
                return Err(MarkupError::UnclosedTag { tag });
            }
            let (name, value) = self.parse_attribute()?;
            self.doc.set_attr(node, &name, &value);
        }

        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            return Ok(node);
        }

        // Children until the matching close tag.
        loop {
            if self.at_end() {
                return Err(MarkupError::UnclosedTag { tag });
            }
            if self.rest().starts_with("<!--") {
                self.skip_comment();
                continue;
            }
            if self.rest().starts_with("</") {
                self.pos += 2;
                let found = self.read_name("closing tag name")?;
                self.skip_ws();
                self.expect('>')?;
                if found != tag {
                    return Err(MarkupError::MismatchedClose {
                        expected: tag,
                        found,
                    });
                }
                return Ok(node);
            }
            if self.peek_is('<') {
                let child = self.parse_element()?;
                self.doc.append_child(node, child);
                continue;
            }
            let text = self.read_text_run();
            if !text.is_empty() {
                let child = self.doc.create_text(&text);
                self.doc.append_child(node, child);
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<(String, String), MarkupError> {
        let name = self.read_name("attribute name")?;
        self.skip_ws();
        if !self.take("=") {
            // Bare boolean attribute.
            return Ok((name, String::new()));
        }
        self.skip_ws();
        let quote = match self.next_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(MarkupError::Syntax {
                    pos: self.pos,
                    message: format!("expected quoted value for attribute `{name}`"),
                });
            }
        };
        self.pos += 1;
        let rest = self.rest();
        let Some(end) = rest.find(quote) else {
            return Err(MarkupError::Syntax {
                pos: self.pos,
                message: format!("unterminated value for attribute `{name}`"),
            });
        };
        let raw = &rest[..end];
        self.pos += end + 1;
        Ok((name, decode_entities(raw)))
    }

    fn read_name(&mut self, what: &str) -> Result<String, MarkupError> {
        let start = self.pos;
        let rest = self.rest();
        let len = rest
            .char_indices()
            .take_while(|&(i, ch)| {
                if i == 0 {
                    ch.is_ascii_alphabetic()
                } else {
                    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')
                }
            })
            .count();
        if len == 0 {
            return Err(MarkupError::Syntax {
                pos: start,
                message: format!("expected {what}"),
            });
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn read_text_run(&mut self) -> String {
        let rest = self.rest();
        let end = rest.find('<').unwrap_or(rest.len());
        let raw = &rest[..end];
        self.pos += end;
        decode_entities(raw)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_ws();
            if self.rest().starts_with("<!--") {
                self.skip_comment();
            } else {
                return;
            }
        }
    }

    fn skip_comment(&mut self) {
        // Unterminated comments swallow the rest of the input.
        match self.rest().find("-->") {
            Some(end) => self.pos += end + 3,
            None => self.pos = self.src.len(),
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn next_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_is(&self, ch: char) -> bool {
        self.next_char() == Some(ch)
    }

    fn take(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), MarkupError> {
        if self.peek_is(ch) {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(MarkupError::Syntax {
                pos: self.pos,
                message: format!("expected `{ch}`"),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
