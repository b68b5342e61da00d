// SPDX-License-Identifier: Apache-2.0

//! Canonical pretty printer.
//!
//! Output uses 2 spaces per nesting level, one element or pair per line in
//! non-empty containers, commas after all but the last element, object keys
//! in ascending byte order, and `[]`/`{}` with no interior whitespace for
//! empty containers. Root records are separated by single newlines.
//!
//! Indentation depth is derived from the node's ancestry, so printing a
//! detached subtree starts at column 0. Each kind-specific printer is a
//! type error when handed a node of another kind.

use std::io::Write;

use crate::document::{Document, NodeId};
use crate::error::Error;
use crate::jestr;
use crate::kind::Kind;
use crate::node::Payload;
use crate::scanner::Scanner;
use crate::utf8;

impl Document {
    /// Renders the node to a string.
    pub fn to_text(&self, id: NodeId) -> Result<String, Error> {
        let mut out = Vec::new();
        node(&mut out, self, id)?;
        String::from_utf8(out)
            .map_err(|_| Error::parse_at(0, None, "Printed output is not valid UTF-8."))
    }
}

/// Nesting depth of a node: the count of its non-pair ancestors below the
/// root container.
fn depth(doc: &Document, mut id: NodeId) -> usize {
    let mut count = 0;
    while let Some(parent) = doc.parent(id) {
        if doc.kind(parent) == Kind::Root {
            break;
        }
        if doc.kind(id) != Kind::Pair {
            count += 1;
        }
        id = parent;
    }
    count
}

fn indent<W: Write>(out: &mut W, count: usize) -> Result<(), Error> {
    for _ in 0..count {
        out.write_all(b"  ")?;
    }
    Ok(())
}

/// Renders any node, dispatching on its kind.
pub fn node<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    match doc.kind(id) {
        Kind::Array => array(out, doc, id),
        Kind::Boolean => boolean(out, doc, id),
        Kind::Null => null(out, doc, id),
        Kind::Number => number(out, doc, id),
        Kind::Object => object(out, doc, id),
        Kind::Pair => pair(out, doc, id),
        Kind::Root => root(out, doc, id),
        Kind::String => string(out, doc, id),
    }
}

pub fn array<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    let items = match &doc.node(id).payload {
        Payload::Array(items) => items,
        other => return Err(Error::bad_type(other.kind(), "Array")),
    };
    let count = depth(doc, id);

    out.write_all(b"[")?;
    if !items.is_empty() {
        out.write_all(b"\n")?;
        for (index, &item) in items.iter().enumerate() {
            indent(out, count + 1)?;
            node(out, doc, item)?;
            if index + 1 != items.len() {
                out.write_all(b",")?;
            }
            out.write_all(b"\n")?;
        }
        indent(out, count)?;
    }
    out.write_all(b"]")?;
    Ok(())
}

pub fn object<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    let pairs = match &doc.node(id).payload {
        Payload::Object { pairs, .. } => pairs,
        other => return Err(Error::bad_type(other.kind(), "Object")),
    };
    let count = depth(doc, id);

    out.write_all(b"{")?;
    if !pairs.is_empty() {
        out.write_all(b"\n")?;
        for (index, &entry) in pairs.values().enumerate() {
            indent(out, count + 1)?;
            pair(out, doc, entry)?;
            if index + 1 != pairs.len() {
                out.write_all(b",")?;
            }
            out.write_all(b"\n")?;
        }
        indent(out, count)?;
    }
    out.write_all(b"}")?;
    Ok(())
}

pub fn pair<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    let (key, value) = match &doc.node(id).payload {
        Payload::Pair { key, value } => (key, *value),
        other => return Err(Error::bad_type(other.kind(), "Pair")),
    };
    let Some(value) = value else {
        return Err(Error::bad_type(Kind::Pair, "a Pair with an attached value"));
    };

    jestr::print(key, out)?;
    out.write_all(b": ")?;
    node(out, doc, value)
}

pub fn root<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    let items = match &doc.node(id).payload {
        Payload::Root(items) => items,
        other => return Err(Error::bad_type(other.kind(), "Root")),
    };

    for (index, &item) in items.iter().enumerate() {
        node(out, doc, item)?;
        if index + 1 != items.len() {
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn boolean<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    if doc.boolean_value(id)? {
        out.write_all(b"true")?;
    } else {
        out.write_all(b"false")?;
    }
    Ok(())
}

pub fn null<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    match &doc.node(id).payload {
        Payload::Null => {
            out.write_all(b"null")?;
            Ok(())
        }
        other => Err(Error::bad_type(other.kind(), "Null")),
    }
}

pub fn number<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    out.write_all(doc.number_literal(id)?.as_bytes())?;
    Ok(())
}

/// Renders a string node: the stored UTF-8 bytes are decoded and re-encoded
/// through the jestr codec, so escapes come out in canonical form.
pub fn string<W: Write>(out: &mut W, doc: &Document, id: NodeId) -> Result<(), Error> {
    let bytes = doc.string_bytes(id)?;
    let mut sc = Scanner::new(bytes);

    out.write_all(b"\"")?;
    while let Some(u) = utf8::decode(&mut sc)? {
        jestr::encode_char(u, sc.offset(), out)?;
    }
    out.write_all(b"\"")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_str(text: &str) -> String {
        let doc = Document::parse_str(text).unwrap();
        let root = doc.root().unwrap();
        doc.to_text(root).unwrap()
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(print_str("[]"), "[]");
        assert_eq!(print_str("{}"), "{}");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(print_str("true"), "true");
        assert_eq!(print_str("false"), "false");
        assert_eq!(print_str("null"), "null");
        assert_eq!(print_str("3.14"), "3.14");
        assert_eq!(print_str("\"hi\""), "\"hi\"");
    }

    #[test]
    fn test_array_block_layout() {
        assert_eq!(
            print_str(r#"[3.14, "", true, null]"#),
            "[\n  3.14,\n  \"\",\n  true,\n  null\n]"
        );
    }

    #[test]
    fn test_object_keys_sorted() {
        assert_eq!(
            print_str(r#"{"b":1,"a":2}"#),
            "{\n  \"a\": 2,\n  \"b\": 1\n}"
        );
    }

    #[test]
    fn test_nested_indentation() {
        assert_eq!(
            print_str(r#"{"a": [1, {"b": 2}]}"#),
            "{\n  \"a\": [\n    1,\n    {\n      \"b\": 2\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_string_escapes_canonical() {
        assert_eq!(print_str("\"a\\u000ab\""), "\"a\\nb\"");
        assert_eq!(print_str("\"\\u0001\""), "\"\\u0001\"");
        assert_eq!(print_str("\"\\/\""), "\"/\"");
    }

    #[test]
    fn test_subtree_prints_with_ancestry_indent() {
        let doc = Document::parse_str(r#"{"a": {"b": 1}}"#).unwrap();
        let outer = doc.array_get(doc.root().unwrap(), 0).unwrap();
        let pair = doc.object_get(outer, "a").unwrap().unwrap();
        let inner = doc.pair_value(pair).unwrap().unwrap();
        // The nested object indents one level when printed alone, since its
        // ancestry gives it depth 1.
        assert_eq!(doc.to_text(inner).unwrap(), "{\n    \"b\": 1\n  }");
    }

    #[test]
    fn test_wrong_kind_is_type_error() {
        let mut doc = Document::new();
        let b = doc.new_boolean(true).unwrap();
        let mut out = Vec::new();
        assert!(matches!(
            array(&mut out, &doc, b),
            Err(Error::Type { .. })
        ));
        assert!(matches!(null(&mut out, &doc, b), Err(Error::Type { .. })));
    }

    #[test]
    fn test_valueless_pair_is_type_error() {
        let mut doc = Document::new();
        let p = doc.new_pair("k", None).unwrap();
        let mut out = Vec::new();
        assert!(matches!(pair(&mut out, &doc, p), Err(Error::Type { .. })));
    }

    #[test]
    fn test_root_records_newline_separated() {
        let doc =
            Document::parse_root(&b"1\n[2]\n"[..], crate::KindSet::EXTENDED, true, None).unwrap();
        let root_id = doc.root().unwrap();
        assert_eq!(doc.to_text(root_id).unwrap(), "1\n[\n  2\n]");
    }
}
