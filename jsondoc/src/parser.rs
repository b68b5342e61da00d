// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent structural parsers.
//!
//! Each parser is a small automaton keyed on the next input byte: skip
//! whitespace, dispatch to the matching leaf or structural parser on a
//! value-start byte (`[ { " - 0-9 t f n`), and track the comma state so a
//! close right after a trailing comma is rejected. Parsed children are
//! inserted through the mutation engine, so the validation hook observes
//! containers as they grow.
//!
//! On any error the partially built subtree is released before the error
//! propagates; no partial nodes leak into the final tree.

use std::io::Read;
use std::rc::Rc;

use log::debug;

use crate::document::{Document, NodeId};
use crate::error::Error;
use crate::hook::Hook;
use crate::jestr;
use crate::kind::{Kind, KindSet};
use crate::node::Payload;
use crate::number;
use crate::scanner::Scanner;
use crate::utf8;

impl Document {
    /// Parses a stream of one or more top-level JSON values into a new
    /// document.
    ///
    /// `kinds` restricts which value kinds may appear at the top level;
    /// a value outside the mask is a parse error. In non-continuous mode
    /// exactly one value is read (surrounded by optional whitespace) and
    /// scanning stops at the first carriage return or newline after it. In
    /// continuous mode a carriage return or newline re-arms scanning for
    /// the next value, so newline-separated streams ("JSON lines") parse
    /// into one record per line; runs of space or tab alone never separate
    /// records.
    ///
    /// The hook bundle, if given, is inherited by every node in the
    /// document.
    pub fn parse_root<R: Read>(
        reader: R,
        kinds: KindSet,
        continuous: bool,
        hook: Option<Rc<dyn Hook>>,
    ) -> Result<Document, Error> {
        let mut doc = Document::with_hook(hook);
        let mut sc = Scanner::new(reader);
        let root = doc.alloc(Kind::Root, None);
        match root_body(&mut doc, &mut sc, root, kinds, continuous) {
            Ok(()) => {
                doc.set_root(root);
                Ok(doc)
            }
            Err(err) => {
                doc.release(root);
                Err(err)
            }
        }
    }

    /// Parses exactly one JSON value of any kind from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        Document::parse_root(text.as_bytes(), KindSet::EXTENDED, false, None)
    }
}

/// The value kind announced by a lookahead byte, with the phrase used in
/// root kind-mask diagnostics.
fn kind_for_byte(byte: u8) -> Option<(Kind, &'static str)> {
    match byte {
        b'[' => Some((Kind::Array, "an array")),
        b'{' => Some((Kind::Object, "an object")),
        b'"' => Some((Kind::String, "a string")),
        b'-' | b'0'..=b'9' => Some((Kind::Number, "a number")),
        b't' | b'f' => Some((Kind::Boolean, "a boolean")),
        b'n' => Some((Kind::Null, "a null")),
        _ => None,
    }
}

fn root_body<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    root: NodeId,
    kinds: KindSet,
    continuous: bool,
) -> Result<(), Error> {
    let mut expect_value = true;
    let mut records = 0usize;

    loop {
        let Some(byte) = sc.peek()? else { break };

        if expect_value {
            match byte {
                b'\t' | b' ' | b'\r' | b'\n' => {
                    sc.next()?;
                }
                _ => match kind_for_byte(byte) {
                    Some((kind, phrase)) => {
                        if !kinds.contains(kind) {
                            sc.next()?;
                            return Err(Error::parse_at(
                                sc.offset(),
                                Some(byte),
                                format!("Found {phrase}, but it is not a valid type for a bare item."),
                            ));
                        }
                        let child = parse_value(doc, sc, root)?;
                        root_append(doc, root, child);
                        records += 1;
                        expect_value = false;
                    }
                    None => {
                        sc.next()?;
                        return Err(Error::parse_at(
                            sc.offset(),
                            Some(byte),
                            "Expecting a JSON value.",
                        ));
                    }
                },
            }
        } else {
            match byte {
                b'\t' | b' ' => {
                    sc.next()?;
                }
                // Only a carriage return or newline re-arms scanning.
                b'\r' | b'\n' => {
                    sc.next()?;
                    if continuous {
                        expect_value = true;
                    } else {
                        break;
                    }
                }
                _ => {
                    sc.next()?;
                    return Err(Error::parse_at(
                        sc.offset(),
                        Some(byte),
                        "Expecting a record separator before the next value.",
                    ));
                }
            }
        }
    }

    debug!("parsed {records} top-level record(s)");
    Ok(())
}

/// Appends a parsed value to the root container. Root insertion during a
/// parse bypasses the validation hook; each child has already been
/// validated as it finished parsing.
fn root_append(doc: &mut Document, root: NodeId, child: NodeId) {
    if let Payload::Root(items) = &mut doc.node_mut(root).payload {
        items.push(child);
    }
    doc.node_mut(child).parent = Some(root);
}

/// Dispatches to the parser matching the lookahead byte. The stream must be
/// positioned at a value-start byte.
pub(crate) fn parse_value<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    match sc.peek()? {
        Some(b'[') => parse_array(doc, sc, parent),
        Some(b'{') => parse_object(doc, sc, parent),
        Some(b'"') => parse_string(doc, sc, parent),
        Some(b'-') | Some(b'0'..=b'9') => parse_number(doc, sc, parent),
        Some(b't') | Some(b'f') => parse_boolean(doc, sc, parent),
        Some(b'n') => parse_null(doc, sc, parent),
        Some(byte) => {
            sc.next()?;
            Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Expecting to find a JSON type to parse.",
            ))
        }
        None => Err(Error::parse_at(
            sc.offset(),
            None,
            "Expecting more data; Failed to find a JSON type to parse.",
        )),
    }
}

fn parse_array<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Array, Some(parent));
    match array_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn array_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    match sc.next()? {
        Some(b'[') => {}
        byte => {
            return Err(Error::parse_at(
                sc.offset(),
                byte,
                "Unable to find array to parse; Expecting '['.",
            ))
        }
    }

    let mut item_since_comma = false;
    let mut continued = false;
    loop {
        let Some(byte) = sc.peek()? else {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Incomplete array.",
            ));
        };

        match byte {
            b'\t' | b' ' | b'\r' | b'\n' => {
                sc.next()?;
            }
            b',' => {
                sc.next()?;
                if !item_since_comma {
                    return Err(Error::parse_at(
                        sc.offset(),
                        Some(byte),
                        "Array value was not specified.",
                    ));
                }
                item_since_comma = false;
                continued = true;
            }
            b']' => {
                sc.next()?;
                if continued && !item_since_comma {
                    return Err(Error::parse_at(
                        sc.offset(),
                        Some(byte),
                        "Array value was not specified.",
                    ));
                }
                return doc.run_validator(id);
            }
            b'[' | b'{' | b'"' | b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                let child = parse_value(doc, sc, id)?;
                if let Err(err) = doc.array_append(id, child) {
                    doc.release(child);
                    return Err(err);
                }
                item_since_comma = true;
            }
            _ => {
                sc.next()?;
                return Err(Error::parse_at(
                    sc.offset(),
                    Some(byte),
                    "Expecting to find a JSON type to parse.",
                ));
            }
        }
    }
}

fn parse_object<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Object, Some(parent));
    match object_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn object_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    match sc.next()? {
        Some(b'{') => {}
        byte => {
            return Err(Error::parse_at(
                sc.offset(),
                byte,
                "Unable to find object to parse; Expecting '{'.",
            ))
        }
    }

    let mut pair_since_comma = false;
    let mut continued = false;
    loop {
        let Some(byte) = sc.peek()? else {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Incomplete object.",
            ));
        };

        match byte {
            b'\t' | b' ' | b'\r' | b'\n' => {
                sc.next()?;
            }
            b',' => {
                sc.next()?;
                if !pair_since_comma {
                    return Err(Error::parse_at(
                        sc.offset(),
                        Some(byte),
                        "Expecting to find a JSON key/value pair to parse.",
                    ));
                }
                pair_since_comma = false;
                continued = true;
            }
            b'}' => {
                sc.next()?;
                if continued && !pair_since_comma {
                    return Err(Error::parse_at(
                        sc.offset(),
                        Some(byte),
                        "Expecting to find a JSON key/value pair to parse.",
                    ));
                }
                return doc.run_validator(id);
            }
            b'"' => {
                let pair = parse_pair(doc, sc, id)?;
                match doc.object_set(id, pair) {
                    Ok(None) => {
                        pair_since_comma = true;
                    }
                    Ok(Some(displaced)) => {
                        let key = doc.pair_key(displaced)?.to_owned();
                        doc.release(displaced);
                        return Err(Error::parse_at(
                            sc.offset(),
                            None,
                            format!("Invalid duplicate key: \"{key}\"."),
                        ));
                    }
                    Err(err) => {
                        doc.release(pair);
                        return Err(err);
                    }
                }
            }
            _ => {
                sc.next()?;
                return Err(Error::parse_at(
                    sc.offset(),
                    Some(byte),
                    "Expecting to find a JSON key/value pair to parse.",
                ));
            }
        }
    }
}

fn parse_pair<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Pair, Some(parent));
    match pair_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn pair_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    let key = jestr::scan(sc)?;

    // Whitespace, then the ':' separating key from value.
    loop {
        let Some(byte) = sc.peek()? else {
            return Err(incomplete_pair(sc.offset(), &key));
        };
        match byte {
            b'\t' | b' ' | b'\r' | b'\n' => {
                sc.next()?;
            }
            b':' => {
                sc.next()?;
                break;
            }
            _ => {
                sc.next()?;
                return Err(Error::parse_at(
                    sc.offset(),
                    Some(byte),
                    "Expecting ':' between the pair key and value.",
                ));
            }
        }
    }

    // Whitespace, then the value.
    loop {
        let Some(byte) = sc.peek()? else {
            return Err(incomplete_pair(sc.offset(), &key));
        };
        match byte {
            b'\t' | b' ' | b'\r' | b'\n' => {
                sc.next()?;
            }
            b'[' | b'{' | b'"' | b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                let value = parse_value(doc, sc, id)?;
                doc.node_mut(id).payload = Payload::Pair {
                    key: key.into_boxed_str(),
                    value: Some(value),
                };
                return doc.run_validator(id);
            }
            _ => {
                sc.next()?;
                return Err(Error::parse_at(
                    sc.offset(),
                    Some(byte),
                    "Expecting to find a JSON type to parse for pair data.",
                ));
            }
        }
    }
}

fn incomplete_pair(offset: u64, key: &str) -> Error {
    Error::parse_at(
        offset,
        None,
        format!("Expecting more data; Incomplete pair (missing data for '{key}')."),
    )
}

fn parse_boolean<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Boolean, Some(parent));
    match boolean_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn boolean_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    let value = match sc.next()? {
        Some(b't') => {
            expect_chars(sc, "true", b"rue")?;
            true
        }
        Some(b'f') => {
            expect_chars(sc, "false", b"alse")?;
            false
        }
        Some(byte) => {
            return Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Expecting either 't' or 'f' to begin parsing 'true' or 'false'.",
            ))
        }
        None => {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Failed to find boolean to parse.",
            ))
        }
    };

    doc.node_mut(id).payload = Payload::Boolean(value);
    doc.run_validator(id)
}

fn parse_null<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Null, Some(parent));
    match null_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn null_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    match sc.next()? {
        Some(b'n') => expect_chars(sc, "null", b"ull")?,
        Some(byte) => {
            return Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Expecting 'n' to begin parsing 'null'.",
            ))
        }
        None => {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Failed to find null to parse.",
            ))
        }
    }
    doc.run_validator(id)
}

/// Matches the remaining characters of a literal keyword, naming the
/// expected character on mismatch.
fn expect_chars<R: Read>(
    sc: &mut Scanner<R>,
    context: &'static str,
    rest: &[u8],
) -> Result<(), Error> {
    for &want in rest {
        match sc.next()? {
            Some(byte) if byte == want => {}
            byte => {
                return Err(Error::parse_at(
                    sc.offset(),
                    byte,
                    format!("Parsing '{context}': Expecting '{}'.", want as char),
                ))
            }
        }
    }
    Ok(())
}

fn parse_number<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::Number, Some(parent));
    match number::scan_literal(sc) {
        Ok(literal) => {
            doc.node_mut(id).payload = Payload::Number(literal);
            match doc.run_validator(id) {
                Ok(()) => Ok(id),
                Err(err) => {
                    doc.release(id);
                    Err(err)
                }
            }
        }
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn parse_string<R: Read>(
    doc: &mut Document,
    sc: &mut Scanner<R>,
    parent: NodeId,
) -> Result<NodeId, Error> {
    let id = doc.alloc(Kind::String, Some(parent));
    match string_body(doc, sc, id) {
        Ok(()) => Ok(id),
        Err(err) => {
            doc.release(id);
            Err(err)
        }
    }
}

fn string_body<R: Read>(doc: &mut Document, sc: &mut Scanner<R>, id: NodeId) -> Result<(), Error> {
    match sc.peek()? {
        Some(b'"') => {
            sc.next()?;
        }
        Some(byte) => {
            sc.next()?;
            return Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Failed to find string to parse; Expecting '\"'.",
            ));
        }
        None => {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Failed to find string to parse.",
            ))
        }
    }

    let mut bytes = Vec::new();
    loop {
        match sc.peek()? {
            None => {
                return Err(Error::parse_at(
                    sc.offset(),
                    None,
                    "Expecting more data; Failed to find end of string.",
                ))
            }
            Some(b'"') => {
                sc.next()?;
                break;
            }
            Some(_) => {
                if let Some(u) = jestr::decode_char(sc)? {
                    utf8::encode(u, sc.offset(), &mut bytes)?;
                }
            }
        }
    }

    doc.node_mut(id).payload = Payload::String(bytes);
    doc.run_validator(id)
}
