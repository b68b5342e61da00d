// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::document::NodeId;
use crate::kind::Kind;

/// Kind-specific node payload.
///
/// Container payloads hold the owning child references; the parent link on
/// [`Node`] is the non-owning back edge.
#[derive(Debug)]
pub(crate) enum Payload {
    /// Dense, zero-based child sequence.
    Array(Vec<NodeId>),
    Boolean(bool),
    Null,
    /// Literal numeral text, stored verbatim.
    Number(String),
    /// Pairs in ascending byte order of their normalized jestr keys.
    /// `key_length` caches the byte length of the longest key present.
    Object {
        key_length: usize,
        pairs: BTreeMap<Box<str>, NodeId>,
    },
    /// Normalized jestr key plus the owned value. A pair used purely as a
    /// removal probe may have no value.
    Pair {
        key: Box<str>,
        value: Option<NodeId>,
    },
    /// Top-level container; indexes like an array.
    Root(Vec<NodeId>),
    /// Decoded UTF-8 bytes: no escapes, no terminator.
    String(Vec<u8>),
}

impl Payload {
    pub(crate) fn empty_for(kind: Kind) -> Payload {
        match kind {
            Kind::Array => Payload::Array(Vec::new()),
            Kind::Boolean => Payload::Boolean(false),
            Kind::Null => Payload::Null,
            Kind::Number => Payload::Number(String::new()),
            Kind::Object => Payload::Object {
                key_length: 0,
                pairs: BTreeMap::new(),
            },
            Kind::Pair => Payload::Pair {
                key: Box::from(""),
                value: None,
            },
            Kind::Root => Payload::Root(Vec::new()),
            Kind::String => Payload::String(Vec::new()),
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        match self {
            Payload::Array(_) => Kind::Array,
            Payload::Boolean(_) => Kind::Boolean,
            Payload::Null => Kind::Null,
            Payload::Number(_) => Kind::Number,
            Payload::Object { .. } => Kind::Object,
            Payload::Pair { .. } => Kind::Pair,
            Payload::Root(_) => Kind::Root,
            Payload::String(_) => Kind::String,
        }
    }
}

/// One document node: a non-owning parent reference plus the kind-specific
/// payload.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) payload: Payload,
}

impl Node {
    pub(crate) fn kind(&self) -> Kind {
        self.payload.kind()
    }
}
