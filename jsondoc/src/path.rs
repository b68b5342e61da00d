// SPDX-License-Identifier: Apache-2.0

//! Path addressing: serialize where a node lives, or walk to a descendant.
//!
//! A path is a sequence of NUL-terminated segments, written top-down:
//! a decimal index for each array or root step and the pair key for each
//! object step. A trailing empty segment marks the end of the path; a
//! parentless target (the root itself, or a detached node) contributes an
//! extra NUL, so its path is a doubled NUL.
//!
//! For the document `{"a": [{"c": true}]}`, the path of the `true` node is
//! `a\0` `0\0` `c\0` plus the terminator.

use crate::document::{Document, NodeId};
use crate::error::Error;
use crate::jestr;
use crate::node::Payload;

impl Document {
    /// Serializes the path from the top of the tree down to `id`.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.segments_into(id, None, &mut out)?;
        Ok(out)
    }

    fn segments_into(
        &self,
        id: NodeId,
        child: Option<NodeId>,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        if let Some(parent) = self.parent(id) {
            self.segments_into(parent, Some(id), out)?;
        }

        match child {
            Some(child) => match &self.node(id).payload {
                Payload::Array(items) | Payload::Root(items) => {
                    let Some(index) = items.iter().position(|&item| item == child) else {
                        return Err(Error::NotFound {
                            key: format!("{child:?}"),
                        });
                    };
                    out.extend_from_slice(index.to_string().as_bytes());
                    out.push(0);
                }
                Payload::Pair { key, .. } => {
                    out.extend_from_slice(key.as_bytes());
                    out.push(0);
                }
                _ => {}
            },
            None => {
                if let Payload::Pair { key, .. } = &self.node(id).payload {
                    out.extend_from_slice(key.as_bytes());
                    out.push(0);
                }
                if self.parent(id).is_none() {
                    out.push(0);
                }
                out.push(0);
            }
        }
        Ok(())
    }

    /// Walks from `start` down the given NUL-separated path, consuming one
    /// segment per level until an empty segment (or the end of the input).
    ///
    /// Array and root steps read the segment as a decimal index; object
    /// steps normalize the segment and look it up as a key, descending into
    /// the pair's value. A missing object key (or a pair with no value)
    /// yields `None`; an out-of-range index is an Index error; a step
    /// through a leaf is a Type error.
    pub fn resolve(&self, start: NodeId, segments: &[u8]) -> Result<Option<NodeId>, Error> {
        let mut found = start;
        let mut rest = segments;

        loop {
            let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
            let segment = &rest[..end];
            if segment.is_empty() {
                return Ok(Some(found));
            }

            let segment = core::str::from_utf8(segment).map_err(|_| {
                Error::parse_at(0, None, "Path segment is not valid UTF-8.")
            })?;
            let normalized = jestr::normalize(segment)?;

            match &self.node(found).payload {
                Payload::Array(_) | Payload::Root(_) => {
                    let index = leading_index(&normalized);
                    found = self.array_get(found, index)?;
                }
                Payload::Object { .. } => {
                    let Some(pair) = self.object_get(found, &normalized)? else {
                        return Ok(None);
                    };
                    match self.pair_value(pair)? {
                        Some(value) => found = value,
                        None => return Ok(None),
                    }
                }
                other => return Err(Error::bad_type(other.kind(), "Array, Root, or Object")),
            }

            if end == rest.len() {
                return Ok(Some(found));
            }
            rest = &rest[end + 1..];
        }
    }
}

/// Decimal value of the segment's leading digits, zero if there are none.
fn leading_index(segment: &str) -> usize {
    segment
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0usize, |acc, b| {
            acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
        })
}
