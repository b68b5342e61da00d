// SPDX-License-Identifier: Apache-2.0

//! Object mutation operations.
//!
//! Objects map normalized jestr keys to pairs in ascending byte order and
//! cache the byte length of the longest key present. The cache grows
//! immediately when a longer key arrives; removing or displacing a key that
//! matches the cached length triggers a full rescan back to scan-derived
//! truth.
//!
//! Mutations follow the same record/apply/validate/rollback shape as the
//! array operations.

use core::ops::ControlFlow;

use log::debug;

use crate::document::{Document, NodeId};
use crate::error::Error;
use crate::node::Payload;

impl Document {
    fn pairs(&self, id: NodeId) -> Result<&std::collections::BTreeMap<Box<str>, NodeId>, Error> {
        match &self.node(id).payload {
            Payload::Object { pairs, .. } => Ok(pairs),
            other => Err(Error::bad_type(other.kind(), "Object")),
        }
    }

    fn require_pair(&self, id: NodeId) -> Result<&str, Error> {
        match &self.node(id).payload {
            Payload::Pair { key, .. } => Ok(key),
            other => Err(Error::bad_type(other.kind(), "Pair")),
        }
    }

    /// Cached byte length of the longest key currently present.
    pub fn object_key_length(&self, id: NodeId) -> Result<usize, Error> {
        match &self.node(id).payload {
            Payload::Object { key_length, .. } => Ok(*key_length),
            other => Err(Error::bad_type(other.kind(), "Object")),
        }
    }

    /// Number of pairs in the object. O(n).
    pub fn object_count(&self, id: NodeId) -> Result<usize, Error> {
        let mut count = 0usize;
        self.object_for_each(id, |_, _| -> ControlFlow<()> {
            count += 1;
            ControlFlow::Continue(())
        })?;
        Ok(count)
    }

    /// The pair stored under `key`, or `None`. The key is compared against
    /// the stored normalized form.
    pub fn object_get(&self, id: NodeId, key: &str) -> Result<Option<NodeId>, Error> {
        Ok(self.pairs(id)?.get(key).copied())
    }

    /// Inserts a pair by its key, returning the displaced pair (with parent
    /// cleared) if the key was already present.
    pub fn object_set(&mut self, id: NodeId, pair: NodeId) -> Result<Option<NodeId>, Error> {
        self.pairs(id)?;
        let key: Box<str> = self.require_pair(pair)?.into();
        let pair_parent = self.parent(pair);
        let old_key_length = self.object_key_length(id)?;
        let previous = self.object_get(id, &key)?;

        if let Payload::Object { pairs, .. } = &mut self.node_mut(id).payload {
            pairs.insert(key.clone(), pair);
        }
        self.node_mut(pair).parent = Some(id);
        if let Some(previous) = previous {
            self.node_mut(previous).parent = None;
        }

        // Cache maintenance: grow immediately; on a shorter replacement of
        // the previously longest key, fall back to a full rescan.
        if key.len() >= old_key_length {
            self.set_key_length(id, key.len());
        } else if let Some(previous) = previous {
            let previous_len = match &self.node(previous).payload {
                Payload::Pair { key, .. } => key.len(),
                _ => 0,
            };
            if previous_len == old_key_length {
                self.rescan_key_length(id);
            }
        }

        if let Err(err) = self.run_validator(id) {
            self.undo_object_set(id, &key, pair, pair_parent, previous, old_key_length);
            return Err(err);
        }
        Ok(previous)
    }

    pub(crate) fn undo_object_set(
        &mut self,
        id: NodeId,
        key: &str,
        pair: NodeId,
        pair_parent: Option<NodeId>,
        previous: Option<NodeId>,
        old_key_length: usize,
    ) {
        debug!("rolling back object set of \"{key}\" on {id:?}");
        if let Payload::Object { pairs, .. } = &mut self.node_mut(id).payload {
            match previous {
                Some(previous) => {
                    pairs.insert(key.into(), previous);
                }
                None => {
                    pairs.remove(key);
                }
            }
        }
        if let Some(previous) = previous {
            self.node_mut(previous).parent = Some(id);
        }
        self.node_mut(pair).parent = pair_parent;
        self.set_key_length(id, old_key_length);
    }

    /// Removes the pair matching `probe`'s key. The probe's value need not
    /// be set; the stored pair is detached and returned. A missing key is a
    /// NotFound error.
    pub fn object_remove(&mut self, id: NodeId, probe: NodeId) -> Result<NodeId, Error> {
        self.pairs(id)?;
        let key: Box<str> = self.require_pair(probe)?.into();
        let old_key_length = self.object_key_length(id)?;

        let Some(stored) = self.object_get(id, &key)? else {
            return Err(Error::NotFound {
                key: key.into_string(),
            });
        };

        if let Payload::Object { pairs, .. } = &mut self.node_mut(id).payload {
            pairs.remove(&key);
        }
        self.node_mut(stored).parent = None;

        if key.len() == old_key_length {
            self.rescan_key_length(id);
        }

        if let Err(err) = self.run_validator(id) {
            self.undo_object_remove(id, &key, stored, old_key_length);
            return Err(err);
        }
        Ok(stored)
    }

    pub(crate) fn undo_object_remove(
        &mut self,
        id: NodeId,
        key: &str,
        stored: NodeId,
        old_key_length: usize,
    ) {
        debug!("rolling back object remove of \"{key}\" on {id:?}");
        if let Payload::Object { pairs, .. } = &mut self.node_mut(id).payload {
            pairs.insert(key.into(), stored);
        }
        self.node_mut(stored).parent = Some(id);
        self.set_key_length(id, old_key_length);
    }

    /// Calls `f` for every pair in ascending key byte order. `f` may abort
    /// by returning `Break`, which is returned unchanged.
    pub fn object_for_each<B, F>(&self, id: NodeId, mut f: F) -> Result<ControlFlow<B>, Error>
    where
        F: FnMut(&Document, NodeId) -> ControlFlow<B>,
    {
        for &pair in self.pairs(id)?.values() {
            if let ControlFlow::Break(value) = f(self, pair) {
                return Ok(ControlFlow::Break(value));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn set_key_length(&mut self, id: NodeId, length: usize) {
        if let Payload::Object { key_length, .. } = &mut self.node_mut(id).payload {
            *key_length = length;
        }
    }

    fn rescan_key_length(&mut self, id: NodeId) {
        let longest = match &self.node(id).payload {
            Payload::Object { pairs, .. } => {
                pairs.keys().map(|key| key.len()).max().unwrap_or(0)
            }
            _ => return,
        };
        self.set_key_length(id, longest);
    }
}
