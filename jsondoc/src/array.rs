// SPDX-License-Identifier: Apache-2.0

//! Array and root mutation operations.
//!
//! Every mutating operation follows the same shape: check operand kinds,
//! record what is needed to reverse the change, apply it, then run the
//! validation hook. A veto triggers the matching `undo_*` inverse, which
//! restores elements and parent links exactly, before the rejection is
//! surfaced as [`Error::Rejected`].
//!
//! The root container indexes like an array, so every operation here
//! accepts both kinds.

use log::debug;

use crate::document::{Document, NodeId};
use crate::error::Error;
use crate::kind::Kind;
use crate::node::Payload;

const REQUIRED: &str = "Array or Root";

impl Document {
    fn items(&self, id: NodeId) -> Result<&Vec<NodeId>, Error> {
        match &self.node(id).payload {
            Payload::Array(items) | Payload::Root(items) => Ok(items),
            other => Err(Error::bad_type(other.kind(), REQUIRED)),
        }
    }

    fn items_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, Error> {
        match &mut self.node_mut(id).payload {
            Payload::Array(items) | Payload::Root(items) => Ok(items),
            other => Err(Error::bad_type(other.kind(), REQUIRED)),
        }
    }

    /// Number of elements in an array or root.
    pub fn array_length(&self, id: NodeId) -> Result<usize, Error> {
        Ok(self.items(id)?.len())
    }

    /// Bounds-checked element read.
    pub fn array_get(&self, id: NodeId, index: usize) -> Result<NodeId, Error> {
        let items = self.items(id)?;
        items.get(index).copied().ok_or(Error::Index {
            index,
            length: items.len(),
        })
    }

    /// Replaces the element at `index` with `item`, returning the displaced
    /// element with its parent reference cleared.
    pub fn array_set(&mut self, id: NodeId, index: usize, item: NodeId) -> Result<NodeId, Error> {
        let previous = self.array_get(id, index)?;
        let item_parent = self.parent(item);

        self.items_mut(id)?[index] = item;
        self.node_mut(item).parent = Some(id);
        self.node_mut(previous).parent = None;

        if let Err(err) = self.run_validator(id) {
            self.undo_set(id, index, previous, item, item_parent);
            return Err(err);
        }
        Ok(previous)
    }

    pub(crate) fn undo_set(
        &mut self,
        id: NodeId,
        index: usize,
        previous: NodeId,
        item: NodeId,
        item_parent: Option<NodeId>,
    ) {
        debug!("rolling back set of index {index} on {id:?}");
        if let Ok(items) = self.items_mut(id) {
            items[index] = previous;
        }
        self.node_mut(previous).parent = Some(id);
        self.node_mut(item).parent = item_parent;
    }

    /// Appends `item` at the current length, extending the array by one.
    pub fn array_append(&mut self, id: NodeId, item: NodeId) -> Result<(), Error> {
        let item_parent = self.parent(item);

        self.items_mut(id)?.push(item);
        self.node_mut(item).parent = Some(id);

        if let Err(err) = self.run_validator(id) {
            self.undo_append(id, item, item_parent);
            return Err(err);
        }
        Ok(())
    }

    pub(crate) fn undo_append(&mut self, id: NodeId, item: NodeId, item_parent: Option<NodeId>) {
        debug!("rolling back append on {id:?}");
        if let Ok(items) = self.items_mut(id) {
            items.pop();
        }
        self.node_mut(item).parent = item_parent;
    }

    /// Truncates the array to `length` elements, moving the removed tail
    /// into a newly created detached array (the return value) in order.
    ///
    /// Truncating to the current length or beyond is an Index error, not a
    /// no-op.
    pub fn array_truncate(&mut self, id: NodeId, length: usize) -> Result<NodeId, Error> {
        let current = self.array_length(id)?;
        if length >= current {
            return Err(Error::Index {
                index: length,
                length: current,
            });
        }

        let removed = self.alloc(Kind::Array, Some(id));
        self.node_mut(removed).parent = None;

        let tail = match self.items_mut(id) {
            Ok(items) => items.split_off(length),
            Err(err) => return Err(err),
        };
        for &item in &tail {
            self.node_mut(item).parent = Some(removed);
        }
        self.node_mut(removed).payload = Payload::Array(tail);

        let validated = self
            .run_validator(removed)
            .and_then(|()| self.run_validator(id));
        if let Err(err) = validated {
            self.undo_truncate(id, removed);
            return Err(err);
        }
        Ok(removed)
    }

    pub(crate) fn undo_truncate(&mut self, id: NodeId, removed: NodeId) {
        debug!("rolling back truncate on {id:?}");
        let tail = match &mut self.node_mut(removed).payload {
            Payload::Array(items) => std::mem::take(items),
            _ => Vec::new(),
        };
        for &item in &tail {
            self.node_mut(item).parent = Some(id);
        }
        if let Ok(items) = self.items_mut(id) {
            items.extend(tail);
        }
        self.release(removed);
    }

    /// Moves every element of `other` onto the end of `self`, leaving
    /// `other` empty. Both operands must be arrays or roots, and distinct.
    pub fn array_extend(&mut self, id: NodeId, other: NodeId) -> Result<(), Error> {
        self.items(id)?;
        self.items(other)?;
        if id == other {
            return self.run_validator(id);
        }

        let old_length = self.array_length(id)?;
        let moved = match self.items_mut(other) {
            Ok(items) => std::mem::take(items),
            Err(err) => return Err(err),
        };
        for &item in &moved {
            self.node_mut(item).parent = Some(id);
        }
        if let Ok(items) = self.items_mut(id) {
            items.extend(moved);
        }

        if let Err(err) = self.run_validator(id) {
            self.undo_extend(id, other, old_length);
            return Err(err);
        }
        Ok(())
    }

    pub(crate) fn undo_extend(&mut self, id: NodeId, other: NodeId, old_length: usize) {
        debug!("rolling back extend on {id:?}");
        let moved = match self.items_mut(id) {
            Ok(items) => items.split_off(old_length),
            Err(_) => Vec::new(),
        };
        for &item in &moved {
            self.node_mut(item).parent = Some(other);
        }
        if let Ok(items) = self.items_mut(other) {
            *items = moved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Hook;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sample_array(doc: &mut Document, values: &[bool]) -> NodeId {
        let array = doc.new_array();
        for &v in values {
            let item = doc.new_boolean(v).unwrap();
            doc.array_append(array, item).unwrap();
        }
        array
    }

    #[test]
    fn test_append_and_get() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true, false]);

        assert_eq!(doc.array_length(array).unwrap(), 2);
        let first = doc.array_get(array, 0).unwrap();
        assert!(doc.boolean_value(first).unwrap());
        assert_eq!(doc.parent(first), Some(array));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true]);
        assert!(matches!(
            doc.array_get(array, 1),
            Err(Error::Index { index: 1, length: 1 })
        ));
    }

    #[test]
    fn test_ops_reject_wrong_kind() {
        let mut doc = Document::new();
        let leaf = doc.new_null().unwrap();
        let other = doc.new_array();
        assert!(matches!(doc.array_length(leaf), Err(Error::Type { .. })));
        assert!(matches!(
            doc.array_append(leaf, other),
            Err(Error::Type { .. })
        ));
        assert!(matches!(
            doc.array_extend(other, leaf),
            Err(Error::Type { .. })
        ));
    }

    #[test]
    fn test_set_returns_detached_previous() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true, false]);
        let replacement = doc.new_null().unwrap();

        let previous = doc.array_set(array, 1, replacement).unwrap();
        assert_eq!(doc.parent(previous), None);
        assert_eq!(doc.parent(replacement), Some(array));
        assert_eq!(doc.array_get(array, 1).unwrap(), replacement);
        assert_eq!(doc.array_length(array).unwrap(), 2);
    }

    #[test]
    fn test_truncate_then_extend_restores() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true, false, true, false]);
        let original: Vec<NodeId> = (0..4).map(|i| doc.array_get(array, i).unwrap()).collect();

        let removed = doc.array_truncate(array, 1).unwrap();
        assert_eq!(doc.array_length(array).unwrap(), 1);
        assert_eq!(doc.array_length(removed).unwrap(), 3);
        assert_eq!(doc.parent(removed), None);
        assert_eq!(doc.parent(original[2]), Some(removed));

        doc.array_extend(array, removed).unwrap();
        assert_eq!(doc.array_length(array).unwrap(), 4);
        assert_eq!(doc.array_length(removed).unwrap(), 0);
        for (i, &item) in original.iter().enumerate() {
            assert_eq!(doc.array_get(array, i).unwrap(), item, "element {i}");
            assert_eq!(doc.parent(item), Some(array));
        }
    }

    #[test]
    fn test_truncate_to_current_length_is_index_error() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true, false]);
        assert!(matches!(
            doc.array_truncate(array, 2),
            Err(Error::Index { index: 2, length: 2 })
        ));
        assert!(matches!(
            doc.array_truncate(array, 5),
            Err(Error::Index { index: 5, length: 2 })
        ));
    }

    /// Rejects every validation once armed.
    struct Armable {
        armed: Cell<bool>,
    }

    impl Hook for Armable {
        fn validate(&self, _doc: &Document, _id: NodeId) -> Result<(), String> {
            if self.armed.get() {
                Err("armed".into())
            } else {
                Ok(())
            }
        }
    }

    fn armed_doc() -> (Document, Rc<Armable>) {
        let hook = Rc::new(Armable {
            armed: Cell::new(false),
        });
        (Document::with_hook(Some(hook.clone())), hook)
    }

    fn snapshot(doc: &Document, array: NodeId) -> Vec<NodeId> {
        (0..doc.array_length(array).unwrap())
            .map(|i| doc.array_get(array, i).unwrap())
            .collect()
    }

    #[test]
    fn test_rejected_append_rolls_back() {
        let (mut doc, hook) = armed_doc();
        let array = sample_array(&mut doc, &[true, false]);
        let before = snapshot(&doc, array);
        let item = doc.new_null().unwrap();

        hook.armed.set(true);
        assert!(matches!(
            doc.array_append(array, item),
            Err(Error::Rejected { .. })
        ));
        assert_eq!(snapshot(&doc, array), before);
        assert_eq!(doc.parent(item), None);
    }

    #[test]
    fn test_rejected_set_rolls_back() {
        let (mut doc, hook) = armed_doc();
        let array = sample_array(&mut doc, &[true, false]);
        let before = snapshot(&doc, array);
        let item = doc.new_null().unwrap();

        hook.armed.set(true);
        assert!(doc.array_set(array, 0, item).is_err());
        assert_eq!(snapshot(&doc, array), before);
        assert_eq!(doc.parent(before[0]), Some(array));
        assert_eq!(doc.parent(item), None);
    }

    #[test]
    fn test_rejected_truncate_rolls_back() {
        let (mut doc, hook) = armed_doc();
        let array = sample_array(&mut doc, &[true, false, true]);
        let before = snapshot(&doc, array);

        hook.armed.set(true);
        assert!(doc.array_truncate(array, 1).is_err());
        assert_eq!(snapshot(&doc, array), before);
        for &item in &before {
            assert_eq!(doc.parent(item), Some(array));
        }
    }

    #[test]
    fn test_rejected_extend_rolls_back() {
        let (mut doc, hook) = armed_doc();
        let target = sample_array(&mut doc, &[true]);
        let source = sample_array(&mut doc, &[false, false]);
        let target_before = snapshot(&doc, target);
        let source_before = snapshot(&doc, source);

        hook.armed.set(true);
        assert!(doc.array_extend(target, source).is_err());
        assert_eq!(snapshot(&doc, target), target_before);
        assert_eq!(snapshot(&doc, source), source_before);
        for &item in &source_before {
            assert_eq!(doc.parent(item), Some(source));
        }
    }

    #[test]
    fn test_undo_append_directly() {
        let mut doc = Document::new();
        let array = sample_array(&mut doc, &[true]);
        let item = doc.new_null().unwrap();

        doc.items_mut(array).unwrap().push(item);
        doc.node_mut(item).parent = Some(array);
        doc.undo_append(array, item, None);

        assert_eq!(doc.array_length(array).unwrap(), 1);
        assert_eq!(doc.parent(item), None);
    }
}
