// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;

use log::debug;

use crate::error::Error;
use crate::hook::Hook;
use crate::jestr;
use crate::kind::Kind;
use crate::node::{Node, Payload};
use crate::number;

/// Handle to a node in a [`Document`] arena.
///
/// A handle stays valid until its node is released (explicitly or as part
/// of a released subtree). Using a handle after release is a contract
/// violation and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// An in-memory JSON document: an arena of typed nodes plus the optional
/// hook bundle shared by all of them.
///
/// Nodes are owned by their containers (arrays, objects, pairs, the root)
/// and reachable through [`NodeId`] handles. Removing, replacing, or
/// truncating detaches nodes without destroying them; [`Document::release`]
/// tears a detached subtree down. Dropping the document releases everything
/// that is still alive, children before parents.
pub struct Document {
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    root: Option<NodeId>,
    hook: Option<Rc<dyn Hook>>,
}

impl Document {
    /// Creates an empty document with no hook bundle.
    pub fn new() -> Document {
        Document::with_hook(None)
    }

    /// Creates an empty document with the given hook bundle. The bundle is
    /// shared by every node created in this document and is never
    /// reassigned.
    pub fn with_hook(hook: Option<Rc<dyn Hook>>) -> Document {
        Document {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            hook,
        }
    }

    /// The root node of a parsed document, if this document was produced by
    /// a root parse.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Whether the handle refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.slots.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("{id:?} refers to a released node"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("{id:?} refers to a released node"),
        }
    }

    /// The kind of the node.
    pub fn kind(&self, id: NodeId) -> Kind {
        self.node(id).kind()
    }

    /// The container or pair currently holding the node, or `None` for a
    /// detached node or the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Allocates a node of the given kind with an empty payload, invoking
    /// the creation callback.
    pub(crate) fn alloc(&mut self, kind: Kind, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            parent,
            payload: Payload::empty_for(kind),
        };
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId((self.slots.len() - 1) as u32)
            }
        };
        if let Some(hook) = self.hook.clone() {
            hook.created(kind, parent);
        }
        id
    }

    /// Runs the validation callback against `id`, mapping a veto to
    /// [`Error::Rejected`].
    pub(crate) fn run_validator(&self, id: NodeId) -> Result<(), Error> {
        let Some(hook) = self.hook.clone() else {
            return Ok(());
        };
        match hook.validate(self, id) {
            Ok(()) => Ok(()),
            Err(reason) => {
                debug!("validation hook rejected {:?} ({})", id, self.kind(id));
                Err(Error::Rejected { reason })
            }
        }
    }

    /// Releases a subtree: children first, then the node itself, invoking
    /// the release callback per node.
    ///
    /// The node must not be owned by a live container (it may be the root,
    /// a detached node, or a node whose insertion never happened).
    pub fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        let Some(node) = slot.take() else {
            return;
        };
        let kind = node.kind();

        match node.payload {
            Payload::Array(children) | Payload::Root(children) => {
                for child in children {
                    self.release(child);
                }
            }
            Payload::Object { pairs, .. } => {
                for (_, pair) in pairs {
                    self.release(pair);
                }
            }
            Payload::Pair { value, .. } => {
                if let Some(value) = value {
                    self.release(value);
                }
            }
            _ => {}
        }

        if let Some(hook) = self.hook.clone() {
            hook.released(id, kind);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.free.push(id.0);
    }

    /// Creates a detached empty array.
    pub fn new_array(&mut self) -> NodeId {
        self.alloc(Kind::Array, None)
    }

    /// Creates a detached empty object.
    pub fn new_object(&mut self) -> NodeId {
        self.alloc(Kind::Object, None)
    }

    /// Creates a detached null node.
    pub fn new_null(&mut self) -> Result<NodeId, Error> {
        let id = self.alloc(Kind::Null, None);
        self.finish_new(id)
    }

    /// Creates a detached boolean node.
    pub fn new_boolean(&mut self, value: bool) -> Result<NodeId, Error> {
        let id = self.alloc(Kind::Boolean, None);
        self.node_mut(id).payload = Payload::Boolean(value);
        self.finish_new(id)
    }

    /// Creates a detached number node from literal text, validating it
    /// against the JSON number grammar.
    pub fn new_number(&mut self, literal: &str) -> Result<NodeId, Error> {
        if !number::is_valid(literal.as_bytes()) {
            return Err(Error::parse_at(
                0,
                None,
                format!("Failed to parse number; Format is invalid: '{literal}'."),
            ));
        }
        let id = self.alloc(Kind::Number, None);
        self.node_mut(id).payload = Payload::Number(literal.to_owned());
        self.finish_new(id)
    }

    /// Creates a detached string node from decoded UTF-8 bytes.
    pub fn new_string(&mut self, bytes: impl Into<Vec<u8>>) -> Result<NodeId, Error> {
        let id = self.alloc(Kind::String, None);
        self.node_mut(id).payload = Payload::String(bytes.into());
        self.finish_new(id)
    }

    /// Creates a detached pair from a jestr key and an optional value node.
    ///
    /// The key is normalized. The value, if given, must be a bare value
    /// kind (not a pair or root) and becomes owned by the new pair.
    pub fn new_pair(&mut self, key: &str, value: Option<NodeId>) -> Result<NodeId, Error> {
        let key = jestr::normalize(key)?;
        if let Some(value) = value {
            let kind = self.kind(value);
            if matches!(kind, Kind::Pair | Kind::Root) {
                return Err(Error::bad_type(
                    kind,
                    "Array, Boolean, Null, Number, Object, or String",
                ));
            }
        }

        let id = self.alloc(Kind::Pair, None);
        self.node_mut(id).payload = Payload::Pair {
            key: key.into_boxed_str(),
            value,
        };
        if let Some(value) = value {
            self.node_mut(value).parent = Some(id);
        }

        if let Err(err) = self.run_validator(id) {
            // Hand the value back before discarding the rejected pair.
            if let Payload::Pair { value, .. } = &mut self.node_mut(id).payload {
                *value = None;
            }
            if let Some(value) = value {
                self.node_mut(value).parent = None;
            }
            self.release(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Validates a freshly initialized node, releasing it on rejection.
    fn finish_new(&mut self, id: NodeId) -> Result<NodeId, Error> {
        match self.run_validator(id) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.release(id);
                Err(err)
            }
        }
    }

    /// Boolean payload accessor.
    pub fn boolean_value(&self, id: NodeId) -> Result<bool, Error> {
        match &self.node(id).payload {
            Payload::Boolean(value) => Ok(*value),
            other => Err(Error::bad_type(other.kind(), "Boolean")),
        }
    }

    /// Literal numeral text of a number node.
    pub fn number_literal(&self, id: NodeId) -> Result<&str, Error> {
        match &self.node(id).payload {
            Payload::Number(literal) => Ok(literal),
            other => Err(Error::bad_type(other.kind(), "Number")),
        }
    }

    /// Decoded UTF-8 bytes of a string node.
    pub fn string_bytes(&self, id: NodeId) -> Result<&[u8], Error> {
        match &self.node(id).payload {
            Payload::String(bytes) => Ok(bytes),
            other => Err(Error::bad_type(other.kind(), "String")),
        }
    }

    /// Normalized jestr key of a pair.
    pub fn pair_key(&self, id: NodeId) -> Result<&str, Error> {
        match &self.node(id).payload {
            Payload::Pair { key, .. } => Ok(key),
            other => Err(Error::bad_type(other.kind(), "Pair")),
        }
    }

    /// Value node of a pair, if one is attached.
    pub fn pair_value(&self, id: NodeId) -> Result<Option<NodeId>, Error> {
        match &self.node(id).payload {
            Payload::Pair { value, .. } => Ok(*value),
            other => Err(Error::bad_type(other.kind(), "Pair")),
        }
    }
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        // Release ownership forests children-last: repeatedly release every
        // live node whose parent is gone (or was never set).
        loop {
            let orphans: Vec<NodeId> = (0..self.slots.len() as u32)
                .map(NodeId)
                .filter(|&id| self.is_alive(id))
                .filter(|&id| match self.node(id).parent {
                    None => true,
                    Some(parent) => !self.is_alive(parent),
                })
                .collect();
            if orphans.is_empty() {
                break;
            }
            for id in orphans {
                if self.is_alive(id) {
                    self.release(id);
                }
            }
        }
    }
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("Document")
            .field("live_nodes", &live)
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_new_leaf_nodes() {
        let mut doc = Document::new();
        let b = doc.new_boolean(true).unwrap();
        let n = doc.new_number("3.14").unwrap();
        let s = doc.new_string(b"hi".to_vec()).unwrap();
        let z = doc.new_null().unwrap();

        assert_eq!(doc.kind(b), Kind::Boolean);
        assert!(doc.boolean_value(b).unwrap());
        assert_eq!(doc.number_literal(n).unwrap(), "3.14");
        assert_eq!(doc.string_bytes(s).unwrap(), b"hi");
        assert_eq!(doc.kind(z), Kind::Null);
        assert_eq!(doc.parent(b), None);
    }

    #[test]
    fn test_new_number_rejects_bad_literal() {
        let mut doc = Document::new();
        assert!(doc.new_number("01").is_err());
        assert!(doc.new_number("1.").is_err());
    }

    #[test]
    fn test_new_pair_owns_value() {
        let mut doc = Document::new();
        let value = doc.new_boolean(true).unwrap();
        let pair = doc.new_pair("flag", Some(value)).unwrap();

        assert_eq!(doc.pair_key(pair).unwrap(), "flag");
        assert_eq!(doc.pair_value(pair).unwrap(), Some(value));
        assert_eq!(doc.parent(value), Some(pair));
    }

    #[test]
    fn test_new_pair_normalizes_key() {
        let mut doc = Document::new();
        let pair = doc.new_pair("\\u0041", None).unwrap();
        assert_eq!(doc.pair_key(pair).unwrap(), "A");
    }

    #[test]
    fn test_new_pair_rejects_root_or_pair_value() {
        let mut doc = Document::new();
        let inner = doc.new_pair("k", None).unwrap();
        assert!(matches!(
            doc.new_pair("outer", Some(inner)),
            Err(Error::Type { .. })
        ));
    }

    #[test]
    fn test_wrong_kind_accessors() {
        let mut doc = Document::new();
        let b = doc.new_boolean(false).unwrap();
        assert!(matches!(doc.number_literal(b), Err(Error::Type { .. })));
        assert!(matches!(doc.string_bytes(b), Err(Error::Type { .. })));
        assert!(matches!(doc.pair_key(b), Err(Error::Type { .. })));
    }

    #[test]
    fn test_release_recycles_slots() {
        let mut doc = Document::new();
        let a = doc.new_boolean(true).unwrap();
        doc.release(a);
        assert!(!doc.is_alive(a));
        let b = doc.new_null().unwrap();
        // The freed slot is reused.
        assert_eq!(a.index(), b.index());
    }

    struct CountingHook {
        created: RefCell<usize>,
        released: RefCell<Vec<Kind>>,
    }

    impl Hook for CountingHook {
        fn created(&self, _kind: Kind, _parent: Option<NodeId>) {
            *self.created.borrow_mut() += 1;
        }

        fn released(&self, _id: NodeId, kind: Kind) {
            self.released.borrow_mut().push(kind);
        }
    }

    #[test]
    fn test_hook_sees_create_and_release_post_order() {
        let hook = Rc::new(CountingHook {
            created: RefCell::new(0),
            released: RefCell::new(Vec::new()),
        });
        let mut doc = Document::with_hook(Some(hook.clone()));

        let value = doc.new_boolean(true).unwrap();
        let pair = doc.new_pair("k", Some(value)).unwrap();
        assert_eq!(*hook.created.borrow(), 2);

        doc.release(pair);
        // Post-order: the value goes before the pair holding it.
        assert_eq!(*hook.released.borrow(), vec![Kind::Boolean, Kind::Pair]);
    }

    struct VetoAll;

    impl Hook for VetoAll {
        fn validate(&self, _doc: &Document, _id: NodeId) -> Result<(), String> {
            Err("nothing allowed".into())
        }
    }

    #[test]
    fn test_validator_vetoes_construction() {
        let mut doc = Document::with_hook(Some(Rc::new(VetoAll)));
        let result = doc.new_boolean(true);
        assert!(matches!(result, Err(Error::Rejected { .. })));
    }

    #[test]
    fn test_rejected_pair_leaves_value_detached_and_alive() {
        struct VetoPairs;
        impl Hook for VetoPairs {
            fn validate(&self, doc: &Document, id: NodeId) -> Result<(), String> {
                if doc.kind(id) == Kind::Pair {
                    Err("no pairs".into())
                } else {
                    Ok(())
                }
            }
        }

        let mut doc = Document::with_hook(Some(Rc::new(VetoPairs)));
        let value = doc.new_boolean(true).unwrap();
        assert!(doc.new_pair("k", Some(value)).is_err());
        assert!(doc.is_alive(value));
        assert_eq!(doc.parent(value), None);
    }
}
