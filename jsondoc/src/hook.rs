// SPDX-License-Identifier: Apache-2.0

use crate::document::{Document, NodeId};
use crate::kind::Kind;

/// Lifecycle and validation callbacks for a document's nodes.
///
/// A hook bundle is supplied once, when a document is created or a root
/// parse starts, and is shared by every node created in that document for
/// its whole lifetime. All three callbacks have default implementations, so
/// an implementor overrides only what it needs.
///
/// The document arena owns node storage, so the creation callback observes
/// allocations rather than performing them; it cannot veto. The validator
/// runs after every structural mutation and after each node finishes
/// parsing; returning `Err` vetoes the mutation, which is rolled back in
/// full before the rejection surfaces to the caller as
/// [`Error::Rejected`](crate::Error::Rejected).
pub trait Hook {
    /// Called when a node has been created, before any content is attached.
    /// `parent` is the node it was created under, if any.
    fn created(&self, kind: Kind, parent: Option<NodeId>) {
        let _ = (kind, parent);
    }

    /// Called when a node is released, after its children have been
    /// released.
    fn released(&self, id: NodeId, kind: Kind) {
        let _ = (id, kind);
    }

    /// Called after a mutation of `id` (or of the container `id`). An `Err`
    /// rejects the mutation; the returned reason is reported to the caller.
    fn validate(&self, doc: &Document, id: NodeId) -> Result<(), String> {
        let _ = (doc, id);
        Ok(())
    }
}
