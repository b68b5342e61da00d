// SPDX-License-Identifier: Apache-2.0

use core::ops::ControlFlow;

use crate::document::{Document, NodeId};
use crate::node::Payload;

impl Document {
    /// Walks the subtree depth-first, left to right.
    ///
    /// For containers the callback runs after every child; for a pair it
    /// runs after the value; leaves invoke it directly. Returning `Break`
    /// aborts the walk and the break value propagates up unchanged,
    /// short-circuiting remaining siblings.
    ///
    /// # Example
    /// ```
    /// use core::ops::ControlFlow;
    /// use jsondoc::Document;
    ///
    /// let doc = Document::parse_str("[1, [2, 3]]").unwrap();
    /// let mut visited = 0;
    /// let flow: ControlFlow<()> = doc.walk(doc.root().unwrap(), &mut |_, _| {
    ///     visited += 1;
    ///     ControlFlow::Continue(())
    /// });
    /// assert_eq!(flow, ControlFlow::Continue(()));
    /// assert_eq!(visited, 6); // three numbers, two arrays, the root
    /// ```
    pub fn walk<B, F>(&self, id: NodeId, f: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&Document, NodeId) -> ControlFlow<B>,
    {
        match &self.node(id).payload {
            Payload::Array(items) | Payload::Root(items) => {
                for &item in items {
                    self.walk(item, f)?;
                }
                f(self, id)
            }
            Payload::Object { pairs, .. } => {
                for &pair in pairs.values() {
                    self.walk(pair, f)?;
                }
                f(self, id)
            }
            Payload::Pair { value, .. } => {
                if let Some(value) = *value {
                    self.walk(value, f)?;
                }
                f(self, id)
            }
            _ => f(self, id),
        }
    }
}
