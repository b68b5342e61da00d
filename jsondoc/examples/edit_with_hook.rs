// SPDX-License-Identifier: Apache-2.0

//! Build a document by hand, guard it with a validation hook, and watch a
//! rejected edit roll back.

use std::rc::Rc;

use jsondoc::{Document, Hook, Kind, NodeId};

/// Allows at most three elements per array.
struct SmallArraysOnly;

impl Hook for SmallArraysOnly {
    fn validate(&self, doc: &Document, id: NodeId) -> Result<(), String> {
        if doc.kind(id) == Kind::Array && doc.array_length(id).unwrap_or(0) > 3 {
            Err("arrays are capped at three elements".into())
        } else {
            Ok(())
        }
    }
}

fn main() -> Result<(), jsondoc::Error> {
    let mut doc = Document::with_hook(Some(Rc::new(SmallArraysOnly)));
    let array = doc.new_array();

    for literal in ["1", "2", "3"] {
        let item = doc.new_number(literal)?;
        doc.array_append(array, item)?;
    }

    let overflow = doc.new_number("4")?;
    match doc.array_append(array, overflow) {
        Err(err) => println!("fourth append refused: {err}"),
        Ok(()) => unreachable!("the hook caps arrays at three"),
    }

    // The rejected append left the array untouched.
    println!("{}", doc.to_text(array)?);
    Ok(())
}
