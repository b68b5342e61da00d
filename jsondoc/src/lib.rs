// SPDX-License-Identifier: Apache-2.0

//! An editable in-memory JSON document tree with a streaming text codec.
//!
//! Unlike one-shot decode-to-native-types libraries, `jsondoc` parses JSON
//! text into a mutable tree of typed nodes that can be queried, addressed
//! by path, edited transactionally, and serialized back to canonical
//! pretty-printed text. Numbers are kept as validated literal text, so
//! round-tripping never loses precision.
//!
//! ```
//! use jsondoc::Document;
//!
//! let doc = Document::parse_str(r#"{"b": 1, "a": [true, null]}"#).unwrap();
//! let root = doc.root().unwrap();
//! assert_eq!(
//!     doc.to_text(root).unwrap(),
//!     "{\n  \"a\": [\n    true,\n    null\n  ],\n  \"b\": 1\n}"
//! );
//! ```
//!
//! Mutations run through a transactional engine: an optional caller-supplied
//! [`Hook`] can validate every change, and a rejected change is rolled back
//! exactly before the rejection surfaces. See [`Document`] for the
//! operation set and [`Hook`] for the callback contract.

mod array;
mod document;
mod error;
mod hook;
mod kind;
mod node;
mod object;
mod parser;
mod path;
mod scanner;
mod walk;

pub mod jestr;
pub mod print;
pub mod utf16;
pub mod utf8;

mod number;
pub use number::is_valid as is_valid_number;

pub use document::{Document, NodeId};
pub use error::Error;
pub use hook::Hook;
pub use kind::{Kind, KindSet};
pub use scanner::Scanner;
