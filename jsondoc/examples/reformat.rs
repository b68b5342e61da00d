// SPDX-License-Identifier: Apache-2.0

//! Parse a document, look a value up by path, and reprint everything.

use jsondoc::Document;

fn main() -> Result<(), jsondoc::Error> {
    let doc = Document::parse_str(r#"{"servers": [{"host": "a.example", "port": 8080}]}"#)?;
    let root = doc.root().expect("parse_str always sets a root");

    // Address a nested value with a NUL-separated path.
    let port = doc
        .resolve(root, b"0\0servers\00\0port\0")?
        .expect("port is present");
    println!("port literal: {}", doc.number_literal(port)?);

    println!("{}", doc.to_text(root)?);
    Ok(())
}
