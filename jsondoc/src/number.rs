// SPDX-License-Identifier: Apache-2.0

//! Number literal scanning and grammar validation.
//!
//! Numbers are kept as validated literal text, never converted to a native
//! numeric type. The validator is a stateless hand-written scanner for the
//! JSON number grammar:
//!
//! ```text
//! -?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?
//! ```

use std::io::Read;

use crate::error::Error;
use crate::scanner::Scanner;

/// Whether the byte terminates a number token. The terminator is left on
/// the stream for the enclosing parser.
fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\r' | b'\t' | b',' | b']' | b'}')
}

/// Whether the literal matches the JSON number grammar.
pub fn is_valid(literal: &[u8]) -> bool {
    let mut rest = literal;

    if let [b'-', tail @ ..] = rest {
        rest = tail;
    }

    // Integer part: 0, or a nonzero digit followed by any digits.
    match rest {
        [b'0', tail @ ..] => rest = tail,
        [b'1'..=b'9', ..] => {
            let digits = count_digits(rest);
            rest = &rest[digits..];
        }
        _ => return false,
    }

    if let [b'.', tail @ ..] = rest {
        let digits = count_digits(tail);
        if digits == 0 {
            return false;
        }
        rest = &tail[digits..];
    }

    if let [b'e' | b'E', tail @ ..] = rest {
        let tail = match tail {
            [b'+' | b'-', t @ ..] => t,
            t => t,
        };
        let digits = count_digits(tail);
        if digits == 0 {
            return false;
        }
        rest = &tail[digits..];
    }

    rest.is_empty()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Buffers a number token up to the next JSON delimiter and validates it
/// against the grammar, returning the literal text verbatim.
pub(crate) fn scan_literal<R: Read>(sc: &mut Scanner<R>) -> Result<String, Error> {
    let mut literal = Vec::new();
    while let Some(byte) = sc.peek()? {
        if is_delimiter(byte) {
            break;
        }
        sc.next()?;
        literal.push(byte);
    }

    if literal.is_empty() {
        return Err(Error::parse_at(
            sc.offset(),
            None,
            "Failed to find number to parse.",
        ));
    }

    if !is_valid(&literal) {
        let text = String::from_utf8_lossy(&literal).into_owned();
        return Err(Error::parse_at(
            sc.offset(),
            None,
            format!("Failed to parse number; Format is invalid: '{text}'."),
        ));
    }

    // The literal passed the grammar, so it is plain ASCII.
    Ok(String::from_utf8_lossy(&literal).into_owned())
}
