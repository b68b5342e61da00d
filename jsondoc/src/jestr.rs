// SPDX-License-Identifier: Apache-2.0

//! JSON-escaped string ("jestr") codec.
//!
//! A jestr is string content as it appears literally between the quotes of a
//! JSON string token: raw UTF-8 plus backslash escapes. This layer composes
//! the UTF-8 and UTF-16 escape codecs: reading yields one codepoint per
//! call, writing picks the canonical escape form for each codepoint.
//!
//! Object pair keys are stored in *normalized* jestr form: every codepoint
//! decoded and re-encoded through [`encode_char`], so `\u0041` and `A` are
//! the same key.

use std::io::Read;
use std::io::Write;

use crate::error::Error;
use crate::scanner::Scanner;
use crate::utf16;
use crate::utf8;

/// The escape letter for codepoints with a short-form escape, if any.
fn simple_escape(u: u32) -> Option<u8> {
    match u {
        0x22 => Some(b'"'),
        0x5C => Some(b'\\'),
        0x08 => Some(b'b'),
        0x0C => Some(b'f'),
        0x0A => Some(b'n'),
        0x0D => Some(b'r'),
        0x09 => Some(b't'),
        _ => None,
    }
}

/// Reads one codepoint of jestr content, or `None` at end of input.
///
/// Printable ASCII (32-127) is returned directly, UTF-8 lead bytes 194-244
/// delegate to the UTF-8 decoder, and a backslash introduces either a simple
/// escape (`" \ / b f n r t`) or a UTF-16 escape (`u`). Control bytes and
/// stray continuation bytes are parse errors.
pub fn decode_char<R: Read>(sc: &mut Scanner<R>) -> Result<Option<u32>, Error> {
    let Some(byte) = sc.peek()? else {
        return Ok(None);
    };

    match byte {
        b'\\' => {
            sc.next()?;
            decode_escaped(sc).map(Some)
        }
        32..=127 => {
            sc.next()?;
            Ok(Some(u32::from(byte)))
        }
        194..=244 => utf8::decode(sc),
        _ => {
            sc.next()?;
            Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Invalid character in string.",
            ))
        }
    }
}

fn decode_escaped<R: Read>(sc: &mut Scanner<R>) -> Result<u32, Error> {
    let Some(byte) = sc.peek()? else {
        return Err(Error::parse_at(
            sc.offset(),
            None,
            "Expecting more data; Incomplete escape sequence.",
        ));
    };

    if byte == b'u' {
        return utf16::decode_escape(sc);
    }

    sc.next()?;
    match byte {
        b'"' => Ok(0x22),
        b'\\' => Ok(0x5C),
        b'/' => Ok(0x2F),
        b'b' => Ok(0x08),
        b'f' => Ok(0x0C),
        b'n' => Ok(0x0A),
        b'r' => Ok(0x0D),
        b't' => Ok(0x09),
        _ => Err(Error::parse_at(
            sc.offset(),
            Some(byte),
            "Invalid escape sequence.",
        )),
    }
}

/// Writes one codepoint in canonical jestr form.
///
/// Codepoints with a short-form escape use it; other control codepoints
/// (<= 0x1F) become `\uXXXX`; everything else is written as raw UTF-8.
pub fn encode_char<W: Write>(u: u32, at: u64, out: &mut W) -> Result<(), Error> {
    if u <= 0x7F {
        if let Some(escape) = simple_escape(u) {
            out.write_all(&[b'\\', escape])?;
            return Ok(());
        }
        if u <= 0x1F {
            return utf16::encode_escape(u, at, out);
        }
    }

    utf8::encode(u, at, out)
}

/// Reads a quoted JSON string token and returns its content in normalized
/// jestr form (without the quotes).
///
/// The stream must be positioned at the opening quote. Escapes are decoded
/// and re-encoded, so two spellings of the same content scan to identical
/// text.
pub fn scan<R: Read>(sc: &mut Scanner<R>) -> Result<String, Error> {
    match sc.peek()? {
        None => {
            return Err(Error::parse_at(
                sc.offset(),
                None,
                "Expecting more data; Failed to find string to parse.",
            ))
        }
        Some(b'"') => {
            sc.next()?;
        }
        Some(byte) => {
            return Err(Error::parse_at(
                sc.offset(),
                Some(byte),
                "Failed to find string to parse; Expecting '\"'.",
            ))
        }
    }

    let mut buf = Vec::new();
    loop {
        match sc.peek()? {
            None => {
                return Err(Error::parse_at(
                    sc.offset(),
                    None,
                    "Expecting more data; Failed to find end of string.",
                ))
            }
            Some(b'"') => {
                sc.next()?;
                break;
            }
            Some(_) => {
                let at = sc.offset();
                if let Some(u) = decode_char(sc)? {
                    encode_char(u, at, &mut buf)?;
                }
            }
        }
    }

    text_from_utf8(buf, sc.offset())
}

/// Writes a jestr as a quoted JSON string token, re-encoding each codepoint
/// in canonical form.
pub fn print<W: Write>(jestr: &str, out: &mut W) -> Result<(), Error> {
    let mut sc = Scanner::new(jestr.as_bytes());
    out.write_all(b"\"")?;
    while let Some(u) = decode_char(&mut sc)? {
        encode_char(u, sc.offset(), out)?;
    }
    out.write_all(b"\"")?;
    Ok(())
}

/// Returns a copy of the jestr with UTF-16 escape sequences and UTF-8
/// encodings normalized.
pub fn normalize(jestr: &str) -> Result<String, Error> {
    let mut sc = Scanner::new(jestr.as_bytes());
    let mut buf = Vec::new();
    while let Some(u) = decode_char(&mut sc)? {
        encode_char(u, sc.offset(), &mut buf)?;
    }
    text_from_utf8(buf, jestr.len() as u64)
}

fn text_from_utf8(buf: Vec<u8>, at: u64) -> Result<String, Error> {
    // encode_char only emits ASCII escapes and well-formed UTF-8, so this
    // conversion cannot fail for content produced by this module.
    String::from_utf8(buf)
        .map_err(|_| Error::parse_at(at, None, "Normalized string is not valid UTF-8."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_str(input: &str) -> Result<String, Error> {
        let mut sc = Scanner::new(input.as_bytes());
        scan(&mut sc)
    }

    #[test]
    fn test_decode_simple_escapes() {
        for (text, want) in [
            ("\\\"", 0x22),
            ("\\\\", 0x5C),
            ("\\/", 0x2F),
            ("\\b", 0x08),
            ("\\f", 0x0C),
            ("\\n", 0x0A),
            ("\\r", 0x0D),
            ("\\t", 0x09),
        ] {
            let mut sc = Scanner::new(text.as_bytes());
            assert_eq!(decode_char(&mut sc).unwrap(), Some(want), "escape {text}");
        }
    }

    #[test]
    fn test_decode_rejects_unknown_escape() {
        let mut sc = Scanner::new(&b"\\x"[..]);
        assert!(decode_char(&mut sc).is_err());
    }

    #[test]
    fn test_decode_rejects_control_bytes() {
        let mut sc = Scanner::new(&[0x01][..]);
        assert!(decode_char(&mut sc).is_err());
    }

    #[test]
    fn test_decode_utf8_content() {
        let mut sc = Scanner::new("α".as_bytes());
        assert_eq!(decode_char(&mut sc).unwrap(), Some(0x3B1));
    }

    #[test]
    fn test_encode_prefers_simple_escapes() {
        let mut out = Vec::new();
        for u in [0x22u32, 0x5C, 0x08, 0x0C, 0x0A, 0x0D, 0x09] {
            encode_char(u, 0, &mut out).unwrap();
        }
        assert_eq!(out, b"\\\"\\\\\\b\\f\\n\\r\\t");
    }

    #[test]
    fn test_encode_controls_as_unicode_escape() {
        let mut out = Vec::new();
        encode_char(0x01, 0, &mut out).unwrap();
        assert_eq!(out, b"\\u0001");
    }

    #[test]
    fn test_encode_slash_not_escaped() {
        let mut out = Vec::new();
        encode_char(0x2F, 0, &mut out).unwrap();
        assert_eq!(out, b"/");
    }

    #[test]
    fn test_scan_plain() {
        assert_eq!(scan_str("\"hello\"").unwrap(), "hello");
        assert_eq!(scan_str("\"\"").unwrap(), "");
    }

    #[test]
    fn test_scan_normalizes_unicode_escapes() {
        assert_eq!(scan_str("\"\\u0041\"").unwrap(), "A");
        assert_eq!(scan_str("\"\\u03b1\"").unwrap(), "α");
    }

    #[test]
    fn test_scan_normalizes_surrogate_pair_to_utf8() {
        assert_eq!(scan_str("\"\\uD834\\uDD1E\"").unwrap(), "𝄞");
    }

    #[test]
    fn test_scan_keeps_escapes_canonical() {
        assert_eq!(scan_str("\"a\\nb\"").unwrap(), "a\\nb");
        assert_eq!(scan_str("\"a\\u000ab\"").unwrap(), "a\\nb");
    }

    #[test]
    fn test_scan_unterminated() {
        assert!(scan_str("\"abc").is_err());
        assert!(scan_str("").is_err());
    }

    #[test]
    fn test_scan_requires_quote() {
        assert!(scan_str("abc").is_err());
    }

    #[test]
    fn test_normalize_round_trip() {
        let normalized = normalize("\\u0041\\n\\u03b1").unwrap();
        assert_eq!(normalized, "A\\nα");
        // Normalization is idempotent.
        assert_eq!(normalize(&normalized).unwrap(), normalized);
    }

    #[test]
    fn test_print_quotes_and_escapes() {
        let mut out = Vec::new();
        print("a\\tb", &mut out).unwrap();
        assert_eq!(out, b"\"a\\tb\"");
    }

    #[test]
    fn test_lone_low_surrogate_is_error() {
        assert!(scan_str("\"\\uDFFF\"").is_err());
    }
}
