// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use crate::error::Error;

/// A byte-at-a-time reader over any [`Read`] source with single-byte
/// lookahead and a running offset for diagnostics.
///
/// All parsers and the string codec consume input through this type. The
/// offset counts consumed bytes; a peeked byte is not counted until it is
/// consumed with [`Scanner::next`].
///
/// Reads are blocking and synchronous. End of input is reported as `None`
/// rather than an error, since several grammar positions treat it as a
/// normal terminator.
pub struct Scanner<R> {
    inner: R,
    peeked: Option<u8>,
    offset: u64,
}

impl<R: Read> Scanner<R> {
    /// Creates a scanner over the given byte source.
    ///
    /// # Example
    /// ```
    /// use jsondoc::Scanner;
    /// let mut sc = Scanner::new(&b"[1]"[..]);
    /// assert_eq!(sc.peek().unwrap(), Some(b'['));
    /// assert_eq!(sc.next().unwrap(), Some(b'['));
    /// assert_eq!(sc.offset(), 1);
    /// ```
    pub fn new(inner: R) -> Self {
        Scanner {
            inner,
            peeked: None,
            offset: 0,
        }
    }

    /// Byte offset of the end of the consumed prefix.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consumes and returns the next byte, or `None` at end of input.
    pub fn next(&mut self) -> Result<Option<u8>, Error> {
        let byte = match self.peeked.take() {
            Some(b) => Some(b),
            None => self.read_byte()?,
        };
        if byte.is_some() {
            self.offset += 1;
        }
        Ok(byte)
    }

    /// Returns the next byte without consuming it, or `None` at end of
    /// input.
    pub fn peek(&mut self) -> Result<Option<u8>, Error> {
        if self.peeked.is_none() {
            self.peeked = self.read_byte()?;
        }
        Ok(self.peeked)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }
}
