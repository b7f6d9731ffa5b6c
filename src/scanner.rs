//! Byte cursor with line/column tracking.
//!
//! The scanner has no knowledge of INI; the grammar in [`crate::parser`] is
//! built on top of it. Positions are 1-based and count bytes, and every line
//! break form (`\n`, `\r`, `\r\n`) is a single newline event.

use crate::Result;

/// Outcome of one call to a [`Scanner::take`] producer.
pub(crate) enum Step {
    /// Append this byte and keep going
    Emit(u8),
    /// Finish the take without consuming anything more
    Stop,
}

pub(crate) struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Scanner {
            buf,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub(crate) fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current byte, or `0` past the end of the buffer.
    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.look_ahead(0)
    }

    #[inline]
    pub(crate) fn look_ahead(&self, offset: usize) -> u8 {
        self.buf.get(self.pos + offset).copied().unwrap_or(0)
    }

    /// Consumes one byte (or one line break) and returns what was under the
    /// cursor. Stays in place at the end of the buffer.
    pub(crate) fn advance(&mut self) -> u8 {
        let previous = self.peek();
        match previous {
            b'\n' | b'\r' => {
                self.handle_newline();
            }
            _ if self.is_eof() => {}
            _ => {
                self.pos += 1;
                self.column += 1;
            }
        }
        previous
    }

    pub(crate) fn consume(&mut self, byte: u8) -> bool {
        if !self.is_eof() && self.peek() == byte {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes one line break if the cursor is on one.
    pub(crate) fn handle_newline(&mut self) -> bool {
        let mut was_newline = false;
        if self.peek() == b'\r' {
            self.pos += 1;
            was_newline = true;
        }
        if self.peek() == b'\n' {
            self.pos += 1;
            was_newline = true;
        }
        if was_newline {
            self.line += 1;
            self.column = 1;
        }
        was_newline
    }

    /// Accumulates bytes from `produce` until it stops, errors, or the buffer
    /// ends.
    pub(crate) fn take<F>(&mut self, mut produce: F) -> Result<Vec<u8>>
    where
        F: FnMut(&mut Self) -> Result<Step>,
    {
        let mut out = Vec::new();
        while !self.is_eof() {
            match produce(self)? {
                Step::Emit(byte) => out.push(byte),
                Step::Stop => break,
            }
        }
        Ok(out)
    }

    pub(crate) fn take_while<F>(&mut self, mut pred: F) -> &'a [u8]
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while !self.is_eof() && pred(self.peek()) {
            self.advance();
        }
        &self.buf[start..self.pos]
    }

    pub(crate) fn take_until<F>(&mut self, mut pred: F) -> &'a [u8]
    where
        F: FnMut(u8) -> bool,
    {
        self.take_while(|byte| !pred(byte))
    }

    pub(crate) fn skip_spaces(&mut self) {
        self.take_while(|byte| byte == b' ');
    }
}
