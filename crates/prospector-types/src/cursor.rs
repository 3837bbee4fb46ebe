use thiserror::Error;

/// Returned when a read asks for more bytes than the cursor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("needed {needed} bytes, {available} available")]
pub struct Truncated {
    pub needed: usize,
    pub available: usize,
}

/// A read cursor over a borrowed byte slice.
///
/// The slice is never mutated; the position is the only state. Reads that fail
/// leave the position untouched, and [`ByteCursor::transaction`] extends that
/// guarantee to a whole sequence of reads.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Truncated> {
        let available = self.remaining();
        if available < n {
            return Err(Truncated {
                needed: n,
                available,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Take exactly one byte.
    pub fn take_u8(&mut self) -> Result<u8, Truncated> {
        let byte = self.peek_u8().ok_or(Truncated {
            needed: 1,
            available: 0,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Skip everything that is left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.pos = self.buf.len();
        rest
    }

    /// Run `f` against this cursor, rolling the position back if it fails.
    pub fn transaction<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let mark = self.pos;
        let result = f(self);
        if result.is_err() {
            self.pos = mark;
        }
        result
    }
}
