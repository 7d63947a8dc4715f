//! Sniffable input stream.
//!
//! Codec selection needs to inspect the first bytes of a stream without
//! consuming them, and a failed header parse or payload decode must leave
//! the stream in a terminal failed state so later operations cannot read
//! partially-consumed data. [`ImageSource`] provides both on top of any
//! [`Read`].

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Number of leading bytes a codec's sniff predicate may inspect.
pub const MAGIC_PREFIX_LEN: usize = 32;

/// Input stream adapter with prefix peeking and a poison latch.
pub struct ImageSource<R> {
    inner: R,
    prefix: [u8; MAGIC_PREFIX_LEN],
    /// Bytes of `prefix` that are filled.
    buffered: usize,
    /// Bytes of `prefix` already handed back out through `read`.
    replayed: usize,
    poisoned: bool,
}

impl<R: Read> ImageSource<R> {
    /// Wrap an open stream.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            prefix: [0; MAGIC_PREFIX_LEN],
            buffered: 0,
            replayed: 0,
            poisoned: false,
        }
    }

    /// The fixed-size leading prefix, without consuming it.
    ///
    /// Streams holding fewer than [`MAGIC_PREFIX_LEN`] bytes fail with
    /// [`Error::BadHeader`]. Idempotent until bytes are consumed through
    /// [`Read`].
    pub fn peek_prefix(&mut self) -> Result<&[u8; MAGIC_PREFIX_LEN]> {
        if self.poisoned {
            return Err(Error::Io(poisoned_error()));
        }
        if self.replayed != 0 {
            return Err(Error::internal("prefix peeked after consuming the stream"));
        }
        while self.buffered < MAGIC_PREFIX_LEN {
            let n = self.inner.read(&mut self.prefix[self.buffered..])?;
            if n == 0 {
                self.poisoned = true;
                return Err(Error::BadHeader { format: "?" });
            }
            self.buffered += n;
        }
        Ok(&self.prefix)
    }

    /// Latch the stream into its terminal failed state.
    pub(crate) fn poison(&mut self) {
        self.poisoned = true;
    }

    /// Whether a previous operation failed on this stream.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Unwrap the underlying stream. Any peeked-but-unconsumed prefix
    /// bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ImageSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.poisoned {
            return Err(poisoned_error());
        }
        if self.replayed < self.buffered {
            let pending = &self.prefix[self.replayed..self.buffered];
            let n = pending.len().min(buf.len());
            buf[..n].copy_from_slice(&pending[..n]);
            self.replayed += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

fn poisoned_error() -> io::Error {
    io::Error::other("image stream is in a failed state after a previous error")
}
