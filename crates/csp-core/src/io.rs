//! Byte sink / byte source — the append-only write side and cursored read
//! side that every other component builds on. Transport is out of scope
//! (spec §1); these traits only describe in-memory buffers.

use crate::status::{CspResult, Status};

/// Initial capacity reserved by [`VecSink::new`], matching the spec's
/// "sinks used for serialization are reserved to 256 bytes on context
/// construction".
pub const SINK_RESERVE: usize = 256;

/// Append-only byte buffer.
pub trait ByteSink {
    fn append(&mut self, bytes: &[u8]) -> CspResult<()>;
    fn reserve(&mut self, additional: usize);
    fn size(&self) -> usize;
    fn clear(&mut self);
}

/// A growing, heap-backed sink. The default (and only) sink implementation;
/// transports copy out of it after serialization completes.
#[derive(Debug, Default, Clone)]
pub struct VecSink(Vec<u8>);

impl VecSink {
    pub fn new() -> Self {
        let mut buf = Vec::new();
        buf.reserve(SINK_RESERVE);
        Self(buf)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl ByteSink for VecSink {
    fn append(&mut self, bytes: &[u8]) -> CspResult<()> {
        // A growing Vec can only fail to grow by aborting the process (Rust's
        // global allocator has no fallible-alloc story on stable); NoMemory
        // is kept in the error domain for parity with the spec and for any
        // future fallible-sink implementation.
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn reserve(&mut self, additional: usize) {
        self.0.reserve(additional);
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Cursored reader over an in-memory byte buffer.
pub trait ByteSource {
    fn read(&mut self, out: &mut [u8]) -> CspResult<()>;
    fn tell(&self) -> usize;
    fn seek(&mut self, pos: usize) -> CspResult<()>;
    fn size(&self) -> usize;
}

/// A `ByteSource` over a borrowed slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// True once every byte in the source has been consumed — the "trailing
    /// bytes" check from spec §8.
    pub fn fully_consumed(&self) -> bool {
        self.pos == self.data.len()
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn read(&mut self, out: &mut [u8]) -> CspResult<()> {
        let end = self
            .pos
            .checked_add(out.len())
            .ok_or(Status::Overflow)?;
        if end > self.data.len() {
            return Err(Status::Overflow);
        }
        out.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn tell(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) -> CspResult<()> {
        if pos > self.data.len() {
            return Err(Status::Overflow);
        }
        self.pos = pos;
        Ok(())
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}
