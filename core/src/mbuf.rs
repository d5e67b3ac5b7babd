// ## 📂 File: `src/mbuf.rs`

//! Packet buffers as seen by the job builder.
//!
//! Design notes:
//! - A segment is a shared byte vector (`BufHandle`). Cloning a handle never
//!   copies bytes, so a job and the operation that owns it address the same memory.
//! - `BufPtr` is the only address type: a handle plus a byte offset. Address
//!   comparisons are only defined between pointers into the same handle.
//! - `Mbuf` is an ordered segment chain. Every segment's `data_len` is the
//!   length of its vector.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Access past the end of a segment.
    #[error("buffer access out of bounds: offset={offset} len={len} size={size}")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    /// Segment chain ended before the requested offset.
    #[error("segment chain too short for offset {offset}")]
    MissingSegment { offset: usize },
}

/// Shared, interior-mutable byte segment.
#[derive(Clone, Default)]
pub struct BufHandle(Arc<Mutex<Vec<u8>>>);

impl fmt::Debug for BufHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufHandle({} bytes)", self.len())
    }
}

impl BufHandle {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    /// Zero-filled segment.
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![0u8; len])
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A poisoned segment still holds valid bytes.
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &BufHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn at(&self, offset: usize) -> BufPtr {
        BufPtr { buf: self.clone(), offset }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>, BufferError> {
        let data = self.lock();
        check_bounds(offset, len, data.len())?;
        Ok(data[offset..offset + len].to_vec())
    }

    pub fn write(&self, offset: usize, src: &[u8]) -> Result<(), BufferError> {
        let mut data = self.lock();
        check_bounds(offset, src.len(), data.len())?;
        data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Overwrite every byte with zero.
    pub fn wipe(&self) {
        let mut data = self.lock();
        data.iter_mut().for_each(|b| *b = 0);
    }

    /// Run `f` over `len` bytes at `offset` in place.
    pub fn with_mut<R>(
        &self,
        offset: usize,
        len: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, BufferError> {
        let mut data = self.lock();
        check_bounds(offset, len, data.len())?;
        Ok(f(&mut data[offset..offset + len]))
    }
}

fn check_bounds(offset: usize, len: usize, size: usize) -> Result<(), BufferError> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(BufferError::OutOfBounds { offset, len, size }),
    }
}

/// A byte address: segment handle plus offset.
#[derive(Clone, Debug)]
pub struct BufPtr {
    pub buf: BufHandle,
    pub offset: usize,
}

impl BufPtr {
    pub fn add(&self, n: usize) -> BufPtr {
        BufPtr { buf: self.buf.clone(), offset: self.offset + n }
    }

    pub fn read(&self, len: usize) -> Result<Vec<u8>, BufferError> {
        self.buf.read(self.offset, len)
    }

    pub fn write(&self, src: &[u8]) -> Result<(), BufferError> {
        self.buf.write(self.offset, src)
    }

    pub fn same_buffer(&self, other: &BufPtr) -> bool {
        self.buf.ptr_eq(&other.buf)
    }

    /// Copy `len` bytes from `self` to `dst`. Overlap inside one segment is handled.
    pub fn copy_to(&self, dst: &BufPtr, len: usize) -> Result<(), BufferError> {
        if len == 0 {
            return Ok(());
        }
        if self.same_buffer(dst) {
            let mut data = self.buf.lock();
            check_bounds(self.offset, len, data.len())?;
            check_bounds(dst.offset, len, data.len())?;
            data.copy_within(self.offset..self.offset + len, dst.offset);
            return Ok(());
        }
        let bytes = self.read(len)?;
        dst.write(&bytes)
    }
}

/// Multi-segment packet buffer.
#[derive(Clone, Debug, Default)]
pub struct Mbuf {
    segs: Vec<BufHandle>,
}

impl Mbuf {
    /// Single contiguous segment.
    pub fn contiguous(data: Vec<u8>) -> Self {
        Self { segs: vec![BufHandle::from_vec(data)] }
    }

    pub fn from_segments(segs: Vec<Vec<u8>>) -> Self {
        Self { segs: segs.into_iter().map(BufHandle::from_vec).collect() }
    }

    /// Split `data` into segments of the given lengths; the tail goes to the last segment.
    pub fn split(data: &[u8], seg_lens: &[usize]) -> Self {
        let mut segs = Vec::with_capacity(seg_lens.len() + 1);
        let mut pos = 0;
        for &len in seg_lens {
            let end = (pos + len).min(data.len());
            segs.push(data[pos..end].to_vec());
            pos = end;
        }
        if pos < data.len() {
            match segs.last_mut() {
                Some(last) => last.extend_from_slice(&data[pos..]),
                None => segs.push(data[pos..].to_vec()),
            }
        }
        Self::from_segments(segs)
    }

    pub fn from_handles(segs: Vec<BufHandle>) -> Self {
        Self { segs }
    }

    pub fn nb_segs(&self) -> usize {
        self.segs.len()
    }

    pub fn segments(&self) -> &[BufHandle] {
        &self.segs
    }

    pub fn seg(&self, idx: usize) -> Option<&BufHandle> {
        self.segs.get(idx)
    }

    pub fn pkt_len(&self) -> usize {
        self.segs.iter().map(BufHandle::len).sum()
    }

    /// Pointer into the first segment (no chain walk).
    pub fn mtod_offset(&self, offset: usize) -> Option<BufPtr> {
        self.segs.first().map(|s| s.at(offset))
    }

    pub fn mtod(&self) -> Option<BufPtr> {
        self.mtod_offset(0)
    }

    /// Same packet if both first segments are the same allocation.
    pub fn is_same(&self, other: &Mbuf) -> bool {
        match (self.segs.first(), other.segs.first()) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Walk the chain to the segment holding `offset`; returns `(segment index, offset in it)`.
    pub fn locate(&self, mut offset: usize) -> Result<(usize, usize), BufferError> {
        for (i, seg) in self.segs.iter().enumerate() {
            let len = seg.len();
            if offset < len {
                return Ok((i, offset));
            }
            offset -= len;
        }
        Err(BufferError::MissingSegment { offset })
    }

    /// Concatenated packet bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pkt_len());
        for seg in &self.segs {
            out.extend_from_slice(&seg.to_vec());
        }
        out
    }

    /// Read `len` bytes starting at packet offset `offset`, crossing segments.
    pub fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>, BufferError> {
        let all = self.to_vec();
        check_bounds(offset, len, all.len())?;
        Ok(all[offset..offset + len].to_vec())
    }
}
