// ## 📂 File: `src/queue/scratch.rs`

//! queue/scratch.rs
//! Ring of scratch digest buffers.
//!
//! Verify jobs and jobs whose requested digest is shorter than the
//! accelerator's output write their tag here. Builders advance a local
//! index; the queue pair commits it once the round is submitted.

use crate::constants::DIGEST_LENGTH_MAX;
use crate::mbuf::{BufHandle, BufPtr};

#[derive(Debug)]
pub struct DigestScratchRing {
    slots: Vec<BufHandle>,
    index: usize,
}

impl DigestScratchRing {
    pub fn new(size: usize) -> Self {
        let slots = (0..size.max(1)).map(|_| BufHandle::zeroed(DIGEST_LENGTH_MAX)).collect();
        Self { slots, index: 0 }
    }

    /// Slot at `idx` and the index after it.
    pub fn slot(&self, idx: usize) -> (BufPtr, usize) {
        let i = idx % self.slots.len();
        (self.slots[i].at(0), (i + 1) % self.slots.len())
    }

    /// Committed index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn commit(&mut self, idx: usize) {
        self.index = idx % self.slots.len();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_wrap_around() {
        let ring = DigestScratchRing::new(3);
        let (a, next) = ring.slot(2);
        assert_eq!(next, 0);
        let (b, _) = ring.slot(next);
        assert!(!a.same_buffer(&b));
        let (c, _) = ring.slot(3);
        assert!(b.same_buffer(&c));
    }

    #[test]
    fn commit_is_reduced_modulo_size() {
        let mut ring = DigestScratchRing::new(4);
        ring.commit(6);
        assert_eq!(ring.index(), 2);
    }
}
