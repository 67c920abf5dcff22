//! Owned blocks of fixed-width records and their recycling pool.

use std::slice;

/// Upper bound of spare blocks a pool keeps around.
const SPARE_LIMIT: usize = 32;

/// A contiguous buffer holding an integral number of fixed-width records.
///
/// A block is owned by exactly one component at a time: the source that
/// filled it, a queue entry, or the worker processing it. Handing it back to
/// [`Source::free_block`](crate::source::Source::free_block) recycles the
/// allocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    pub(crate) data: Vec<u8>,
}

impl Block {
    pub(crate) fn with_capacity(capacity: usize) -> Block {
        Block {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Length of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw block contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterates over the records of the block.
    #[inline]
    pub fn records(&self, record_size: usize) -> slice::Chunks<u8> {
        self.data.chunks(record_size)
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }
}

impl From<Vec<u8>> for Block {
    fn from(data: Vec<u8>) -> Block {
        Block { data }
    }
}

/// Spare-block freelist carried by every source.
///
/// `take` prefers a previously freed buffer over a fresh allocation, so the
/// steady state of an attack reuses a small, fixed set of blocks.
#[derive(Debug, Default)]
pub struct BlockPool {
    spare: Vec<Block>,
}

impl BlockPool {
    pub fn new() -> BlockPool {
        BlockPool::default()
    }

    /// Returns an empty block with at least `capacity` bytes reserved.
    pub fn take(&mut self, capacity: usize) -> Block {
        match self.spare.pop() {
            Some(mut block) => {
                block.data.reserve(capacity);
                block
            }
            None => Block::with_capacity(capacity),
        }
    }

    /// Accepts a spent block back for reuse.
    pub fn put(&mut self, mut block: Block) {
        if self.spare.len() < SPARE_LIMIT {
            block.clear();
            self.spare.push(block);
        }
    }
}
