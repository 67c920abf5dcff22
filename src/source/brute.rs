//! Brute-force record generation over an ordered alphabet.

use memchr::memchr;

use crate::block::{Block, BlockPool};
use crate::error::Error;
use crate::source::Source;

/// An ordered sequence of distinct bytes defining the enumeration radix.
#[derive(Debug, Clone)]
struct Alphabet(Vec<u8>);

impl Alphabet {
    fn new(chars: &[u8]) -> Result<Alphabet, Error> {
        if chars.is_empty() {
            return Err(Error::invalid_input("alphabet is empty"));
        }
        for (i, &c) in chars.iter().enumerate() {
            if memchr(c, &chars[..i]).is_some() {
                return Err(Error::invalid_input("alphabet contains duplicate characters"));
            }
        }
        Ok(Alphabet(chars.to_vec()))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    /// Position of `c` within the alphabet order.
    fn rank(&self, c: u8) -> Option<usize> {
        memchr(c, &self.0)
    }

    fn first(&self) -> u8 {
        self.0[0]
    }

    fn last(&self) -> u8 {
        self.0[self.0.len() - 1]
    }

    /// Next character in alphabet order. `c` must be a non-maximal alphabet
    /// character; enumerated records only ever contain validated characters.
    fn succ(&self, c: u8) -> u8 {
        self.0[self.rank(c).unwrap() + 1]
    }

    fn ranks_of(&self, s: &[u8], what: &'static str) -> Result<Vec<usize>, Error> {
        s.iter()
            .map(|&c| self.rank(c).ok_or(()))
            .collect::<Result<_, _>>()
            .map_err(|_| Error::invalid_input(what))
    }
}

/// Enumerates, in alphabet order, every string of length
/// `start.len()..=end.len()` that lies between `start` and `end` inclusive.
///
/// Records are `end.len() + 1` bytes wide and padded with trailing NULs, so
/// shorter strings stay distinguishable by their terminator. The total
/// record count is computed exactly at open time, without enumerating.
///
/// # Example
///
/// ```
/// use brute_io::source::{BruteForceSource, Source};
///
/// let mut source = BruteForceSource::new(b"a", b"bb", b"ab", 16).unwrap();
/// assert_eq!(source.open().unwrap(), 6);
///
/// let block = source.next_block().unwrap().unwrap();
/// let records: Vec<&[u8]> = block.records(source.record_size()).collect();
/// assert_eq!(
///     records,
///     [b"a\0\0", b"b\0\0", b"aa\0", b"ab\0", b"ba\0", b"bb\0"],
/// );
/// ```
#[derive(Debug)]
pub struct BruteForceSource {
    start: Vec<u8>,
    end: Vec<u8>,
    alphabet: Alphabet,
    /// Previous emitted record; empty until the first emission.
    last: Vec<u8>,
    record_size: usize,
    records_per_block: usize,
    pool: BlockPool,
}

impl BruteForceSource {
    /// Creates an enumeration from `start` to `end` over `alphabet`.
    ///
    /// Fails with an invalid-input error if `start` is longer than `end`,
    /// either endpoint uses a character outside the alphabet, or the
    /// endpoints have equal length but `start` orders after `end`.
    pub fn new(
        start: &[u8],
        end: &[u8],
        alphabet: &[u8],
        records_per_block: usize,
    ) -> Result<BruteForceSource, Error> {
        if records_per_block == 0 {
            return Err(Error::invalid_input("records_per_block is zero"));
        }
        if start.is_empty() {
            return Err(Error::invalid_input("start is empty"));
        }
        if start.len() > end.len() {
            return Err(Error::invalid_input("start is longer than end"));
        }
        let alphabet = Alphabet::new(alphabet)?;
        let start_ranks = alphabet.ranks_of(start, "start contains a character outside the alphabet")?;
        let end_ranks = alphabet.ranks_of(end, "end contains a character outside the alphabet")?;
        if start.len() == end.len() && start_ranks > end_ranks {
            return Err(Error::invalid_input("start orders after end"));
        }
        Ok(BruteForceSource {
            start: start.to_vec(),
            record_size: end.len() + 1,
            end: end.to_vec(),
            alphabet,
            last: Vec::new(),
            records_per_block,
            pool: BlockPool::new(),
        })
    }

    /// Advances `last` to its successor. Returns `false` once the space is
    /// exhausted.
    fn advance(&mut self) -> bool {
        if self.last == self.end {
            return false;
        }
        // rightmost position not already at the alphabet maximum
        match self.last.iter().rposition(|&c| c != self.alphabet.last()) {
            Some(i) => {
                self.last[i] = self.alphabet.succ(self.last[i]);
                for c in &mut self.last[i + 1..] {
                    *c = self.alphabet.first();
                }
            }
            None => {
                if self.last.len() >= self.end.len() {
                    return false;
                }
                let longer = self.last.len() + 1;
                self.last.clear();
                self.last.resize(longer, self.alphabet.first());
            }
        }
        true
    }
}

impl Source for BruteForceSource {
    fn open(&mut self) -> Result<u64, Error> {
        let radix = self.alphabet.len() as u64;
        let start_ranks = self.alphabet.ranks_of(&self.start, "start")?;
        let end_ranks = self.alphabet.ranks_of(&self.end, "end")?;

        // the start record itself
        let mut total: u64 = 1;
        // records needed to exhaust start's length, from start upward
        for (i, &rank) in start_ranks.iter().enumerate() {
            let gap = radix - 1 - rank as u64;
            let weight = radix.saturating_pow((self.start.len() - 1 - i) as u32);
            total = total.saturating_add(gap.saturating_mul(weight));
        }
        // every string of each length in between
        for len in self.start.len() + 1..=self.end.len() {
            total = total.saturating_add(radix.saturating_pow(len as u32));
        }
        // minus the tail beyond end
        for (i, &rank) in end_ranks.iter().enumerate() {
            let gap = radix - 1 - rank as u64;
            let weight = radix.saturating_pow((self.end.len() - 1 - i) as u32);
            total = total.saturating_sub(gap.saturating_mul(weight));
        }

        self.last.clear();
        Ok(total)
    }

    fn next_block(&mut self) -> Result<Option<Block>, Error> {
        let record_size = self.record_size;
        let capacity = record_size * self.records_per_block;
        let mut block = self.pool.take(capacity);
        // the block is zero-filled, so every record keeps its NUL padding
        block.data.resize(capacity, 0);
        let mut filled = 0;

        if self.last.is_empty() {
            self.last.extend_from_slice(&self.start);
            block.data[..self.last.len()].copy_from_slice(&self.last);
            filled += record_size;
        }

        while filled < capacity {
            if !self.advance() {
                break;
            }
            block.data[filled..filled + self.last.len()].copy_from_slice(&self.last);
            filled += record_size;
        }

        if filled == 0 {
            self.pool.put(block);
            return Ok(None);
        }
        block.data.truncate(filled);
        Ok(Some(block))
    }

    fn free_block(&mut self, block: Block) {
        self.pool.put(block);
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn records_per_block(&self) -> usize {
        self.records_per_block
    }
}
