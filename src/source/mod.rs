//! Record sources: lazy, finite producers of fixed-width record blocks.

mod brute;
mod file;
mod wordlist;

pub use self::brute::BruteForceSource;
pub use self::file::RecordFileSource;
pub use self::wordlist::WordlistSource;

use crate::block::Block;
use crate::error::Error;

/// A lazy, finite producer of record blocks.
///
/// During an attack the source lives behind a mutex: the feeder thread holds
/// it across `open`, `next_block` and `close`, while workers re-enter only
/// through [`free_block`](Source::free_block). Every block handed out by
/// [`next_block`](Source::next_block) is returned through `free_block`
/// exactly once.
pub trait Source: Send {
    /// Opens the source and returns the exact number of records it will
    /// emit.
    fn open(&mut self) -> Result<u64, Error>;

    /// Produces the next block of records, or `None` once the source is
    /// exhausted.
    ///
    /// Every returned block is non-empty and an integral multiple of
    /// [`record_size`](Source::record_size) bytes long.
    fn next_block(&mut self) -> Result<Option<Block>, Error>;

    /// Takes a spent block back for recycling.
    fn free_block(&mut self, block: Block);

    /// Closes the source, releasing any underlying file.
    fn close(&mut self) -> Result<(), Error>;

    /// Width of one record in bytes. Meaningful once the source is open.
    fn record_size(&self) -> usize;

    /// Upper bound of records per produced block.
    fn records_per_block(&self) -> usize;
}
