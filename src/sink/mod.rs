//! Record sinks: append-only destinations for derived records.

mod file;

pub use self::file::RecordFileSink;

use crate::error::Error;

/// An append-only destination for fixed-width records.
///
/// Sinks share the shape of [`Source`](crate::source::Source) but never hand
/// out blocks, so there is nothing to free: the bytes written through
/// [`write_block`](Sink::write_block) stay owned by the caller. During an
/// attack the sink lives behind a mutex held across every write.
pub trait Sink: Send {
    /// Opens (or creates) the destination.
    fn open(&mut self) -> Result<(), Error>;

    /// Appends the whole buffer, looping over partial writes.
    fn write_block(&mut self, buf: &[u8]) -> Result<(), Error>;

    /// Closes the destination, flushing it.
    fn close(&mut self) -> Result<(), Error>;

    /// Width of one record in bytes.
    fn record_size(&self) -> usize;
}
