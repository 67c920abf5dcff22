//! Building record-file dictionaries from word lists.
//!
//! A dictionary build is just an attack with a copying checker: every word
//! of the list is read as a record, copied into the derived-record slot and
//! reported as no-match, so the run writes the whole list into a record
//! file and never stops early.

use std::path::Path;

use crate::attack::{Attack, Verdict};
use crate::error::Error;
use crate::sink::RecordFileSink;
use crate::source::{Source, WordlistSource};

/// Records per block used by the dictionary builder.
const WORDS_PER_BLOCK: usize = 4096;

/// Starts an attack that copies every word of the list at `words` into the
/// record file at `dict`, creating it or appending to a compatible one.
///
/// A `record_size` of zero sizes records from the longest word in the list.
/// The returned attack is already running; callers usually just
/// [`join`](Attack::join) it.
pub fn make_dict<P, Q>(
    words: P,
    dict: Q,
    file_order: u32,
    workers: usize,
    record_size: usize,
) -> Result<Attack, Error>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut list = WordlistSource::new(words, record_size, WORDS_PER_BLOCK)?;
    if record_size == 0 {
        // one early pass to learn the record width the sink must declare
        list.open()?;
        list.close()?;
    }
    let sink = RecordFileSink::new(dict, b"", file_order, list.record_size())?;
    Attack::build(list).workers(workers).sink(sink).start(copy_word)
}

fn copy_word(record: &[u8], derived: Option<&mut [u8]>) -> Verdict {
    if let Some(derived) = derived {
        let n = record.len().min(derived.len());
        derived[..n].copy_from_slice(&record[..n]);
    }
    Verdict::NoMatch
}
