//! Word lists: newline-delimited text read as fixed-width records.

use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use buffer_redux::BufReader;

use crate::block::{Block, BlockPool};
use crate::error::Error;
use crate::source::Source;

/// Reads a newline-delimited word list as NUL-padded fixed-width records.
///
/// A record size of zero asks the source to size records itself: `open`
/// scans the file once and settles on the longest line plus one byte for
/// the NUL terminator. Empty lines are skipped; a line that does not fit
/// the configured slot makes `next_block` fail with
/// [`Error::RecordSizeInvalid`].
pub struct WordlistSource {
    path: PathBuf,
    record_size: usize,
    records_per_block: usize,
    reader: Option<BufReader<File>>,
    line: Vec<u8>,
    pool: BlockPool,
}

impl WordlistSource {
    /// Creates a word-list source. `record_size` of zero auto-sizes at open
    /// time.
    pub fn new<P: AsRef<Path>>(
        path: P,
        record_size: usize,
        records_per_block: usize,
    ) -> Result<WordlistSource, Error> {
        crate::check_path(path.as_ref())?;
        if records_per_block == 0 {
            return Err(Error::invalid_input("records_per_block is zero"));
        }
        Ok(WordlistSource {
            path: path.as_ref().to_path_buf(),
            record_size,
            records_per_block,
            reader: None,
            line: Vec::new(),
            pool: BlockPool::new(),
        })
    }

    /// One pass over the file: the length of the longest line and the number
    /// of non-empty lines.
    fn scan(&mut self) -> Result<(usize, u64), Error> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut longest = 0;
        let mut words = 0u64;
        loop {
            self.line.clear();
            if reader.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }
            let word = crate::trim_newline(&self.line);
            if word.is_empty() {
                continue;
            }
            longest = longest.max(word.len());
            words += 1;
        }
        Ok((longest, words))
    }
}

impl Source for WordlistSource {
    fn open(&mut self) -> Result<u64, Error> {
        let (longest, words) = self.scan()?;
        if self.record_size == 0 {
            self.record_size = longest + 1;
        }
        self.reader = Some(BufReader::new(File::open(&self.path)?));
        Ok(words)
    }

    fn next_block(&mut self) -> Result<Option<Block>, Error> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Err(Error::invalid_input("source is not open")),
        };
        let record_size = self.record_size;
        let capacity = record_size * self.records_per_block;
        let mut block = self.pool.take(capacity);
        block.data.resize(capacity, 0);
        let mut filled = 0;

        while filled < capacity {
            self.line.clear();
            if reader.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }
            let word = crate::trim_newline(&self.line);
            if word.is_empty() {
                continue;
            }
            if word.len() > record_size - 1 {
                self.pool.put(block);
                return Err(Error::RecordSizeInvalid {
                    size: word.len(),
                    limit: record_size - 1,
                });
            }
            block.data[filled..filled + word.len()].copy_from_slice(word);
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
        self.reader = None;
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn records_per_block(&self) -> usize {
        self.records_per_block
    }
}
