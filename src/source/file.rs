//! Reading previously written record files.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::block::{Block, BlockPool};
use crate::error::Error;
use crate::format::{Header, DESCRIPTION_LEN, HEADER_LEN};
use crate::source::Source;

/// Reads a record file written by
/// [`RecordFileSink`](crate::sink::RecordFileSink).
///
/// The header is validated at open time: magic, file order and description
/// must match what the caller expects, and the record size is adopted from
/// the file. Records can be skipped from the front and capped in number.
pub struct RecordFileSource {
    path: PathBuf,
    description: Vec<u8>,
    file_order: u32,
    skip_records: u64,
    /// Caps the number of records read; 0 reads the whole file.
    max_records: u64,
    records_per_block: usize,
    record_size: usize,
    current_record: u64,
    file: Option<File>,
    pool: BlockPool,
}

impl RecordFileSource {
    /// Creates a source for the record file at `path`, expecting the given
    /// description and file order in its header.
    pub fn new<P: AsRef<Path>>(
        path: P,
        description: &[u8],
        file_order: u32,
        records_per_block: usize,
    ) -> Result<RecordFileSource, Error> {
        crate::check_path(path.as_ref())?;
        if records_per_block == 0 {
            return Err(Error::invalid_input("records_per_block is zero"));
        }
        if description.len() >= DESCRIPTION_LEN {
            return Err(Error::invalid_input("description is too long"));
        }
        Ok(RecordFileSource {
            path: path.as_ref().to_path_buf(),
            description: description.to_vec(),
            file_order,
            skip_records: 0,
            max_records: 0,
            records_per_block,
            record_size: 0,
            current_record: 0,
            file: None,
            pool: BlockPool::new(),
        })
    }

    /// Skips the first `n` records, seeking past them after the header has
    /// been validated.
    pub fn skip_records(mut self, n: u64) -> RecordFileSource {
        self.skip_records = n;
        self
    }

    /// Caps the number of records read from the file. Zero reads everything.
    pub fn max_records(mut self, n: u64) -> RecordFileSource {
        self.max_records = n;
        self
    }
}

impl Source for RecordFileSource {
    fn open(&mut self) -> Result<u64, Error> {
        let mut file = File::open(&self.path)?;
        let header = Header::read_from(&mut file)?;
        header.expect_matches(&self.description, self.file_order)?;
        if header.record_size() == 0 {
            return Err(Error::RecordSizeInvalid {
                size: 0,
                limit: u16::MAX as usize,
            });
        }
        self.record_size = header.record_size() as usize;

        let total = if self.max_records > 0 {
            self.max_records
        } else {
            let len = file.metadata()?.len();
            len.saturating_sub(HEADER_LEN as u64) / self.record_size as u64
        };

        if self.skip_records > 0 {
            let offset = self.skip_records.saturating_mul(self.record_size as u64);
            file.seek(SeekFrom::Start(HEADER_LEN as u64 + offset))?;
        }

        self.current_record = 0;
        self.file = Some(file);
        Ok(total)
    }

    fn next_block(&mut self) -> Result<Option<Block>, Error> {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(Error::invalid_input("source is not open")),
        };
        let record_size = self.record_size;
        let mut records = self.records_per_block as u64;
        if self.max_records > 0 {
            records = records.min(self.max_records.saturating_sub(self.current_record));
        }
        if records == 0 {
            return Ok(None);
        }

        let want = record_size * records as usize;
        let mut block = self.pool.take(want);
        block.data.resize(want, 0);

        let mut filled = 0;
        while filled < want {
            match file.read(&mut block.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.pool.put(block);
                    return Err(e.into());
                }
            }
        }

        if filled == 0 {
            self.pool.put(block);
            return Ok(None);
        }
        if filled % record_size != 0 {
            self.pool.put(block);
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "record file ends in the middle of a record",
            )));
        }
        block.data.truncate(filled);
        self.current_record += (filled / record_size) as u64;
        Ok(Some(block))
    }

    fn free_block(&mut self, block: Block) {
        self.pool.put(block);
    }

    fn close(&mut self) -> Result<(), Error> {
        // dropping the handle closes the file
        self.file = None;
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn records_per_block(&self) -> usize {
        self.records_per_block
    }
}
