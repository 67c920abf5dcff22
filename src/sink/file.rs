//! Writing record files.

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::format::Header;
use crate::sink::Sink;

/// Appends fixed-width records to a record file.
///
/// A missing file is created with a fresh header; an existing one is opened
/// and its header checked for compatibility. The sink adopts the file's
/// record size when it is at least as wide as the declared one and fails
/// with [`Error::RecordSizeInvalid`] when it is narrower.
pub struct RecordFileSink {
    path: PathBuf,
    description: Vec<u8>,
    file_order: u32,
    record_size: usize,
    file: Option<File>,
}

impl RecordFileSink {
    /// Creates a sink writing `record_size`-byte records to the record file
    /// at `path`.
    pub fn new<P: AsRef<Path>>(
        path: P,
        description: &[u8],
        file_order: u32,
        record_size: usize,
    ) -> Result<RecordFileSink, Error> {
        crate::check_path(path.as_ref())?;
        if record_size == 0 || record_size > u16::MAX as usize {
            return Err(Error::RecordSizeInvalid {
                size: record_size,
                limit: u16::MAX as usize,
            });
        }
        // validates length and NUL-freeness up front
        Header::new(description, file_order, record_size as u16)?;
        Ok(RecordFileSink {
            path: path.as_ref().to_path_buf(),
            description: description.to_vec(),
            file_order,
            record_size,
            file: None,
        })
    }
}

impl Sink for RecordFileSink {
    fn open(&mut self) -> Result<(), Error> {
        let file = match fs::metadata(&self.path) {
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                let mut file = File::create(&self.path)?;
                let header = Header::new(&self.description, self.file_order, self.record_size as u16)?;
                header.write_to(&mut file)?;
                file
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {
                let mut file = File::options().read(true).write(true).open(&self.path)?;
                let header = Header::read_from(&mut file)?;
                header.expect_matches(&self.description, self.file_order)?;
                if (header.record_size() as usize) < self.record_size {
                    return Err(Error::RecordSizeInvalid {
                        size: self.record_size,
                        limit: header.record_size() as usize,
                    });
                }
                // the file's records may be wider than ours; adopt its width
                self.record_size = header.record_size() as usize;
                file.seek(SeekFrom::End(0))?;
                file
            }
        };
        self.file = Some(file);
        Ok(())
    }

    fn write_block(&mut self, buf: &[u8]) -> Result<(), Error> {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(Error::invalid_input("sink is not open")),
        };
        let mut written = 0;
        let mut attempts = 0;
        while written < buf.len() {
            // a stream that keeps accepting zero bytes must not spin forever
            attempts += 1;
            if attempts > buf.len() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "no progress writing record block",
                )));
            }
            match file.write(&buf[written..]) {
                Ok(n) => written += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }
}
