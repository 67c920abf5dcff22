//! This library provides a threaded engine for record-oriented brute-force and
//! dictionary attacks. Candidate records are drawn from a
//! [`Source`](source::Source) — a lazy enumeration over an alphabet
//! ([`BruteForceSource`](source::BruteForceSource)), a newline-delimited word
//! list ([`WordlistSource`](source::WordlistSource)) or a previously written
//! record file ([`RecordFileSource`](source::RecordFileSource)) — and handed in
//! blocks to a pool of worker threads. Every worker classifies records with a
//! caller-supplied [`Checker`](attack::Checker) and the engine stops as soon as
//! one of them reports a match. Derived per-record artifacts can be captured
//! into a record file through a [`Sink`](sink::Sink).
//!
//! All sources speak in *records*: fixed-width byte strings, padded with
//! trailing `NUL` bytes inside their slot. Blocks always end on a record
//! boundary, and ownership of a block moves from the source through the
//! bounded queue to exactly one worker, which returns it to the source for
//! recycling.
//!
//! # Example: a small brute-force attack
//!
//! ```
//! use brute_io::attack::{Attack, Verdict};
//! use brute_io::source::BruteForceSource;
//!
//! let source = BruteForceSource::new(
//!     b"a", b"zzzz", b"abcdefghijklmnopqrstuvwxyz", 1024,
//! ).unwrap();
//!
//! let attack = Attack::build(source)
//!     .workers(2)
//!     .start(|record: &[u8], _out: Option<&mut [u8]>| {
//!         // records are padded to the width of `end` plus a NUL terminator
//!         if record == &b"crab\0"[..] {
//!             Verdict::Match
//!         } else {
//!             Verdict::NoMatch
//!         }
//!     })
//!     .unwrap();
//!
//! let status = attack.join();
//! assert_eq!(status.result.as_deref(), Some(&b"crab\0"[..]));
//! ```
//!
//! # Example: watching a running attack
//!
//! An attack runs on its own threads; the handle can be polled from anywhere.
//! [`Attack::check`](attack::Attack::check) keeps filling the snapshot and
//! reports [`Error::Stopped`](error::Error::Stopped) once the attack is over:
//!
//! ```no_run
//! use std::{thread, time::Duration};
//! use brute_io::attack::{Attack, Status, Verdict};
//! use brute_io::source::BruteForceSource;
//!
//! let source = BruteForceSource::new(
//!     b"a", b"zzzzzz", b"abcdefghijklmnopqrstuvwxyz", 4096,
//! ).unwrap();
//! let attack = Attack::build(source)
//!     .workers(8)
//!     .start(|_: &[u8], _: Option<&mut [u8]>| Verdict::NoMatch)
//!     .unwrap();
//!
//! let mut status = Status::default();
//! while attack.check(&mut status).is_ok() {
//!     println!("{} / {} records", status.records_tested, status.total_records);
//!     thread::sleep(Duration::from_millis(500));
//! }
//! ```
//!
//! # Building dictionaries
//!
//! The [`dict`](dict) module wires a word list to a record-file sink, turning
//! plain text into the binary record format in one attack run.

extern crate buffer_redux;
extern crate memchr;

#[macro_use]
extern crate serde_derive;
extern crate serde;

use std::path::Path;

pub mod attack;
pub mod block;
pub mod dict;
pub mod error;
pub mod format;
pub mod prelude;
pub mod queue;
pub mod sink;
pub mod source;

/// Maximum number of worker threads per attack.
pub const MAX_THREADS: usize = 4096;

/// Maximum accepted file path length in bytes.
pub const MAX_FILE_PATH_LEN: usize = 255;

/// Remove a final '\r' from a byte slice
#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}

/// Remove a final newline (and any '\r' preceding it) from a byte slice
#[inline]
pub(crate) fn trim_newline(line: &[u8]) -> &[u8] {
    if let Some((&b'\n', remaining)) = line.split_last() {
        trim_cr(remaining)
    } else {
        line
    }
}

pub(crate) fn check_path(path: &Path) -> Result<(), error::Error> {
    if path.as_os_str().len() > MAX_FILE_PATH_LEN {
        return Err(error::Error::invalid_input("file path is too long"));
    }
    Ok(())
}
