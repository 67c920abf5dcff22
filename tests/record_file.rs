extern crate brute_io;
extern crate tempfile;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use brute_io::error::{Error, HeaderField};
use brute_io::format::HEADER_LEN;
use brute_io::sink::{RecordFileSink, Sink};
use brute_io::source::{RecordFileSource, Source};

fn write_records(path: &Path, description: &[u8], order: u32, record_size: usize, records: &[&[u8]]) {
    let mut sink = RecordFileSink::new(path, description, order, record_size).unwrap();
    sink.open().unwrap();
    let mut buf = vec![];
    for record in records {
        assert_eq!(record.len(), record_size);
        buf.extend_from_slice(record);
    }
    sink.write_block(&buf).unwrap();
    sink.close().unwrap();
}

fn read_records(source: &mut RecordFileSource) -> Vec<Vec<u8>> {
    let record_size = source.record_size();
    let mut records = vec![];
    while let Some(block) = source.next_block().unwrap() {
        assert_eq!(block.len() % record_size, 0, "block not record aligned");
        for record in block.records(record_size) {
            records.push(record.to_vec());
        }
        source.free_block(block);
    }
    records
}

#[test]
fn round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"trip", 5, 4, &[b"aaa\0", b"bbb\0", b"ccc\0"]);

    let mut source = RecordFileSource::new(&path, b"trip", 5, 2).unwrap();
    assert_eq!(source.open().unwrap(), 3);
    assert_eq!(source.record_size(), 4);
    let expected: Vec<&[u8]> = vec![b"aaa\0", b"bbb\0", b"ccc\0"];
    assert_eq!(read_records(&mut source), expected);
    source.close().unwrap();
}

#[test]
fn appending_keeps_the_header_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"app", 1, 2, &[b"a\0", b"b\0"]);
    write_records(&path, b"app", 1, 2, &[b"c\0"]);

    let mut source = RecordFileSource::new(&path, b"app", 1, 8).unwrap();
    assert_eq!(source.open().unwrap(), 3);
    let expected: Vec<&[u8]> = vec![b"a\0", b"b\0", b"c\0"];
    assert_eq!(read_records(&mut source), expected);
}

#[test]
fn sink_adopts_a_wider_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"w", 9, 4, &[b"aaa\0"]);

    let mut sink = RecordFileSink::new(&path, b"w", 9, 3).unwrap();
    sink.open().unwrap();
    assert_eq!(sink.record_size(), 4);
    sink.close().unwrap();
}

#[test]
fn sink_refuses_a_narrower_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"w", 9, 4, &[b"aaa\0"]);

    let mut sink = RecordFileSink::new(&path, b"w", 9, 5).unwrap();
    match sink.open() {
        Err(Error::RecordSizeInvalid { size, limit }) => {
            assert_eq!(size, 5);
            assert_eq!(limit, 4);
        }
        other => panic!("expected record size error, got {:?}", other),
    }
}

#[test]
fn header_identity_must_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"mine", 2, 4, &[b"aaa\0"]);

    let mut source = RecordFileSource::new(&path, b"mine", 3, 8).unwrap();
    match source.open() {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Order),
        other => panic!("expected order mismatch, got {:?}", other),
    }

    let mut source = RecordFileSource::new(&path, b"yours", 2, 8).unwrap();
    match source.open() {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Description),
        other => panic!("expected description mismatch, got {:?}", other),
    }
}

#[test]
fn skip_records_starts_later() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"s", 0, 2, &[b"a\0", b"b\0", b"c\0", b"d\0"]);

    let mut source = RecordFileSource::new(&path, b"s", 0, 8)
        .unwrap()
        .skip_records(2);
    source.open().unwrap();
    let expected: Vec<&[u8]> = vec![b"c\0", b"d\0"];
    assert_eq!(read_records(&mut source), expected);
}

#[test]
fn max_records_caps_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"m", 0, 2, &[b"a\0", b"b\0", b"c\0", b"d\0"]);

    let mut source = RecordFileSource::new(&path, b"m", 0, 3)
        .unwrap()
        .max_records(2);
    assert_eq!(source.open().unwrap(), 2);
    let expected: Vec<&[u8]> = vec![b"a\0", b"b\0"];
    assert_eq!(read_records(&mut source), expected);
}

#[test]
fn a_truncated_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"t", 0, 4, &[b"aaa\0"]);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"xy").unwrap();
    drop(file);

    let mut source = RecordFileSource::new(&path, b"t", 0, 8).unwrap();
    source.open().unwrap();
    match source.next_block() {
        Err(Error::Io(_)) => {}
        other => panic!("expected io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn payload_starts_right_after_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_records(&path, b"o", 0, 4, &[b"abc\0", b"def\0"]);

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(raw.len(), HEADER_LEN + 8);
    assert_eq!(&raw[HEADER_LEN..HEADER_LEN + 4], b"abc\0");
}
