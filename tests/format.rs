extern crate brute_io;

use brute_io::error::{Error, HeaderField};
use brute_io::format::{Header, DESCRIPTION_LEN, HEADER_LEN, MAGIC};

#[test]
fn round_trip() {
    let header = Header::new(b"test dictionary", 7, 16).unwrap();
    let mut raw = vec![];
    header.write_to(&mut raw).unwrap();
    assert_eq!(raw.len(), HEADER_LEN);

    let decoded = Header::read_from(&raw[..]).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(decoded.description(), b"test dictionary");
    assert_eq!(decoded.file_order(), 7);
    assert_eq!(decoded.record_size(), 16);
    decoded.expect_matches(b"test dictionary", 7).unwrap();
}

#[test]
fn layout_is_fixed() {
    let header = Header::new(b"abc", 0x0102_0304, 0x0506).unwrap();
    let mut raw = vec![];
    header.write_to(&mut raw).unwrap();

    // network byte order throughout
    assert_eq!(&raw[0..4], &MAGIC.to_be_bytes());
    assert_eq!(&raw[4..8], b"abc\0");
    assert_eq!(&raw[260..264], &[1, 2, 3, 4]);
    assert_eq!(&raw[264..266], &[5, 6]);
    assert_eq!(&raw[266..268], &[0, 0]);
}

#[test]
fn corrupt_magic_is_rejected() {
    let header = Header::new(b"x", 1, 4).unwrap();
    let mut raw = vec![];
    header.write_to(&mut raw).unwrap();
    raw[0] ^= 0xFF;

    match Header::read_from(&raw[..]) {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Magic),
        other => panic!("expected magic mismatch, got {:?}", other),
    }
}

#[test]
fn mismatches_are_reported_by_field() {
    let header = Header::new(b"words", 3, 8).unwrap();

    match header.expect_matches(b"words", 4) {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Order),
        other => panic!("expected order mismatch, got {:?}", other),
    }
    match header.expect_matches(b"word", 3) {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Description),
        other => panic!("expected description mismatch, got {:?}", other),
    }
    match header.expect_matches(b"sdrow", 3) {
        Err(Error::FileInvalid { field }) => assert_eq!(field, HeaderField::Description),
        other => panic!("expected description mismatch, got {:?}", other),
    }
}

#[test]
fn truncated_header_is_an_io_error() {
    let header = Header::new(b"x", 1, 4).unwrap();
    let mut raw = vec![];
    header.write_to(&mut raw).unwrap();
    raw.truncate(HEADER_LEN - 1);

    match Header::read_from(&raw[..]) {
        Err(Error::Io(_)) => {}
        other => panic!("expected io error, got {:?}", other),
    }
}

#[test]
fn description_must_fit_with_its_terminator() {
    let longest = vec![b'a'; DESCRIPTION_LEN - 1];
    Header::new(&longest, 0, 1).unwrap();

    let too_long = vec![b'a'; DESCRIPTION_LEN];
    assert!(Header::new(&too_long, 0, 1).is_err());
    assert!(Header::new(b"nul\0inside", 0, 1).is_err());
}
