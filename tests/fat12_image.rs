//! End-to-end tests on synthetic FAT12 images built in memory.
//!
//! Run with: cargo test --test fat12_image

mod common;

use common::{DATA_OFFSET, Fat12Image, SECTOR_SIZE, pattern};
use fat12_inspect::filesystem::cluster_chain::ChainState;
use fat12_inspect::{ExtractMode, FATError, VolumeSession};
use std::io::Cursor;

fn open(image: &Fat12Image) -> (Cursor<Vec<u8>>, VolumeSession) {
    let mut cursor = Cursor::new(image.bytes());
    let session = VolumeSession::open(&mut cursor, 0, true).unwrap();
    (cursor, session)
}

#[test]
fn decodes_floppy_geometry() {
    let (_, session) = open(&Fat12Image::new());

    assert_eq!(*session.bpb().bytes_per_sec(), 512);
    assert_eq!(*session.bpb().root_ent_cnt(), 224);
    assert_eq!(session.fat().buf().len(), 9 * SECTOR_SIZE);
    assert_eq!(session.root_dir().slots().len(), 224);
    assert_eq!(session.entries().count(), 0);
    assert_eq!(session.fat().entry_of(0).unwrap(), 0xFF0);
    assert_eq!(session.fat().entry_of(1).unwrap(), 0xFFF);
}

#[test]
fn first_cluster_follows_root_directory() {
    let (_, session) = open(&Fat12Image::new());

    assert_eq!(session.cluster_address(2).unwrap(), 16896);
    assert_eq!(session.cluster_address(3).unwrap(), 16896 + 512);
    assert!(matches!(
        session.cluster_address(1),
        Err(FATError::InvalidCluster(1))
    ));
}

#[test]
fn extracts_file_spanning_two_clusters() {
    let content = pattern(2 * SECTOR_SIZE, 7);
    let mut image = Fat12Image::new();
    image.add_file(0, b"HELLO   ", b"TXT", &[2, 3], &content);

    let (mut cursor, session) = open(&image);

    let exact = session
        .read_file(&mut cursor, "HELLO.TXT", ExtractMode::Exact)
        .unwrap();
    assert_eq!(exact, content);

    let whole = session
        .read_file(&mut cursor, "HELLO.TXT", ExtractMode::WholeClusters)
        .unwrap();
    assert_eq!(whole, content);
}

#[test]
fn follows_non_contiguous_chain_in_fat_order() {
    let content = pattern(3 * SECTOR_SIZE, 1);
    let mut image = Fat12Image::new();
    image.add_file(0, b"SCATTER ", b"BIN", &[9, 2, 5], &content);

    let (mut cursor, session) = open(&image);
    let entry = session.find("SCATTER.BIN").unwrap();

    let clusters: Vec<u16> = session.chain(entry).map(Result::unwrap).collect();
    assert_eq!(clusters, vec![9, 2, 5]);
    assert_eq!(
        session
            .read_file(&mut cursor, "SCATTER.BIN", ExtractMode::Exact)
            .unwrap(),
        content
    );
}

#[test]
fn exact_mode_trims_last_cluster_and_raw_mode_keeps_slack() {
    let content = pattern(700, 3);
    let mut image = Fat12Image::new();
    image.add_file(0, b"NOTES   ", b"TXT", &[4, 5], &content);
    image.write_cluster(5, &content[SECTOR_SIZE..], 0xAA);

    let (mut cursor, session) = open(&image);

    let exact = session
        .read_file(&mut cursor, "NOTES.TXT", ExtractMode::Exact)
        .unwrap();
    assert_eq!(exact, content);

    let raw = session
        .read_file(&mut cursor, "NOTES.TXT", ExtractMode::WholeClusters)
        .unwrap();
    assert_eq!(raw.len(), 2 * SECTOR_SIZE);
    assert_eq!(&raw[..700], &content[..]);
    assert!(raw[700..].iter().all(|b| *b == 0xAA));
}

#[test]
fn stream_is_lazy_per_cluster_and_restartable() {
    let content = pattern(1100, 9);
    let mut image = Fat12Image::new();
    image.add_file(3, b"DATA    ", b"   ", &[6, 7, 8], &content);

    let (mut cursor, session) = open(&image);
    let mut stream = session
        .open_file(&mut cursor, "DATA", ExtractMode::Exact)
        .unwrap();

    assert_eq!(stream.state(), ChainState::Start);
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first, content[..512]);
    assert_eq!(stream.state(), ChainState::InChain(6));

    let sizes: Vec<usize> = stream.by_ref().map(|chunk| chunk.unwrap().len()).collect();
    assert_eq!(sizes, vec![512, 76]);
    assert!(stream.next().is_none());

    stream.rewind();
    assert_eq!(stream.read_to_end().unwrap(), content);
}

#[test]
fn missing_file_is_not_found() {
    let mut image = Fat12Image::new();
    image.add_file(0, b"HELLO   ", b"TXT", &[2], b"hello");

    let (mut cursor, session) = open(&image);

    assert!(matches!(
        session.read_file(&mut cursor, "MISSING.TXT", ExtractMode::Exact),
        Err(FATError::NotFound(name)) if name == "MISSING.TXT"
    ));
    assert!(matches!(
        session.open_file(&mut cursor, "hello.txt", ExtractMode::Exact),
        Err(FATError::NotFound(_))
    ));
}

#[test]
fn empty_file_yields_no_data() {
    let mut image = Fat12Image::new();
    image.set_dir_entry(0, b"EMPTY   ", b"   ", 0, 0);

    let (mut cursor, session) = open(&image);

    assert!(
        session
            .read_file(&mut cursor, "EMPTY", ExtractMode::Exact)
            .unwrap()
            .is_empty()
    );
    assert!(
        session
            .read_file(&mut cursor, "EMPTY", ExtractMode::WholeClusters)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn exhausted_stream_is_done_in_both_modes() {
    let mut image = Fat12Image::new();
    image.add_file(0, b"ONE     ", b"BIN", &[2], &pattern(300, 4));
    image.set_dir_entry(1, b"EMPTY   ", b"   ", 0, 0);

    let (mut cursor, session) = open(&image);

    for (name, mode, chunks) in [
        ("ONE.BIN", ExtractMode::Exact, 1),
        ("ONE.BIN", ExtractMode::WholeClusters, 1),
        ("EMPTY", ExtractMode::Exact, 0),
        ("EMPTY", ExtractMode::WholeClusters, 0),
    ] {
        let mut stream = session.open_file(&mut cursor, name, mode).unwrap();
        assert_eq!(stream.by_ref().count(), chunks, "{name} {mode:?}");
        assert_eq!(stream.state(), ChainState::Done, "{name} {mode:?}");
    }
}

#[test]
fn listing_skips_zero_named_slots() {
    let mut image = Fat12Image::new();
    image.add_file(0, b"FIRST   ", b"TXT", &[2], b"one");
    image.add_file(2, b"THIRD   ", b"   ", &[3], b"three");

    let (mut cursor, session) = open(&image);

    let names: Vec<String> = session.entries().map(|e| e.full_name()).collect();
    assert_eq!(names, vec!["FIRST.TXT", "THIRD"]);
    assert_eq!(
        session
            .read_file(&mut cursor, "THIRD", ExtractMode::Exact)
            .unwrap(),
        b"three"
    );
}

#[test]
fn volume_can_start_inside_the_image() {
    let content = pattern(600, 5);
    let mut image = Fat12Image::new();
    image.add_file(0, b"PART    ", b"DAT", &[2, 3], &content);

    let offset = 63 * SECTOR_SIZE;
    let mut bytes = vec![0u8; offset];
    bytes.extend(image.bytes());
    let mut cursor = Cursor::new(bytes);

    let session = VolumeSession::open(&mut cursor, offset as u64, true).unwrap();
    assert_eq!(
        session.cluster_address(2).unwrap(),
        (offset + DATA_OFFSET) as u64
    );
    assert_eq!(
        session
            .read_file(&mut cursor, "PART.DAT", ExtractMode::Exact)
            .unwrap(),
        content
    );
}

#[test]
fn truncated_fat_fails_to_open() {
    let bytes = Fat12Image::new().bytes();
    let mut cursor = Cursor::new(bytes[..2048].to_vec());

    assert!(matches!(
        VolumeSession::open(&mut cursor, 0, true),
        Err(FATError::TruncatedRead {
            offset: 512,
            length: 4608
        })
    ));
}

#[test]
fn truncated_root_directory_fails_to_open() {
    let bytes = Fat12Image::new().bytes();
    let mut cursor = Cursor::new(bytes[..10_000].to_vec());

    assert!(matches!(
        VolumeSession::open(&mut cursor, 0, true),
        Err(FATError::TruncatedRead {
            offset: 9728,
            length: 7168
        })
    ));
}

#[test]
fn read_failure_ends_the_stream() {
    let content = pattern(3 * SECTOR_SIZE, 2);
    let mut image = Fat12Image::new();
    image.add_file(0, b"BIG     ", b"BIN", &[2, 3, 17], &content);

    // Drop the last cluster of the data region.
    let bytes = image.bytes();
    let mut cursor = Cursor::new(bytes[..bytes.len() - SECTOR_SIZE].to_vec());
    let session = VolumeSession::open(&mut cursor, 0, true).unwrap();

    let mut stream = session
        .open_file(&mut cursor, "BIG.BIN", ExtractMode::Exact)
        .unwrap();
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().unwrap().is_ok());
    assert!(matches!(
        stream.next(),
        Some(Err(FATError::TruncatedRead { .. }))
    ));
    assert_eq!(stream.state(), ChainState::Error);
    assert!(stream.next().is_none());
}

#[test]
fn cyclic_chain_is_reported() {
    let mut image = Fat12Image::new();
    image.set_dir_entry(0, b"LOOP    ", b"   ", 2, 4096);
    image.set_fat_entry(2, 3).set_fat_entry(3, 2);

    let (mut cursor, session) = open(&image);

    assert!(matches!(
        session.read_file(&mut cursor, "LOOP", ExtractMode::WholeClusters),
        Err(FATError::ChainLoop(2))
    ));
}

#[test]
fn chain_shorter_than_file_size_yields_what_it_has() {
    let mut image = Fat12Image::new();
    image.write_cluster(2, b"short", 0);
    image.link(&[2]);
    image.set_dir_entry(0, b"LIAR    ", b"TXT", 2, 5000);

    let (mut cursor, session) = open(&image);

    let data = session
        .read_file(&mut cursor, "LIAR.TXT", ExtractMode::Exact)
        .unwrap();
    assert_eq!(data.len(), SECTOR_SIZE);
    assert_eq!(&data[..5], b"short");
}

#[test]
fn invalid_signature_fails_to_open() {
    let mut bytes = Fat12Image::new().bytes();
    bytes[511] = 0x00;
    let mut cursor = Cursor::new(bytes);

    assert!(matches!(
        VolumeSession::open(&mut cursor, 0, false),
        Err(FATError::InvalidSignature(0x0055))
    ));
}

#[test]
fn oversized_geometry_without_validation_is_truncated_read() {
    let mut bytes = Fat12Image::new().bytes()[..SECTOR_SIZE].to_vec();
    // bytes_per_sec and fat_sz_16 set to 0xFFFF
    bytes[11..13].copy_from_slice(&[0xFF, 0xFF]);
    bytes[22..24].copy_from_slice(&[0xFF, 0xFF]);
    let mut cursor = Cursor::new(bytes);

    assert!(matches!(
        VolumeSession::open(&mut cursor, 0, false),
        Err(FATError::TruncatedRead { offset: 0xFFFF, .. })
    ));
}
