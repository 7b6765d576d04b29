//! End-to-end file round-trips through the streaming API

use ppmx::{PpmCodec, PpmConfig};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

fn roundtrip_through_files(data: &[u8], order: i32) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.bin");
    let compressed_path = dir.path().join("input.ppmx");
    let output_path = dir.path().join("output.bin");

    std::fs::write(&input_path, data).unwrap();

    let mut codec = PpmCodec::new(PpmConfig::new(order)).unwrap();
    let reader = BufReader::new(File::open(&input_path).unwrap());
    let writer = BufWriter::new(File::create(&compressed_path).unwrap());
    let stats = codec.compress_to(reader, writer).unwrap();
    assert_eq!(stats.original_size, data.len() as u64);
    assert_eq!(
        stats.compressed_size,
        std::fs::metadata(&compressed_path).unwrap().len()
    );

    let reader = BufReader::new(File::open(&compressed_path).unwrap());
    let writer = BufWriter::new(File::create(&output_path).unwrap());
    let bytes = codec.decompress_from(reader, writer).unwrap();
    assert_eq!(bytes, data.len() as u64);

    std::fs::read(&output_path).unwrap()
}

#[test]
fn roundtrips_text_file() {
    let data = "2024-01-15 10:30:45 INFO Server started\n".repeat(500);
    let out = roundtrip_through_files(data.as_bytes(), 3);
    assert_eq!(out, data.as_bytes());
}

#[test]
fn roundtrips_binary_file_across_orders() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i * 37 % 251) as u8).collect();
    for order in [-1, 0, 2] {
        let out = roundtrip_through_files(&data, order);
        assert_eq!(out, data, "order {}", order);
    }
}

#[test]
fn roundtrips_empty_file() {
    let out = roundtrip_through_files(b"", 3);
    assert!(out.is_empty());
}

#[test]
fn compressed_file_is_smaller_for_repetitive_input() {
    let data = vec![b'z'; 100_000];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("z.ppmx");

    let mut codec = PpmCodec::with_order(2).unwrap();
    let mut file = BufWriter::new(
        File::options()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap(),
    );
    codec.compress_to(data.as_slice(), &mut file).unwrap();
    file.flush().unwrap();

    let mut file = file.into_inner().unwrap();
    let len = file.metadata().unwrap().len();
    assert!(len < 1000, "100k of one byte compressed to {} bytes", len);

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut compressed = Vec::new();
    file.read_to_end(&mut compressed).unwrap();
    let out = codec.decompress(&compressed).unwrap();
    assert_eq!(out, data);
}
