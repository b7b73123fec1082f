use oxizstd::compress::NoProgress;
use oxizstd::io::{IoError, encode_file, read_coder_props};
use oxizstd::params::{CODER_PROPS_SIZE, EncoderConfig, PropId};
use std::fs::File;
use std::io::{self, BufReader, Write};
use tempfile::NamedTempFile;

fn config(level: u8) -> EncoderConfig {
    let mut cfg = EncoderConfig::default();
    cfg.level = level;
    cfg.num_threads = 2;
    cfg
}

fn decode_output(path: &std::path::Path) -> (u8, Vec<u8>) {
    let mut reader = BufReader::new(File::open(path).unwrap());
    let props = read_coder_props(&mut reader).unwrap();
    let data = zstd::decode_all(reader).unwrap();
    (props.level, data)
}

#[test]
fn file_roundtrip_with_progress() {
    let mut input = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();
    let data: Vec<u8> = b"the quick brown fox jumps over the lazy dog\n"
        .iter()
        .copied()
        .cycle()
        .take(3 * 1024 * 1024)
        .collect();
    input.write_all(&data).unwrap();
    input.flush().unwrap();

    let mut reports = Vec::new();
    let mut sink = |i: u64, o: u64| -> io::Result<()> {
        reports.push((i, o));
        Ok(())
    };
    let stats = encode_file(input.path(), output.path(), config(9), &mut sink).unwrap();

    assert_eq!(stats.input_size, data.len() as u64);
    assert!(stats.payload_size < stats.input_size / 10);
    assert_eq!(stats.output_size, stats.payload_size + CODER_PROPS_SIZE as u64);
    assert_eq!(
        std::fs::metadata(output.path()).unwrap().len(),
        stats.output_size
    );

    assert!(!reports.is_empty());
    assert_eq!(reports.last().copied(), Some((stats.input_size, stats.payload_size)));
    assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 <= w[1].1));

    let (level, decoded) = decode_output(output.path());
    assert_eq!(level, 9);
    assert_eq!(decoded, data);
}

#[test]
fn empty_file_still_gets_header_and_frame() {
    let input = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();

    let stats = encode_file(input.path(), output.path(), config(3), &mut NoProgress).unwrap();
    assert_eq!(stats.input_size, 0);
    assert!(stats.payload_size > 0);

    let (level, decoded) = decode_output(output.path());
    assert_eq!(level, 3);
    assert!(decoded.is_empty());
}

#[test]
fn progress_error_aborts_encode() {
    let mut input = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();
    input.write_all(&vec![7u8; 1024 * 1024]).unwrap();
    input.flush().unwrap();

    let mut sink = |_: u64, _: u64| -> io::Result<()> {
        Err(io::Error::other("cancelled"))
    };
    let err = encode_file(input.path(), output.path(), config(3), &mut sink).unwrap_err();
    match err {
        IoError::Encode(e) => assert!(e.to_string().contains("cancelled"), "{e}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn long_mode_file_roundtrip() {
    let mut input = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();
    let block: Vec<u8> = (0..256 * 1024u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
    input.write_all(&block).unwrap();
    input.write_all(&vec![0u8; 512 * 1024]).unwrap();
    input.write_all(&block).unwrap();
    input.flush().unwrap();

    let mut cfg = config(5);
    cfg.set(PropId::Long, 24);
    let stats = encode_file(input.path(), output.path(), cfg, &mut NoProgress).unwrap();
    assert!(stats.payload_size < 2 * block.len() as u64);

    let (_, decoded) = decode_output(output.path());
    assert_eq!(decoded.len(), block.len() * 2 + 512 * 1024);
    assert_eq!(&decoded[..block.len()], &block[..]);
    assert_eq!(&decoded[decoded.len() - block.len()..], &block[..]);
}

#[test]
#[ignore = "multi-GB test is opt-in due runtime and disk requirements"]
fn multi_gb_sparse_file_encodes() {
    let input = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();
    input.as_file().set_len(2 * 1024 * 1024 * 1024).unwrap();

    let stats = encode_file(input.path(), output.path(), config(1), &mut NoProgress).unwrap();
    assert_eq!(stats.input_size, 2 * 1024 * 1024 * 1024);
    assert!(stats.payload_size < 1024 * 1024);
}
