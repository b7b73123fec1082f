#![no_main]
use libfuzzer_sys::fuzz_target;
use oxizstd::compress::{StreamEncoder, encode_all};
use oxizstd::params::EncoderConfig;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the level, the rest is the payload.
    let mut cfg = EncoderConfig::default();
    cfg.level = 1 + data[0] % 19;
    cfg.num_threads = 1;
    let payload = &data[1..];

    let frame = encode_all(payload, cfg.clone()).unwrap();
    let decoded = zstd::decode_all(&frame[..]).unwrap();
    assert_eq!(decoded, payload);

    let mut enc = StreamEncoder::with_config(cfg);
    let mut out = Vec::new();
    let mut seen = 0u64;
    enc.code(&mut &payload[..], &mut out, &mut |i: u64, _o: u64| -> std::io::Result<()> {
        assert!(i >= seen);
        seen = i;
        Ok(())
    })
    .unwrap();
    assert_eq!(enc.counters().snapshot(), (payload.len() as u64, out.len() as u64));
});
