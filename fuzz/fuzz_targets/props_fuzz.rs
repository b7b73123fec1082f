#![no_main]
use libfuzzer_sys::fuzz_target;
use oxizstd::params::limits::{WINDOWLOG_MAX, WINDOWLOG_MIN};
use oxizstd::params::props::{PROP_RULES, fuzz_apply_props};

fuzz_target!(|data: &[u8]| {
    let cfg = fuzz_apply_props(data);

    assert!((1..=22).contains(&cfg.level));
    assert!(cfg.num_threads >= 1);
    if let Some(w) = cfg.window_log {
        assert!((WINDOWLOG_MIN..=WINDOWLOG_MAX).contains(&w));
    }
    if cfg.long.is_some() {
        assert!(cfg.window_log.is_some());
    }
    for rule in &PROP_RULES {
        let v = u32::from(data.len() as u16);
        assert_eq!(rule.clamp(rule.clamp(v)), rule.clamp(v));
    }
});
