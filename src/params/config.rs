// Encoder tuning parameters.
//
// Every field is clamped into its engine range on the way in; nothing is
// rejected for being out of range. Fields left as `None` are never pushed to
// the engine, so its own defaults apply.

use super::limits::*;

/// Clamp `v` into `[min, max]`.
///
/// Idempotent: `clamp(clamp(v)) == clamp(v)`.
#[inline]
pub fn clamp(v: u32, min: u32, max: u32) -> u32 {
    v.clamp(min, max)
}

/// Number of worker threads used when none is configured.
pub fn default_num_threads() -> u32 {
    let n = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    clamp(u32::try_from(n).unwrap_or(THREADS_MAX), 1, THREADS_MAX)
}

/// Validated encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Compression level (1-22).
    pub level: u8,
    /// Engine worker threads (1..=THREADS_MAX).
    pub num_threads: u32,
    /// Long-distance matching. `None` means "not requested".
    pub long: Option<bool>,
    pub strategy: Option<u32>,
    pub window_log: Option<u32>,
    pub hash_log: Option<u32>,
    pub chain_log: Option<u32>,
    pub search_log: Option<u32>,
    pub min_match: Option<u32>,
    pub target_length: Option<u32>,
    pub overlap_log: Option<u32>,
    pub ldm_hash_log: Option<u32>,
    pub ldm_min_match: Option<u32>,
    pub ldm_bucket_size_log: Option<u32>,
    pub ldm_hash_rate_log: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            num_threads: default_num_threads(),
            long: None,
            strategy: None,
            window_log: None,
            hash_log: None,
            chain_log: None,
            search_log: None,
            min_match: None,
            target_length: None,
            overlap_log: None,
            ldm_hash_log: None,
            ldm_min_match: None,
            ldm_bucket_size_log: None,
            ldm_hash_rate_log: None,
        }
    }
}

impl EncoderConfig {
    /// Clamp into [1, THREADS_MAX].
    pub fn set_num_threads(&mut self, v: u32) {
        self.num_threads = clamp(v, 1, THREADS_MAX);
    }

    /// Request long-distance matching with window magnitude `v`.
    ///
    /// Follows `zstd --long=#`: 0 picks the 128 MiB default window, values
    /// below the engine minimum are raised to it, values above the maximum are
    /// lowered to it, anything else becomes the window log.
    pub fn set_long(&mut self, v: u32) {
        self.long = Some(true);
        self.window_log = Some(match v {
            0 => LONG_DEFAULT_WINDOWLOG,
            v => clamp(v, WINDOWLOG_MIN, WINDOWLOG_MAX),
        });
    }

    /// Whether long-distance matching will be enabled on the engine.
    ///
    /// An explicit request wins; otherwise a window log above 27 turns it on.
    pub fn resolved_long(&self) -> bool {
        match self.long {
            Some(on) => on,
            None => self
                .window_log
                .is_some_and(|w| w > LONG_IMPLICIT_WINDOWLOG),
        }
    }
}
