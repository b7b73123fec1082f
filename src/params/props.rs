// Property-based configuration protocol.
//
// Callers describe the encoder with (property id, value) pairs. Each known id
// maps to a rule holding its valid range and the field it writes; the value is
// clamped into the range before it is stored. Unknown ids are skipped.

use log::trace;

use super::config::{EncoderConfig, clamp};
use super::limits::*;
use crate::error::EncodeError;

/// Property identifiers understood by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PropId {
    NumThreads = 13,
    Level = 15,
    Strategy = 0x20,
    Long = 0x21,
    WindowLog = 0x22,
    HashLog = 0x23,
    ChainLog = 0x24,
    SearchLog = 0x25,
    MinMatch = 0x26,
    TargetLength = 0x27,
    OverlapLog = 0x28,
    LdmHashLog = 0x29,
    LdmMinMatch = 0x2A,
    LdmBucketSizeLog = 0x2B,
    LdmHashRateLog = 0x2C,
}

impl PropId {
    pub const ALL: [PropId; 15] = [
        PropId::NumThreads,
        PropId::Level,
        PropId::Strategy,
        PropId::Long,
        PropId::WindowLog,
        PropId::HashLog,
        PropId::ChainLog,
        PropId::SearchLog,
        PropId::MinMatch,
        PropId::TargetLength,
        PropId::OverlapLog,
        PropId::LdmHashLog,
        PropId::LdmMinMatch,
        PropId::LdmBucketSizeLog,
        PropId::LdmHashRateLog,
    ];

    /// Look up a raw protocol id. Returns `None` for ids this encoder ignores.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|id| *id as u32 == raw)
    }
}

/// A property value as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    U32(u32),
    Bool(bool),
    Str(String),
}

impl From<u32> for PropValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

/// Valid range of a property and the field it is stored in.
#[derive(Clone, Copy)]
pub struct PropRule {
    pub id: PropId,
    pub min: u32,
    pub max: u32,
    store: fn(&mut EncoderConfig, u32),
}

impl PropRule {
    #[inline]
    pub fn clamp(&self, v: u32) -> u32 {
        clamp(v, self.min, self.max)
    }

    /// Clamp `v` and write it into `cfg`.
    pub fn apply(&self, cfg: &mut EncoderConfig, v: u32) {
        (self.store)(cfg, self.clamp(v));
    }
}

impl std::fmt::Debug for PropRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropRule")
            .field("id", &self.id)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

const fn rule(id: PropId, min: u32, max: u32, store: fn(&mut EncoderConfig, u32)) -> PropRule {
    PropRule {
        id,
        min,
        max,
        store,
    }
}

/// One rule per property id.
pub static PROP_RULES: [PropRule; 15] = [
    // LEVEL_MAX fits in a byte, so the narrowing below is lossless.
    rule(PropId::Level, LEVEL_MIN, LEVEL_MAX, |c, v| c.level = v as u8),
    rule(PropId::NumThreads, 1, THREADS_MAX, |c, v| c.num_threads = v),
    rule(PropId::Strategy, STRATEGY_MIN, STRATEGY_MAX, |c, v| c.strategy = Some(v)),
    // The magnitude is interpreted by `set_long`, not clamped here.
    rule(PropId::Long, 0, u32::MAX, |c, v| c.set_long(v)),
    rule(PropId::WindowLog, WINDOWLOG_MIN, WINDOWLOG_MAX, |c, v| c.window_log = Some(v)),
    rule(PropId::HashLog, HASHLOG_MIN, HASHLOG_MAX, |c, v| c.hash_log = Some(v)),
    rule(PropId::ChainLog, CHAINLOG_MIN, CHAINLOG_MAX, |c, v| c.chain_log = Some(v)),
    rule(PropId::SearchLog, SEARCHLOG_MIN, SEARCHLOG_MAX, |c, v| c.search_log = Some(v)),
    rule(PropId::MinMatch, MINMATCH_MIN, MINMATCH_MAX, |c, v| c.min_match = Some(v)),
    rule(PropId::TargetLength, TARGETLENGTH_MIN, TARGETLENGTH_MAX, |c, v| {
        c.target_length = Some(v)
    }),
    rule(PropId::OverlapLog, OVERLAPLOG_MIN, OVERLAPLOG_MAX, |c, v| c.overlap_log = Some(v)),
    rule(PropId::LdmHashLog, HASHLOG_MIN, HASHLOG_MAX, |c, v| c.ldm_hash_log = Some(v)),
    rule(PropId::LdmMinMatch, LDM_MINMATCH_MIN, LDM_MINMATCH_MAX, |c, v| {
        c.ldm_min_match = Some(v)
    }),
    rule(PropId::LdmBucketSizeLog, LDM_BUCKETSIZELOG_MIN, LDM_BUCKETSIZELOG_MAX, |c, v| {
        c.ldm_bucket_size_log = Some(v)
    }),
    rule(PropId::LdmHashRateLog, LDM_HASHRATELOG_MIN, LDM_HASHRATELOG_MAX, |c, v| {
        c.ldm_hash_rate_log = Some(v)
    }),
];

pub fn rule_for(id: PropId) -> Option<&'static PropRule> {
    PROP_RULES.iter().find(|r| r.id == id)
}

impl EncoderConfig {
    /// Clamp `v` into the range of `id` and store it.
    pub fn set(&mut self, id: PropId, v: u32) {
        if let Some(rule) = rule_for(id) {
            rule.apply(self, v);
        }
    }

    fn tuning_slot(&mut self, id: PropId) -> Option<&mut Option<u32>> {
        Some(match id {
            PropId::Strategy => &mut self.strategy,
            PropId::WindowLog => &mut self.window_log,
            PropId::HashLog => &mut self.hash_log,
            PropId::ChainLog => &mut self.chain_log,
            PropId::SearchLog => &mut self.search_log,
            PropId::MinMatch => &mut self.min_match,
            PropId::TargetLength => &mut self.target_length,
            PropId::OverlapLog => &mut self.overlap_log,
            PropId::LdmHashLog => &mut self.ldm_hash_log,
            PropId::LdmMinMatch => &mut self.ldm_min_match,
            PropId::LdmBucketSizeLog => &mut self.ldm_bucket_size_log,
            PropId::LdmHashRateLog => &mut self.ldm_hash_rate_log,
            PropId::NumThreads | PropId::Level | PropId::Long => return None,
        })
    }

    /// Clamp every field into its range.
    ///
    /// Configs assembled through the public fields skip the property rules;
    /// this brings them back in line. Set fields stay set.
    pub fn normalize(&mut self) {
        self.level = clamp(u32::from(self.level), LEVEL_MIN, LEVEL_MAX) as u8;
        self.set_num_threads(self.num_threads);
        for rule in &PROP_RULES {
            if let Some(slot) = self.tuning_slot(rule.id) {
                if let Some(v) = *slot {
                    *slot = Some(rule.clamp(v));
                }
            }
        }
    }
}

/// Apply a batch of raw (id, value) properties to `cfg`.
///
/// Unknown ids are ignored. A known id carrying a non-numeric value fails with
/// `InvalidArgument`; properties earlier in the batch stay applied.
pub fn apply_props(cfg: &mut EncoderConfig, props: &[(u32, PropValue)]) -> Result<(), EncodeError> {
    for (raw, value) in props {
        let Some(id) = PropId::from_raw(*raw) else {
            trace!("ignoring unknown property id {raw:#x}");
            continue;
        };
        let v = match value {
            PropValue::U32(v) => *v,
            other => {
                return Err(EncodeError::invalid(format!(
                    "property {id:?} expects an unsigned integer, got {other:?}"
                )));
            }
        };
        cfg.set(id, v);
        trace!("property {id:?} = {v}");
    }
    Ok(())
}

/// Decode `data` as a sequence of (id, tag, value) records and apply them.
///
/// Each record is 9 bytes: little-endian id, a tag byte choosing the value
/// kind and a little-endian value. Trailing bytes are ignored.
#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_apply_props(data: &[u8]) -> EncoderConfig {
    let props: Vec<(u32, PropValue)> = data
        .chunks_exact(9)
        .map(|rec| {
            let id = u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
            let v = u32::from_le_bytes([rec[5], rec[6], rec[7], rec[8]]);
            let value = match rec[4] % 8 {
                6 => PropValue::Bool(v & 1 != 0),
                7 => PropValue::Str(v.to_string()),
                _ => PropValue::U32(v),
            };
            (id, value)
        })
        .collect();
    let mut cfg = EncoderConfig::default();
    let _ = apply_props(&mut cfg, &props);
    cfg
}
