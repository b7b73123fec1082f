// Engine-defined parameter bounds (mirrors zstd.h / zstdmt_compress.h).
//
// The window and chain limits depend on the target's pointer width, the same
// way libzstd defines them.

/// Highest compression level accepted by the engine.
pub const LEVEL_MAX: u32 = 22;

/// Lowest compression level exposed through the property protocol.
pub const LEVEL_MIN: u32 = 1;

/// Level used when no level property is supplied.
pub const DEFAULT_LEVEL: u8 = 3;

/// Maximum number of engine worker threads.
#[cfg(target_pointer_width = "64")]
pub const THREADS_MAX: u32 = 200;
#[cfg(not(target_pointer_width = "64"))]
pub const THREADS_MAX: u32 = 64;

pub const STRATEGY_MIN: u32 = 1;
pub const STRATEGY_MAX: u32 = 8;

pub const WINDOWLOG_MIN: u32 = 10;
#[cfg(target_pointer_width = "64")]
pub const WINDOWLOG_MAX: u32 = 31;
#[cfg(not(target_pointer_width = "64"))]
pub const WINDOWLOG_MAX: u32 = 30;

/// Window log chosen when long-distance matching is requested with magnitude 0.
pub const LONG_DEFAULT_WINDOWLOG: u32 = 27;

/// Above this window log, long-distance matching is enabled implicitly.
pub const LONG_IMPLICIT_WINDOWLOG: u32 = 27;

pub const HASHLOG_MIN: u32 = 6;
pub const HASHLOG_MAX: u32 = if WINDOWLOG_MAX < 30 { WINDOWLOG_MAX } else { 30 };

pub const CHAINLOG_MIN: u32 = HASHLOG_MIN;
#[cfg(target_pointer_width = "64")]
pub const CHAINLOG_MAX: u32 = 30;
#[cfg(not(target_pointer_width = "64"))]
pub const CHAINLOG_MAX: u32 = 29;

pub const SEARCHLOG_MIN: u32 = 1;
pub const SEARCHLOG_MAX: u32 = WINDOWLOG_MAX - 1;

pub const MINMATCH_MIN: u32 = 3;
pub const MINMATCH_MAX: u32 = 7;

pub const TARGETLENGTH_MIN: u32 = 0;
/// One full block (128 KiB).
pub const TARGETLENGTH_MAX: u32 = 1 << 17;

pub const OVERLAPLOG_MIN: u32 = 0;
pub const OVERLAPLOG_MAX: u32 = 9;

pub const LDM_MINMATCH_MIN: u32 = 4;
pub const LDM_MINMATCH_MAX: u32 = 4096;

pub const LDM_BUCKETSIZELOG_MIN: u32 = 1;
pub const LDM_BUCKETSIZELOG_MAX: u32 = 8;

pub const LDM_HASHRATELOG_MIN: u32 = 0;
pub const LDM_HASHRATELOG_MAX: u32 = WINDOWLOG_MAX - HASHLOG_MIN;
