//! Oxizstd: a streaming zstd encoder driven by a property-based configuration
//! protocol.
//!
//! The crate provides:
//! - Parameter handling with range clamping and a fixed coder header (`params`)
//! - The engine contract and its libzstd implementation (`engine`)
//! - The chunked streaming driver with progress accounting (`compress`)
//! - File-oriented helpers (`io`)
//!
//! # Quick Start
//!
//! ```no_run
//! use oxizstd::compress::{NoProgress, StreamEncoder};
//! use oxizstd::params::{PropId, PropValue};
//!
//! let mut enc = StreamEncoder::new();
//! enc.set_coder_properties(&[
//!     (PropId::Level as u32, PropValue::U32(19)),
//!     (PropId::Long as u32, PropValue::U32(0)),
//! ])
//! .unwrap();
//!
//! let mut out = Vec::new();
//! enc.write_coder_properties(&mut out).unwrap();
//! enc.code(&mut &b"hello hello hello"[..], &mut out, &mut NoProgress)
//!     .unwrap();
//! ```

pub mod compress;
pub mod engine;
pub mod error;
pub mod io;
pub mod params;

pub use error::EncodeError;
