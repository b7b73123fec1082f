// Coder property header.
//
// A fixed 5-byte record written once per stream, ahead of the payload:
//
//   [0] engine version major
//   [1] engine version minor
//   [2] compression level
//   [3..5] reserved, zero
//
// A decoder (or a later re-encode) reads it back to recover the level.

use std::io::{self, Write};

use super::config::EncoderConfig;
use crate::error::EncodeError;

/// Serialized size of [`CoderProps`].
pub const CODER_PROPS_SIZE: usize = 5;

/// The serialized encoder parameter header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderProps {
    pub ver_major: u8,
    pub ver_minor: u8,
    pub level: u8,
    pub reserved: [u8; 2],
}

impl CoderProps {
    /// Header for `cfg`, stamped with the linked engine's version.
    pub fn for_config(cfg: &EncoderConfig) -> Self {
        let (ver_major, ver_minor) = crate::engine::version();
        Self {
            ver_major,
            ver_minor,
            level: cfg.level,
            reserved: [0; 2],
        }
    }

    pub fn to_bytes(&self) -> [u8; CODER_PROPS_SIZE] {
        [
            self.ver_major,
            self.ver_minor,
            self.level,
            self.reserved[0],
            self.reserved[1],
        ]
    }

    /// Parse a header previously produced by [`CoderProps::to_bytes`].
    pub fn from_bytes(buf: &[u8]) -> Result<Self, EncodeError> {
        let bytes: [u8; CODER_PROPS_SIZE] = buf.try_into().map_err(|_| {
            EncodeError::invalid(format!(
                "coder properties must be {CODER_PROPS_SIZE} bytes, got {}",
                buf.len()
            ))
        })?;
        Ok(Self {
            ver_major: bytes[0],
            ver_minor: bytes[1],
            level: bytes[2],
            reserved: [bytes[3], bytes[4]],
        })
    }

    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_survives_serialization() {
        let mut cfg = EncoderConfig::default();
        cfg.level = 19;
        let props = CoderProps::for_config(&cfg);
        let bytes = props.to_bytes();
        assert_eq!(bytes.len(), CODER_PROPS_SIZE);
        assert_eq!(bytes[2], 19);
        assert_eq!(&bytes[3..], &[0, 0]);

        let parsed = CoderProps::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, props);
        assert_eq!(parsed.level, 19);
    }

    #[test]
    fn version_is_stamped() {
        let props = CoderProps::for_config(&EncoderConfig::default());
        // Any libzstd this crate links against is 1.x.
        assert_eq!(props.ver_major, 1);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            CoderProps::from_bytes(&[1, 5, 3]),
            Err(EncodeError::InvalidArgument(_))
        ));
        assert!(CoderProps::from_bytes(&[0; 6]).is_err());
    }

    #[test]
    fn write_to_emits_exact_bytes() {
        let props = CoderProps {
            ver_major: 1,
            ver_minor: 5,
            level: 7,
            reserved: [0; 2],
        };
        let mut out = Vec::new();
        props.write_to(&mut out).unwrap();
        assert_eq!(out, vec![1, 5, 7, 0, 0]);
    }
}
