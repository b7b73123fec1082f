// Encoder parameter store.
//
// - `limits` — engine-defined bounds for every tunable
// - `config` — EncoderConfig: clamped fields, long-distance matching rules
// - `props`  — (id, value) configuration protocol and its rule table
// - `header` — fixed-size coder property header

pub mod config;
pub mod header;
pub mod limits;
pub mod props;

pub use config::EncoderConfig;
pub use header::{CODER_PROPS_SIZE, CoderProps};
pub use props::{PropId, PropValue, apply_props};
