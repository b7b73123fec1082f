// Streaming compression driver.
//
// - `encoder`  — StreamEncoder: configure once, then stream chunk by chunk
// - `session`  — EngineSession: engine context plus staging buffers
// - `progress` — ProgressCounters and the ProgressSink callback

pub mod encoder;
pub mod progress;
pub mod session;

pub use encoder::{DriverState, StreamEncoder, encode_all};
pub use progress::{NoProgress, ProgressCounters, ProgressSink};
pub use session::EngineSession;
