// Streaming zstd encoder.
//
// StreamEncoder drives one chunked read/compress/write loop per `code()`
// call:
//   - Parameters are collected up front and frozen on the first call
//   - The engine session (context + staging buffers) is opened lazily
//   - Input is pulled one staging buffer at a time; a zero-length read is EOF
//   - Output is pushed as soon as the engine produces it, with progress
//     reported after every non-empty write

use std::io::{self, Read, Write};
use std::sync::Arc;

use log::{debug, trace};

use crate::engine::{EndDirective, Engine, ZstdEngine};
use crate::error::EncodeError;
use crate::params::{CoderProps, EncoderConfig, PropValue, apply_props};

use super::progress::{NoProgress, ProgressCounters, ProgressSink};
use super::session::EngineSession;

// ---------------------------------------------------------------------------
// Driver state
// ---------------------------------------------------------------------------

/// Where the encoder is in its stream lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No session yet; parameters may still change.
    Idle,
    /// Session being opened and configured (first `code()` only).
    Configuring,
    /// Presenting an input chunk with `Continue` until the engine has
    /// consumed all of it.
    Feeding,
    /// Input fully consumed; the engine still holds output to flush.
    Draining,
    /// Input exhausted; the first `End` call of the frame.
    Ending,
    /// Frame complete. Another `code()` call starts a new frame.
    Done,
    /// An error ended the stream. Terminal.
    Failed,
}

fn enter(state: &mut DriverState, next: DriverState) {
    if *state != next {
        trace!("encoder state {state:?} -> {next:?}");
        *state = next;
    }
}

type EngineFactory<E> = Box<dyn Fn() -> Option<E> + Send>;

// ---------------------------------------------------------------------------
// StreamEncoder
// ---------------------------------------------------------------------------

/// Streaming encoder over an [`Engine`], zstd by default.
///
/// # Example
/// ```no_run
/// use oxizstd::compress::encoder::StreamEncoder;
/// use oxizstd::compress::progress::NoProgress;
/// use oxizstd::params::{PropId, PropValue};
///
/// let mut enc = StreamEncoder::new();
/// enc.set_coder_properties(&[(PropId::Level as u32, PropValue::U32(9))]).unwrap();
///
/// let mut out = Vec::new();
/// enc.write_coder_properties(&mut out).unwrap();
/// enc.code(&mut &b"some data"[..], &mut out, &mut NoProgress).unwrap();
/// ```
pub struct StreamEncoder<E: Engine = ZstdEngine> {
    config: EncoderConfig,
    make_engine: EngineFactory<E>,
    session: Option<EngineSession<E>>,
    counters: Arc<ProgressCounters>,
    state: DriverState,
}

impl StreamEncoder<ZstdEngine> {
    pub fn new() -> Self {
        Self::with_engine(ZstdEngine::create)
    }

    /// Encoder for a config built field by field. Every field is clamped
    /// into its range first.
    pub fn with_config(mut config: EncoderConfig) -> Self {
        config.normalize();
        let mut enc = Self::new();
        enc.config = config;
        enc
    }
}

impl Default for StreamEncoder<ZstdEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> StreamEncoder<E> {
    /// Encoder whose engine is created by `make_engine` on the first `code()`.
    /// Returning `None` from the factory is reported as `OutOfMemory`.
    pub fn with_engine<F>(make_engine: F) -> Self
    where
        F: Fn() -> Option<E> + Send + 'static,
    {
        Self {
            config: EncoderConfig::default(),
            make_engine: Box::new(make_engine),
            session: None,
            counters: Arc::new(ProgressCounters::new()),
            state: DriverState::Idle,
        }
    }

    fn ensure_unfrozen(&self) -> Result<(), EncodeError> {
        if self.state == DriverState::Failed {
            return Err(EncodeError::invalid("encoder is in a failed state"));
        }
        if self.session.is_some() {
            return Err(EncodeError::invalid(
                "parameters cannot change once streaming has begun",
            ));
        }
        Ok(())
    }

    /// Apply (property id, value) pairs. See [`apply_props`].
    pub fn set_coder_properties(&mut self, props: &[(u32, PropValue)]) -> Result<(), EncodeError> {
        self.ensure_unfrozen()?;
        apply_props(&mut self.config, props)
    }

    /// Set the engine worker count, clamped to `[1, THREADS_MAX]`.
    pub fn set_number_of_threads(&mut self, n: u32) -> Result<(), EncodeError> {
        self.ensure_unfrozen()?;
        self.config.set_num_threads(n);
        Ok(())
    }

    /// Header describing the current configuration.
    pub fn coder_props(&self) -> CoderProps {
        CoderProps::for_config(&self.config)
    }

    /// Write the coder property header. Call before streaming the payload.
    pub fn write_coder_properties<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        self.coder_props().write_to(w)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Shared handle to the progress counters, readable from other threads.
    pub fn counters(&self) -> Arc<ProgressCounters> {
        Arc::clone(&self.counters)
    }

    /// Compress everything `reader` yields into `writer` as one zstd frame.
    ///
    /// Any read, write, progress or engine error aborts the stream
    /// immediately. Bytes already written are left in place.
    pub fn code<R, W, P>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        progress: &mut P,
    ) -> Result<(), EncodeError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
        P: ProgressSink + ?Sized,
    {
        if self.state == DriverState::Failed {
            return Err(EncodeError::Fail("encoder is in a failed state".into()));
        }

        let result = self.run(reader, writer, progress);
        if let Err(e) = &result {
            debug!("stream aborted: {e}");
            enter(&mut self.state, DriverState::Failed);
        }
        result
    }

    fn run<R, W, P>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        progress: &mut P,
    ) -> Result<(), EncodeError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let session = match &mut self.session {
            Some(s) => s,
            slot => {
                enter(&mut self.state, DriverState::Configuring);
                let make = &self.make_engine;
                slot.insert(EngineSession::open(|| make(), &self.config)?)
            }
        };
        drive(session, &self.counters, &mut self.state, reader, writer, progress)
    }
}

/// The chunk loop.
fn drive<E, R, W, P>(
    session: &mut EngineSession<E>,
    counters: &ProgressCounters,
    state: &mut DriverState,
    reader: &mut R,
    writer: &mut W,
    progress: &mut P,
) -> Result<(), EncodeError>
where
    E: Engine,
    R: Read + ?Sized,
    W: Write + ?Sized,
    P: ProgressSink + ?Sized,
{
    loop {
        let n = read_chunk(reader, session.src_buf_mut())?;
        let directive = if n == 0 {
            enter(state, DriverState::Ending);
            EndDirective::End
        } else {
            enter(state, DriverState::Feeding);
            EndDirective::Continue
        };
        counters.add_in(n as u64);

        let mut pos = 0usize;
        loop {
            let (step, out) = session.step(pos, n, directive)?;
            pos += step.consumed;

            if !out.is_empty() {
                writer.write_all(out)?;
                let (in_total, out_total) = counters.add_out(out.len() as u64);
                progress.set_ratio_info(in_total, out_total)?;
            }

            let next = after_step(directive, step.remaining);
            enter(state, next);
            match next {
                DriverState::Done => {
                    let (in_total, out_total) = counters.snapshot();
                    debug!("frame complete: {in_total} bytes in, {out_total} bytes out");
                    return Ok(());
                }
                DriverState::Feeding if pos >= n => break,
                _ => {}
            }
        }
    }
}

/// State after one engine step. A `Continue` step keeps feeding the current
/// chunk; an `End` step drains until the engine has nothing left.
fn after_step(directive: EndDirective, remaining: usize) -> DriverState {
    match directive {
        EndDirective::Continue => DriverState::Feeding,
        EndDirective::End if remaining == 0 => DriverState::Done,
        EndDirective::End => DriverState::Draining,
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF.
fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Convenience: compress `data` in memory with `config`.
pub fn encode_all(data: &[u8], config: EncoderConfig) -> Result<Vec<u8>, EncodeError> {
    let mut enc = StreamEncoder::with_config(config);
    let mut out = Vec::new();
    let mut input = data;
    enc.code(&mut input, &mut out, &mut NoProgress)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
