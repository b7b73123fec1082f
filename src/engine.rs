// Compression engine contract.
//
// The encoder never touches compression internals. It talks to an `Engine`
// through three calls: set one advanced parameter, report recommended chunk
// sizes, and run one streaming step. `ZstdEngine` implements the contract on
// top of libzstd's advanced streaming API (`ZSTD_compressStream2`).

use log::trace;
use thiserror::Error;
use zstd_safe::zstd_sys::ZSTD_EndDirective;
use zstd_safe::{CCtx, CParameter, InBuffer, OutBuffer, Strategy};

// ---------------------------------------------------------------------------
// Contract types
// ---------------------------------------------------------------------------

/// Whether more input follows the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDirective {
    Continue,
    End,
}

/// Advanced parameters the encoder may push to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    CompressionLevel(i32),
    NbWorkers(u32),
    ContentSizeFlag(bool),
    EnableLongDistanceMatching(bool),
    Strategy(u32),
    WindowLog(u32),
    HashLog(u32),
    ChainLog(u32),
    SearchLog(u32),
    MinMatch(u32),
    TargetLength(u32),
    OverlapLog(u32),
    LdmHashLog(u32),
    LdmMinMatch(u32),
    LdmBucketSizeLog(u32),
    LdmHashRateLog(u32),
}

/// Outcome of one streaming step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStep {
    /// Input bytes consumed from the front of the presented chunk.
    pub consumed: usize,
    /// Output bytes written to the front of the presented buffer.
    pub produced: usize,
    /// Lower bound of bytes still buffered inside the engine. Zero after an
    /// `End` step means the frame is complete.
    pub remaining: usize,
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// A streaming compression engine.
pub trait Engine {
    /// Recommended input chunk size.
    fn in_size(&self) -> usize;

    /// Recommended output chunk size; always enough to make progress.
    fn out_size(&self) -> usize;

    fn set_parameter(&mut self, param: Param) -> Result<(), EngineError>;

    /// Compress a prefix of `input` into a prefix of `output`.
    fn compress_stream(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        directive: EndDirective,
    ) -> Result<StreamStep, EngineError>;
}

// ---------------------------------------------------------------------------
// zstd
// ---------------------------------------------------------------------------

/// `(major, minor)` of the linked libzstd.
pub fn version() -> (u8, u8) {
    let v = zstd_safe::version_number();
    (((v / 10_000) % 256) as u8, ((v / 100) % 100) as u8)
}

/// libzstd compression context.
pub struct ZstdEngine {
    cctx: CCtx<'static>,
}

impl ZstdEngine {
    /// Allocate a context. `None` when libzstd cannot allocate one.
    pub fn create() -> Option<Self> {
        CCtx::try_create().map(|cctx| Self { cctx })
    }
}

fn error_name(code: usize) -> EngineError {
    EngineError(zstd_safe::get_error_name(code).to_owned())
}

fn strategy(v: u32) -> Option<Strategy> {
    Some(match v {
        1 => Strategy::ZSTD_fast,
        2 => Strategy::ZSTD_dfast,
        3 => Strategy::ZSTD_greedy,
        4 => Strategy::ZSTD_lazy,
        5 => Strategy::ZSTD_lazy2,
        6 => Strategy::ZSTD_btlazy2,
        7 => Strategy::ZSTD_btopt,
        8 => Strategy::ZSTD_btultra,
        9 => Strategy::ZSTD_btultra2,
        _ => return None,
    })
}

impl Engine for ZstdEngine {
    fn in_size(&self) -> usize {
        CCtx::in_size()
    }

    fn out_size(&self) -> usize {
        CCtx::out_size()
    }

    fn set_parameter(&mut self, param: Param) -> Result<(), EngineError> {
        let p = match param {
            Param::CompressionLevel(v) => CParameter::CompressionLevel(v),
            Param::NbWorkers(v) => CParameter::NbWorkers(v),
            Param::ContentSizeFlag(v) => CParameter::ContentSizeFlag(v),
            Param::EnableLongDistanceMatching(v) => CParameter::EnableLongDistanceMatching(v),
            Param::Strategy(v) => CParameter::Strategy(
                strategy(v).ok_or_else(|| EngineError(format!("unknown strategy {v}")))?,
            ),
            Param::WindowLog(v) => CParameter::WindowLog(v),
            Param::HashLog(v) => CParameter::HashLog(v),
            Param::ChainLog(v) => CParameter::ChainLog(v),
            Param::SearchLog(v) => CParameter::SearchLog(v),
            Param::MinMatch(v) => CParameter::MinMatch(v),
            Param::TargetLength(v) => CParameter::TargetLength(v),
            Param::OverlapLog(v) => CParameter::OverlapSizeLog(v),
            Param::LdmHashLog(v) => CParameter::LdmHashLog(v),
            Param::LdmMinMatch(v) => CParameter::LdmMinMatch(v),
            Param::LdmBucketSizeLog(v) => CParameter::LdmBucketSizeLog(v),
            Param::LdmHashRateLog(v) => CParameter::LdmHashRateLog(v),
        };
        self.cctx.set_parameter(p).map(|_| ()).map_err(error_name)
    }

    fn compress_stream(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        directive: EndDirective,
    ) -> Result<StreamStep, EngineError> {
        let end_op = match directive {
            EndDirective::Continue => ZSTD_EndDirective::ZSTD_e_continue,
            EndDirective::End => ZSTD_EndDirective::ZSTD_e_end,
        };
        let mut in_buf = InBuffer::around(input);
        let mut out_buf = OutBuffer::around(output);
        let remaining = self
            .cctx
            .compress_stream2(&mut out_buf, &mut in_buf, end_op)
            .map_err(error_name)?;
        let step = StreamStep {
            consumed: in_buf.pos(),
            produced: out_buf.pos(),
            remaining,
        };
        trace!("zstd step {directive:?}: {step:?}");
        Ok(step)
    }
}
