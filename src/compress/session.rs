// Engine session: one compression context plus its two staging buffers.
//
// The session is opened lazily on the first `code()` call and configured
// exactly once. Dropping it releases the context and both buffers together;
// a session that failed halfway through `open` owns nothing extra.

use log::{debug, warn};

use crate::engine::{Engine, EndDirective, Param, StreamStep};
use crate::error::EncodeError;
use crate::params::EncoderConfig;

/// Owned engine context and staging buffers for one stream.
pub struct EngineSession<E: Engine> {
    engine: E,
    src_buf: Vec<u8>,
    dst_buf: Vec<u8>,
}

fn alloc_buffer(len: usize, what: &str) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| EncodeError::OutOfMemory(format!("{what} buffer ({len} bytes): {e}")))?;
    buf.resize(len, 0);
    Ok(buf)
}

impl<E: Engine> EngineSession<E> {
    /// Create the context, allocate the buffers and push `cfg`, clamped, to
    /// the engine.
    ///
    /// Fails with `OutOfMemory` if any allocation fails and with
    /// `InvalidArgument` if the engine rejects a parameter.
    pub fn open<F>(make_engine: F, cfg: &EncoderConfig) -> Result<Self, EncodeError>
    where
        F: FnOnce() -> Option<E>,
    {
        let mut cfg = cfg.clone();
        cfg.normalize();
        let engine = make_engine()
            .ok_or_else(|| EncodeError::OutOfMemory("compression context".into()))?;
        let src_buf = alloc_buffer(engine.in_size(), "input")?;
        let dst_buf = alloc_buffer(engine.out_size(), "output")?;

        let mut session = Self {
            engine,
            src_buf,
            dst_buf,
        };
        session.apply(&cfg)?;
        debug!(
            "engine session open: level={} threads={} in_buf={} out_buf={}",
            cfg.level,
            cfg.num_threads,
            session.src_buf.len(),
            session.dst_buf.len()
        );
        Ok(session)
    }

    fn set(&mut self, param: Param) -> Result<(), EncodeError> {
        self.engine.set_parameter(param).map_err(|e| {
            warn!("engine rejected {param:?}: {e}");
            EncodeError::invalid(format!("{param:?}: {e}"))
        })
    }

    /// Push the configuration to the engine. Unset fields are left to the
    /// engine's defaults.
    fn apply(&mut self, cfg: &EncoderConfig) -> Result<(), EncodeError> {
        self.set(Param::CompressionLevel(i32::from(cfg.level)))?;
        self.set(Param::NbWorkers(cfg.num_threads))?;
        self.set(Param::ContentSizeFlag(true))?;

        if cfg.resolved_long() {
            self.set(Param::EnableLongDistanceMatching(true))?;
        }

        let optional: [(Option<u32>, fn(u32) -> Param); 12] = [
            (cfg.strategy, Param::Strategy),
            (cfg.window_log, Param::WindowLog),
            (cfg.hash_log, Param::HashLog),
            (cfg.chain_log, Param::ChainLog),
            (cfg.search_log, Param::SearchLog),
            (cfg.min_match, Param::MinMatch),
            (cfg.target_length, Param::TargetLength),
            (cfg.overlap_log, Param::OverlapLog),
            (cfg.ldm_hash_log, Param::LdmHashLog),
            (cfg.ldm_min_match, Param::LdmMinMatch),
            (cfg.ldm_bucket_size_log, Param::LdmBucketSizeLog),
            (cfg.ldm_hash_rate_log, Param::LdmHashRateLog),
        ];
        for (value, param) in optional {
            if let Some(v) = value {
                self.set(param(v))?;
            }
        }
        Ok(())
    }

    /// Input staging buffer, full capacity.
    pub fn src_buf_mut(&mut self) -> &mut [u8] {
        &mut self.src_buf
    }

    /// Run one engine step on `src_buf[range]`, writing into the output
    /// staging buffer from its start. Returns the step and the produced bytes.
    pub fn step(
        &mut self,
        start: usize,
        end: usize,
        directive: EndDirective,
    ) -> Result<(StreamStep, &[u8]), EncodeError> {
        let step = self
            .engine
            .compress_stream(&self.src_buf[start..end], &mut self.dst_buf, directive)
            .map_err(|e| EncodeError::Fail(e.to_string()))?;
        Ok((step, &self.dst_buf[..step.produced]))
    }

    pub fn in_capacity(&self) -> usize {
        self.src_buf.len()
    }

    pub fn out_capacity(&self) -> usize {
        self.dst_buf.len()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    /// Records every parameter pushed to it; optionally refuses one.
    #[derive(Default)]
    struct RecordingEngine {
        params: Vec<Param>,
        refuse_window: bool,
    }

    impl Engine for RecordingEngine {
        fn in_size(&self) -> usize {
            16
        }

        fn out_size(&self) -> usize {
            32
        }

        fn set_parameter(&mut self, param: Param) -> Result<(), EngineError> {
            if self.refuse_window && matches!(param, Param::WindowLog(_)) {
                return Err(EngineError("parameter out of bound".into()));
            }
            self.params.push(param);
            Ok(())
        }

        fn compress_stream(
            &mut self,
            input: &[u8],
            output: &mut [u8],
            _directive: EndDirective,
        ) -> Result<StreamStep, EngineError> {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            Ok(StreamStep {
                consumed: n,
                produced: n,
                remaining: 0,
            })
        }
    }

    #[test]
    fn default_config_pushes_core_params_only() {
        let mut cfg = EncoderConfig::default();
        cfg.num_threads = 2;
        let s = EngineSession::open(|| Some(RecordingEngine::default()), &cfg).unwrap();
        assert_eq!(
            s.engine().params,
            vec![
                Param::CompressionLevel(3),
                Param::NbWorkers(2),
                Param::ContentSizeFlag(true),
            ]
        );
        assert_eq!(s.in_capacity(), 16);
        assert_eq!(s.out_capacity(), 32);
    }

    #[test]
    fn ldm_is_resolved_before_explicit_params() {
        let mut cfg = EncoderConfig::default();
        cfg.num_threads = 1;
        cfg.window_log = Some(29);
        cfg.strategy = Some(4);
        cfg.target_length = Some(64);
        cfg.ldm_hash_rate_log = Some(5);
        let s = EngineSession::open(|| Some(RecordingEngine::default()), &cfg).unwrap();
        assert_eq!(
            s.engine().params,
            vec![
                Param::CompressionLevel(3),
                Param::NbWorkers(1),
                Param::ContentSizeFlag(true),
                Param::EnableLongDistanceMatching(true),
                Param::Strategy(4),
                Param::WindowLog(29),
                Param::TargetLength(64),
                Param::LdmHashRateLog(5),
            ]
        );
    }

    #[test]
    fn rejected_param_is_invalid_argument() {
        let mut cfg = EncoderConfig::default();
        cfg.window_log = Some(20);
        let err = EngineSession::open(
            || {
                Some(RecordingEngine {
                    refuse_window: true,
                    ..Default::default()
                })
            },
            &cfg,
        )
        .err()
        .unwrap();
        assert!(matches!(err, EncodeError::InvalidArgument(_)));
    }

    #[test]
    fn missing_context_is_out_of_memory() {
        let err = EngineSession::<RecordingEngine>::open(|| None, &EncoderConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, EncodeError::OutOfMemory(_)));
    }

    /// Reports an input size no allocator can satisfy.
    struct OversizedEngine;

    impl Engine for OversizedEngine {
        fn in_size(&self) -> usize {
            usize::MAX
        }

        fn out_size(&self) -> usize {
            32
        }

        fn set_parameter(&mut self, _param: Param) -> Result<(), EngineError> {
            Ok(())
        }

        fn compress_stream(
            &mut self,
            _input: &[u8],
            _output: &mut [u8],
            _directive: EndDirective,
        ) -> Result<StreamStep, EngineError> {
            Ok(StreamStep::default())
        }
    }

    #[test]
    fn buffer_allocation_failure_is_out_of_memory() {
        let err = EngineSession::open(|| Some(OversizedEngine), &EncoderConfig::default())
            .err()
            .unwrap();
        match err {
            EncodeError::OutOfMemory(msg) => assert!(msg.starts_with("input buffer"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_config_is_clamped_before_apply() {
        let mut cfg = EncoderConfig::default();
        cfg.level = 200;
        cfg.num_threads = 1;
        cfg.strategy = Some(9);
        cfg.window_log = Some(2);
        let s = EngineSession::open(|| Some(RecordingEngine::default()), &cfg).unwrap();
        assert_eq!(
            s.engine().params,
            vec![
                Param::CompressionLevel(22),
                Param::NbWorkers(1),
                Param::ContentSizeFlag(true),
                Param::Strategy(8),
                Param::WindowLog(10),
            ]
        );
    }

    #[test]
    fn step_reads_from_staged_input() {
        let cfg = EncoderConfig::default();
        let mut s = EngineSession::open(|| Some(RecordingEngine::default()), &cfg).unwrap();
        s.src_buf_mut()[..4].copy_from_slice(b"abcd");
        let (step, out) = s.step(1, 4, EndDirective::Continue).unwrap();
        assert_eq!(step.consumed, 3);
        assert_eq!(out, b"bcd");
    }
}
