//! The per-run context object
//!
//! One `RunContext` is built per run and handed to the ingestion and drain
//! call sites explicitly. `push` and `flush` paths serialize on a single
//! mutex around the correlator, since a match inspects and may mutate both
//! buffers; the run-stop drain may arrive from a different thread than
//! steady-state ingestion.

use parking_lot::Mutex;

use crate::config::RunConfig;
use crate::error::RunControlError;
use crate::metrics::{MetricsCollector, RunMetrics};
use crate::record::{RawEvent, Record};
use tstamp::{
    ClockModel, Correlator, MatchResult, QueueStats, RecordErr, ReplayCache, Resolved, Serial,
    Source, TimestampedEvent,
};

/// Consumer of match results. Implementations are passed into `handle` and
/// `run_stop` per call and never retained.
pub trait ResultSink {
    fn consume(&mut self, result: MatchResult);
}

impl<F: FnMut(MatchResult)> ResultSink for F {
    fn consume(&mut self, result: MatchResult) {
        self(result)
    }
}

pub struct RunContext {
    cfg: RunConfig,
    clock: ClockModel,
    correlator: Mutex<Correlator>,
    replay: Mutex<ReplayCache>,
    metrics: MetricsCollector,
    run_number: Mutex<Option<u32>>,
}

impl RunContext {
    pub fn new(cfg: RunConfig) -> Result<Self, RunControlError> {
        let engine_cfg = cfg.engine_cfg();
        let correlator = Correlator::new(engine_cfg)?;
        let replay = ReplayCache::with_capacity(engine_cfg.replay_capacity);
        tracing::info!(
            window_us = engine_cfg.window_us,
            queue_time_us = engine_cfg.max_residency_us,
            max_depth = engine_cfg.max_depth,
            "creating run context"
        );
        Ok(Self {
            cfg,
            clock: engine_cfg.clock,
            correlator: Mutex::new(correlator),
            replay: Mutex::new(replay),
            metrics: MetricsCollector::new(),
            run_number: Mutex::new(None),
        })
    }

    /// Dispatch one inbound record. Trigger events go through the matching
    /// queue; everything the push produces is handed to `sink` in emission
    /// order. Scalers and run parameters only touch bookkeeping.
    pub fn handle(&self, record: Record, sink: &mut dyn ResultSink) {
        match record {
            Record::Head(raw) => self.ingest(Source::Head, raw, sink),
            Record::Tail(raw) => self.ingest(Source::Tail, raw, sink),
            Record::HeadScaler(s) | Record::TailScaler(s) => {
                self.metrics.record_scaler();
                tracing::debug!(source = ?s.source, serial = s.serial, "scaler block");
            }
            Record::RunParameter(p) => {
                self.metrics.record_run_parameter();
                *self.run_number.lock() = Some(p.run_number);
                tracing::info!(run_number = p.run_number, "run parameters received");
            }
        }
    }

    /// Single-use replay-cache query for consumers re-examining an already
    /// resolved event by serial number.
    pub fn resolve(&self, source: Source, serial: Serial) -> Option<Resolved> {
        let resolved = self.replay.lock().take(source, serial);
        self.metrics.record_replay(resolved.is_some());
        resolved
    }

    /// Begin-run transition.
    pub fn run_start(&self, run_number: u32) {
        *self.run_number.lock() = Some(run_number);
        tracing::info!(run_number, "start of run");
    }

    /// End-of-run transition: drain both buffers under the configured
    /// wall-clock budget. Returns the number of results delivered.
    pub fn run_stop(&self, sink: &mut dyn ResultSink) -> usize {
        let run_number = *self.run_number.lock();
        tracing::info!(?run_number, "end of run, draining matching queue");
        let results = self.correlator.lock().flush(self.cfg.flush_budget_secs as f64);
        let n = results.len();
        self.deliver(results, sink);
        if self.cfg.monitoring.emit_metrics {
            self.emit_metrics();
        }
        n
    }

    /// Copied snapshot of queue state; never a live reference into buffers.
    pub fn stats(&self) -> QueueStats {
        self.correlator.lock().stats()
    }

    pub fn metrics(&self) -> RunMetrics {
        self.metrics.snapshot()
    }

    pub fn run_number(&self) -> Option<u32> {
        *self.run_number.lock()
    }

    /// Configure the coincidence window; applies to subsequent pushes only.
    pub fn set_window_us(&self, window_us: f64) -> Result<(), RunControlError> {
        self.correlator.lock().set_window_us(window_us)?;
        Ok(())
    }

    pub fn set_max_depth(&self, max_depth: usize) -> Result<(), RunControlError> {
        self.correlator.lock().set_max_depth(max_depth)?;
        Ok(())
    }

    pub fn set_max_residency_us(&self, max_residency_us: f64) -> Result<(), RunControlError> {
        self.correlator.lock().set_max_residency_us(max_residency_us)?;
        Ok(())
    }

    fn ingest(&self, source: Source, raw: RawEvent, sink: &mut dyn ResultSink) {
        self.metrics.record_event(source);
        let event =
            TimestampedEvent::from_raw(source, raw.serial, raw.raw_clock, raw.payload, &self.clock);
        // hold the correlator lock only for the push; the sink runs outside
        let results = self.correlator.lock().push(event);
        self.deliver(results, sink);
    }

    fn deliver(&self, results: Vec<MatchResult>, sink: &mut dyn ResultSink) {
        for result in results {
            match &result {
                MatchResult::Coincidence { head, tail, xtrig } => {
                    self.metrics.record_coincidence();
                    let resolved = Resolved { matched: true, xtrig: Some(*xtrig) };
                    let mut replay = self.replay.lock();
                    for ev in [head, tail] {
                        if let Err(RecordErr::Duplicate) =
                            replay.record(ev.source, ev.serial, resolved)
                        {
                            tracing::debug!(
                                source = ?ev.source,
                                serial = ev.serial,
                                "serial already recorded in replay cache"
                            );
                        }
                    }
                }
                MatchResult::Singles { .. } => self.metrics.record_singles(),
            }
            sink.consume(result);
        }
    }

    fn emit_metrics(&self) {
        let snapshot = self.metrics.snapshot();
        tracing::info!(metrics = %snapshot.to_json(), "run metrics");
    }
}
