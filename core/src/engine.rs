//! The batch scheduler — drives repeated journeys at a fixed rate.
//!
//! STATE MACHINE: Idle → Running → (Completed | Stopped).
//!
//! RULES:
//!   - One logical run at a time; start() on a running engine is
//!     rejected and leaves the run untouched.
//!   - Each tick processes up to records_per_second journeys
//!     sequentially and invokes the progress observer exactly once.
//!   - current_record never exceeds total_records; the run completes
//!     exactly when they are equal.
//!   - The results accumulator is only ever mutated from tick().

use crate::{
    config::SimConfig,
    error::SimResult,
    flags::FlagClient,
    journey::JourneySimulator,
    profile::ProfileGenerator,
    results::{SimulationProgress, SimulationResults},
    rng::SimRng,
    sink::EventSink,
    types::RecordIndex,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Stopped,
}

/// Outcome of a start() call. The original behavior was a silent no-op
/// when already running; callers now get told, but the run itself is
/// still untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Per-tick progress and completion notifications. Callbacks are never
/// invoked concurrently — everything happens on the ticking thread.
pub trait SimulationObserver {
    fn on_progress(&mut self, _progress: &SimulationProgress) {}
    fn on_complete(&mut self, _results: &SimulationResults) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

pub struct SimulationEngine {
    config: Arc<SimConfig>,
    profiles: ProfileGenerator,
    journeys: JourneySimulator,
    rng: SimRng,
    state: RunState,
    current_record: RecordIndex,
    total_records: RecordIndex,
    results: SimulationResults,
    started_at: Option<Instant>,
}

impl SimulationEngine {
    /// Entropy-seeded engine — the production default.
    pub fn new(
        config: SimConfig,
        flags: Arc<dyn FlagClient>,
        sink: Arc<dyn EventSink>,
    ) -> SimResult<Self> {
        Self::with_rng(config, flags, sink, SimRng::from_entropy())
    }

    /// Seeded engine for reproducible tests.
    pub fn with_rng(
        config: SimConfig,
        flags: Arc<dyn FlagClient>,
        sink: Arc<dyn EventSink>,
        rng: SimRng,
    ) -> SimResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let profiles = ProfileGenerator::new(config.user_generation.clone());
        let journeys = JourneySimulator::new(Arc::clone(&config), flags, sink)?;
        let total_records = config.total_records();
        Ok(Self {
            config,
            profiles,
            journeys,
            rng,
            state: RunState::Idle,
            current_record: 0,
            total_records,
            results: SimulationResults::default(),
            started_at: None,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn results(&self) -> &SimulationResults {
        &self.results
    }

    pub fn total_records(&self) -> RecordIndex {
        self.total_records
    }

    /// Begin a run. Rejected while one is already in flight; starting
    /// after completion or a stop begins a fresh run.
    pub fn start(&mut self) -> StartOutcome {
        if self.state == RunState::Running {
            return StartOutcome::AlreadyRunning;
        }
        self.state = RunState::Running;
        self.current_record = 0;
        self.total_records = self.config.total_records();
        self.results = SimulationResults::default();
        self.started_at = Some(Instant::now());
        log::info!(
            "simulation started: {} records over {}s at {}/s",
            self.total_records,
            self.config.duration_secs,
            self.config.records_per_second
        );
        StartOutcome::Started
    }

    /// Process one batch. No-op unless running. Invokes on_progress
    /// exactly once, and on_complete when this tick finishes the run.
    pub fn tick(&mut self, observer: &mut dyn SimulationObserver) -> SimResult<RunState> {
        if self.state != RunState::Running {
            return Ok(self.state);
        }

        let remaining = self.total_records - self.current_record;
        let batch = (self.config.records_per_second as u64).min(remaining);
        for _ in 0..batch {
            let profile = self.profiles.generate(&mut self.rng);
            match self.journeys.run(profile, &mut self.rng) {
                Ok(outcome) => self.results.record_journey(&outcome),
                Err(e) => {
                    // The record slot is still consumed — a completed
                    // run always accounts for every scheduled user.
                    log::warn!("journey skipped: {e}");
                    self.results.record_skipped();
                }
            }
            self.current_record += 1;
        }

        observer.on_progress(&self.progress());

        if self.current_record >= self.total_records {
            self.results.duration_ms = self
                .started_at
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0);
            self.state = RunState::Completed;
            self.started_at = None;
            log::info!(
                "simulation complete: {} users, {} distinct events",
                self.results.total_users,
                self.results.events.len()
            );
            observer.on_complete(&self.results);
        }

        Ok(self.state)
    }

    /// Cancel a running simulation. No further observer callbacks; a
    /// stopped run is distinguishable from a completed one only by the
    /// absence of on_complete. No-op when nothing is running.
    pub fn stop(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.state = RunState::Stopped;
        self.started_at = None;
        log::info!(
            "simulation stopped at record {}/{}",
            self.current_record,
            self.total_records
        );
    }

    pub fn progress(&self) -> SimulationProgress {
        SimulationProgress {
            current_record: self.current_record,
            total_records: self.total_records,
            percentage: self.current_record as f64 / self.total_records as f64 * 100.0,
            results: self.results.clone(),
        }
    }

    /// Drive a whole run at one batch per wall-clock second, sleeping
    /// max(0, 1s − batch time) between ticks so long batches do not
    /// accumulate drift. Tests call tick() directly instead.
    pub fn run_to_completion(
        &mut self,
        observer: &mut dyn SimulationObserver,
    ) -> SimResult<SimulationResults> {
        self.start();
        while self.state == RunState::Running {
            let tick_started = Instant::now();
            self.tick(observer)?;
            if self.state != RunState::Running {
                break;
            }
            let elapsed = tick_started.elapsed();
            if elapsed < TICK_INTERVAL {
                std::thread::sleep(TICK_INTERVAL - elapsed);
            }
        }
        Ok(self.results.clone())
    }
}
