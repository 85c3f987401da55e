//! Real-time driver: ticks a `Simulation` on a worker thread at a fixed
//! wall-clock cadence until stopped.
//!
//! Starting an already running runner is an error, not a restart. `stop` is
//! idempotent, lets the in-flight tick finish, and guarantees no event is
//! delivered after it returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::ecs::app::Simulation;
use crate::error::RunnerError;

enum RunnerState {
    Idle(Simulation),
    Running(Worker),
    /// The worker panicked and took the simulation with it.
    Lost,
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Simulation>,
}

/// Owns a simulation and runs it in the background on demand.
pub struct SimulationRunner {
    state: RunnerState,
}

impl SimulationRunner {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            state: RunnerState::Idle(simulation),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunnerState::Running(_))
    }

    /// The simulation, while not running.
    pub fn simulation(&self) -> Option<&Simulation> {
        match &self.state {
            RunnerState::Idle(sim) => Some(sim),
            _ => None,
        }
    }

    /// Start ticking every `interval_override` (or the configured tick interval).
    ///
    /// Simulated time continues from where the simulation left off, advanced
    /// by wall-clock time elapsed since this call.
    pub fn start(&mut self, interval_override: Option<Duration>) -> Result<(), RunnerError> {
        if interval_override.is_some_and(|interval| interval.is_zero()) {
            return Err(RunnerError::ZeroInterval);
        }
        match std::mem::replace(&mut self.state, RunnerState::Lost) {
            RunnerState::Idle(sim) => {
                let interval = interval_override.unwrap_or(sim.config().tick_interval);
                let stop = Arc::new(AtomicBool::new(false));
                let flag = Arc::clone(&stop);
                tracing::info!(interval_ms = interval.as_millis() as u64, "simulation started");
                let handle = thread::spawn(move || run_ticks(sim, interval, &flag));
                self.state = RunnerState::Running(Worker { stop, handle });
                Ok(())
            }
            RunnerState::Running(worker) => {
                self.state = RunnerState::Running(worker);
                Err(RunnerError::AlreadyRunning)
            }
            RunnerState::Lost => Err(RunnerError::WorkerPanicked),
        }
    }

    /// Halt future ticks and wait for the current one to finish.
    /// A no-op when not running.
    pub fn stop(&mut self) -> Result<(), RunnerError> {
        let worker = match std::mem::replace(&mut self.state, RunnerState::Lost) {
            RunnerState::Running(worker) => worker,
            other => {
                self.state = other;
                return Ok(());
            }
        };
        worker.stop.store(true, Ordering::Release);
        worker.handle.thread().unpark();
        match worker.handle.join() {
            Ok(sim) => {
                tracing::info!(ticks = sim.tick_count(), now = sim.now().as_millis(), "simulation stopped");
                self.state = RunnerState::Idle(sim);
                Ok(())
            }
            Err(_) => {
                tracing::warn!("tick worker panicked; simulation lost");
                Err(RunnerError::WorkerPanicked)
            }
        }
    }

    /// Stop if needed and hand the simulation back.
    pub fn into_simulation(mut self) -> Result<Simulation, RunnerError> {
        self.stop()?;
        match std::mem::replace(&mut self.state, RunnerState::Lost) {
            RunnerState::Idle(sim) => Ok(sim),
            _ => Err(RunnerError::WorkerPanicked),
        }
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Worker loop. Sleeps with `park_timeout` so `stop` can wake it early, and
/// skips slots it fell behind on instead of bursting to catch up.
fn run_ticks(mut sim: Simulation, interval: Duration, stop: &AtomicBool) -> Simulation {
    let base = sim.now();
    let started = Instant::now();
    let mut next_at = started + interval;
    loop {
        loop {
            if stop.load(Ordering::Acquire) {
                return sim;
            }
            let now = Instant::now();
            if now >= next_at {
                break;
            }
            thread::park_timeout(next_at - now);
        }
        sim.tick(base + started.elapsed());
        next_at += interval;
        let now = Instant::now();
        while next_at <= now {
            next_at += interval;
        }
    }
}
