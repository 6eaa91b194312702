//! Session Driver
//!
//! Runs an [`AffectEngine`] against any frame producer. The driver knows
//! nothing about cameras or capture APIs; callers implement [`FrameSource`]
//! over whatever transport they have and the driver supplies monotonic
//! timestamps and cooperative shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::AffectEngine;
use crate::types::{CycleReport, FrameInput};

/// Producer of classification frames. Returning `None` ends the session.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<FrameInput>;
}

/// Monotonic time in microseconds. Injected so tests and replays can drive
/// the dwell and cooldown logic deterministically.
pub trait Clock {
    fn now_us(&self) -> i64;
}

/// Wall-independent clock backed by [`Instant`]; zero is driver creation.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> i64 {
        self.origin.elapsed().as_micros() as i64
    }
}

/// Deterministic clock that advances a fixed step on every read. Replays use
/// it so dwell and cooldown behave identically run to run.
#[derive(Debug)]
pub struct FixedStepClock {
    now: std::cell::Cell<i64>,
    step_us: i64,
}

impl FixedStepClock {
    pub fn new(step_us: i64) -> Self {
        Self {
            now: std::cell::Cell::new(0),
            step_us,
        }
    }
}

impl Clock for FixedStepClock {
    fn now_us(&self) -> i64 {
        let t = self.now.get();
        self.now.set(t + self.step_us);
        t
    }
}

/// Frame source over a pre-recorded sequence, consumed front to back.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: std::collections::VecDeque<FrameInput>,
}

impl ReplaySource {
    pub fn new(frames: Vec<FrameInput>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<FrameInput> {
        self.frames.pop_front()
    }
}

pub struct SessionDriver<C: Clock = MonotonicClock> {
    engine: AffectEngine,
    clock: C,
    stop: Arc<AtomicBool>,
}

impl SessionDriver<MonotonicClock> {
    pub fn new(engine: AffectEngine) -> Self {
        Self::with_clock(engine, MonotonicClock::new())
    }
}

impl<C: Clock> SessionDriver<C> {
    pub fn with_clock(engine: AffectEngine, clock: C) -> Self {
        Self {
            engine,
            clock,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag shared with other threads; setting it stops `run` before the
    /// next cycle.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn engine(&self) -> &AffectEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AffectEngine {
        &mut self.engine
    }

    /// Pull frames until the source is exhausted or the stop flag is set.
    /// Every cycle report is handed to `on_report`. Returns the number of
    /// cycles executed.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_report: F) -> u64
    where
        S: FrameSource,
        F: FnMut(&CycleReport),
    {
        let mut cycles = 0u64;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                log::info!("session stopped after {} cycles", cycles);
                break;
            }
            let frame = match source.next_frame() {
                Some(frame) => frame,
                None => break,
            };
            let report = self.engine.process_frame(&frame, self.clock.now_us());
            cycles += 1;
            on_report(&report);
        }
        cycles
    }
}
