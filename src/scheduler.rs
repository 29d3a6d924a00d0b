//! Frame pacing.
//!
//! The host reports how long each display frame took. Simulation ticks are paced at a fixed
//! target rate independent of the display's refresh rate: a frame that comes too early is
//! skipped, and a late frame still runs one tick, keeping only the overshoot past a whole
//! interval so the pacing does not drift.

use std::time::Duration;

use log::debug;

pub const DEFAULT_TARGET_FPS: u32 = 60;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Inverse of `Duration::as_nanos` for values that came from one.
fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}

fn saturating_add(a: Duration, b: Duration) -> Duration {
    a.checked_add(b).unwrap_or_else(|| Duration::new(u64::max_value(), 999_999_999))
}

/// Display time covered by `frames` frames of `frame` each, saturating at the largest `Duration`.
pub fn frames_duration(frame: Duration, frames: u64) -> Duration {
    let nanos = frame.as_nanos().saturating_mul(u128::from(frames));
    let max = Duration::new(u64::max_value(), 999_999_999);
    if nanos >= max.as_nanos() {
        max
    } else {
        duration_from_nanos(nanos)
    }
}

/// Decides which display frames run a simulation tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameScheduler {
    interval: Duration,
    accumulated: Duration,
}

impl FrameScheduler {
    /// A scheduler ticking `target_fps` times per second. A target of 0 is treated as 1.
    pub fn new(target_fps: u32) -> FrameScheduler {
        FrameScheduler::with_interval(Duration::from_nanos(1_000_000_000 / u64::from(target_fps.max(1))))
    }

    pub fn with_interval(interval: Duration) -> FrameScheduler {
        FrameScheduler {
            interval,
            accumulated: Duration::from_secs(0),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time since the last tick, less any overshoot already carried into it.
    #[inline]
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Forget time accumulated so far, as after a pause.
    pub fn reset(&mut self) {
        self.accumulated = Duration::from_secs(0);
    }

    /// Account for a display frame that took `elapsed` and report whether it runs a tick.
    /// At most one tick is run per frame however late it is.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated = saturating_add(self.accumulated, elapsed);
        if self.accumulated < self.interval {
            return false;
        }

        let interval_nanos = self.interval.as_nanos();
        if interval_nanos == 0 {
            self.accumulated = Duration::from_secs(0);
        } else {
            self.accumulated = duration_from_nanos(self.accumulated.as_nanos() % interval_nanos);
        }
        true
    }
}

impl Default for FrameScheduler {
    fn default() -> FrameScheduler {
        FrameScheduler::new(DEFAULT_TARGET_FPS)
    }
}

/// A frame scheduler that can be paused. While stopped no frames run ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationDriver {
    scheduler: FrameScheduler,
    running: bool,
}

impl AnimationDriver {
    pub fn new(scheduler: FrameScheduler) -> AnimationDriver {
        AnimationDriver {
            scheduler,
            running: false,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Begin pacing ticks. Starting a running driver does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.scheduler.reset();
        self.running = true;
        debug!("Animation started at {:?} per tick", self.scheduler.interval());
    }

    /// Stop pacing ticks. Stopping a stopped driver does nothing.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        debug!("Animation stopped");
    }

    /// Whether the display frame that took `elapsed` runs a tick.
    pub fn frame(&mut self, elapsed: Duration) -> bool {
        self.running && self.scheduler.advance(elapsed)
    }
}

/// Counts ticks over one second windows of display time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FpsCounter {
    window: Duration,
    ticks_in_window: u32,
    last_rate: Option<u32>,
}

impl FpsCounter {
    pub fn new() -> FpsCounter {
        FpsCounter::default()
    }

    /// Record a display frame and whether it ran a tick. Returns the tick rate of the window
    /// that just closed, if this frame closed one.
    pub fn record(&mut self, elapsed: Duration, ticked: bool) -> Option<u32> {
        if ticked {
            self.ticks_in_window += 1;
        }
        self.window = saturating_add(self.window, elapsed);
        if self.window < Duration::from_secs(1) {
            return None;
        }

        let rate = self.ticks_in_window;
        self.last_rate = Some(rate);
        self.ticks_in_window = 0;
        self.window = duration_from_nanos(self.window.as_nanos() % NANOS_PER_SEC);
        Some(rate)
    }

    /// Ticks counted in the last complete window.
    #[inline]
    pub fn last_rate(&self) -> Option<u32> {
        self.last_rate
    }
}
