use std::time::Instant;

/// Per-tick timing snapshot handed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeInfo {
    /// Scaled seconds since the previous tick.
    pub delta: f32,
    /// Scaled seconds since the clock was reset.
    pub elapsed: f32,
    /// Ticks completed before this one.
    pub tick: u64,
}

/// Variable-step clock: measures wall-clock time between ticks and scales it.
pub struct Clock {
    last: Instant,
    info: TimeInfo,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            info: TimeInfo::default(),
        }
    }

    /// Restart measuring from now and zero all counters.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.info = TimeInfo::default();
    }

    /// Start measuring from now without touching the counters.
    pub(crate) fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Measure wall-clock time since the previous call and advance by it.
    /// Returns the scaled delta.
    pub fn advance(&mut self, time_scale: f32) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.advance_by(raw, time_scale)
    }

    /// Advance by a supplied raw delta in seconds. Returns the scaled delta.
    pub fn advance_by(&mut self, raw: f32, time_scale: f32) -> f32 {
        let delta = raw * time_scale;
        self.info.delta = delta;
        self.info.elapsed += delta;
        delta
    }

    /// Mark the current tick as finished.
    pub fn finish_tick(&mut self) {
        self.info.tick += 1;
    }

    pub fn info(&self) -> TimeInfo {
        self.info
    }

    pub fn delta(&self) -> f32 {
        self.info.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.info.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.info.tick
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
