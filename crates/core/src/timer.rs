//! Elapsed-time tracker.
//!
//! The timer never reads a clock itself: callers pass `now_ms` from whatever
//! monotonic source they drive the game with. Each `start` opens a new epoch so
//! tick callbacks scheduled for an earlier run can be recognised and dropped.

#[derive(Debug, Clone, Default)]
pub struct Timer {
    started_at_ms: Option<u64>,
    frozen_ms: Option<u64>,
    running: bool,
    epoch: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer at `now_ms` and return the new epoch.
    ///
    /// Restarting while running replaces the start timestamp; nothing stacks.
    pub fn start(&mut self, now_ms: u64) -> u32 {
        self.started_at_ms = Some(now_ms);
        self.frozen_ms = None;
        self.running = true;
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    /// Stop the timer, freezing the elapsed time.
    ///
    /// Returns the frozen elapsed time, or `None` if the timer was not running.
    pub fn stop(&mut self, now_ms: u64) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.running = false;
        let elapsed = self.measure(now_ms);
        self.frozen_ms = Some(elapsed);
        Some(elapsed)
    }

    /// Stop and forget the run entirely; elapsed goes back to zero.
    ///
    /// Returns whether the timer was running.
    pub fn clear(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.started_at_ms = None;
        self.frozen_ms = None;
        was_running
    }

    /// Elapsed milliseconds: live while running, frozen after `stop`.
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        if self.running {
            self.measure(now_ms)
        } else {
            self.frozen_ms.unwrap_or(0)
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// True while running under `epoch`; ticks from other epochs are stale.
    pub fn is_current(&self, epoch: u32) -> bool {
        self.running && self.epoch == epoch
    }

    fn measure(&self, now_ms: u64) -> u64 {
        self.started_at_ms
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0)
    }
}
