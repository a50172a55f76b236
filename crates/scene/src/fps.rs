use std::time::Instant;

/// Frame-rate meter with a one-second window.
///
/// Every tick counts a frame. Once more than 1000 ms have passed since the
/// window opened, the rate is `frames * 1000 / elapsed_ms` and a new window
/// opens at that tick with the count reset to one.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: Option<Instant>,
    last: Option<u32>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh window at `now`.
    pub fn start(&mut self, now: Instant) {
        self.window_start = Some(now);
        self.frames = 0;
    }

    /// Count one frame. Returns the rate when the window closes.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed_ms = now.saturating_duration_since(start).as_millis();
        if elapsed_ms <= 1000 {
            return None;
        }
        let fps = (u128::from(self.frames) * 1000 / elapsed_ms) as u32;
        self.window_start = Some(now);
        self.frames = 1;
        self.last = Some(fps);
        Some(fps)
    }

    /// Most recent completed measurement.
    pub fn last(&self) -> Option<u32> {
        self.last
    }
}
