/// Wall-clock bookkeeping for the frame loop.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    pub time_seconds: f32,
    frames: u64,
    frozen_frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances by one frame. Negative deltas do not rewind the clock.
    pub fn advance(&mut self, delta: f32, frozen: bool) {
        self.time_seconds += delta.max(0.0);
        self.frames += 1;
        if frozen {
            self.frozen_frames += 1;
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames during which scene updates were skipped.
    pub fn frozen_frames(&self) -> u64 {
        self.frozen_frames
    }
}
