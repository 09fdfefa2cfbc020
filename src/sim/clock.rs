//! Frame clock
//!
//! Rendered frames arrive at whatever rate the host manages; the simulation
//! only ever advances in whole ticks of one length. A frame longer than the
//! clamp is cut short, so a hitch costs at most a couple of ticks instead of
//! a burst of catch-up steps.

/// Converts frame time into fixed ticks, carrying the remainder forward
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Length of one tick in seconds
    dt: f32,
    /// Largest frame delta accepted; longer frames are truncated.
    max_frame_dt: f32,
    /// Time carried over to the next frame.
    accumulator: f32,
}

impl FrameClock {
    pub fn new(dt: f32, max_frame_dt: f32) -> Self {
        Self {
            dt,
            max_frame_dt,
            accumulator: 0.0,
        }
    }

    /// Feed one frame's duration and get back how many ticks are due
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        // Clamp the frame, not the accumulator, so leftover time is never lost
        self.accumulator += frame_dt.clamp(0.0, self.max_frame_dt);
        let mut steps = 0;
        while self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            steps += 1;
        }
        steps
    }

    /// Fraction of a tick left over, for drawing between ticks
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}
