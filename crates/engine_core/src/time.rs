//! Time management for the game loop.
//!
//! The simulation never reads the wall clock. The driver feeds frame deltas
//! into [`Time`] and consumes fixed steps from the accumulator.

use std::time::Duration;

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for simulation (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Advance by one frame of `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_yields_fixed_steps() {
        let mut t = Time::new();
        t.set_fixed_rate(10.0);
        t.advance(Duration::from_millis(250));
        let mut steps = 0;
        while t.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(t.frame_count(), 1);
    }
}
