//! Fixed timestep accumulator
//!
//! Converts variable wall-clock frame time into a whole number of fixed
//! simulation steps, carrying the sub-step remainder forward so rendering
//! can interpolate between the last two simulated poses.

use tracing::warn;

/// Accumulator that hands out fixed steps for variable frame deltas
///
/// When a frame would need more than `max_substeps` steps, the surplus whole
/// steps are dropped instead of simulated. This bounds the cost of a single
/// `accumulate` call (the "spiral of death" guard). Only whole steps are
/// dropped; the fraction below one step is kept for interpolation.
#[derive(Debug, Clone)]
pub struct FixedStepAccumulator {
    remainder: f32,
    fixed_timestep: f32,
    max_substeps: u32,
    dropped_time: f64,
}

impl FixedStepAccumulator {
    /// Create an accumulator; callers validate `fixed_timestep > 0` and `max_substeps >= 1`
    pub fn new(fixed_timestep: f32, max_substeps: u32) -> Self {
        Self {
            remainder: 0.0,
            fixed_timestep,
            max_substeps,
            dropped_time: 0.0,
        }
    }

    /// Add frame time and return the number of steps to run now
    pub fn accumulate(&mut self, delta_time: f32) -> u32 {
        self.remainder += delta_time;

        let mut steps = 0;
        while self.remainder >= self.fixed_timestep && steps < self.max_substeps {
            self.remainder -= self.fixed_timestep;
            steps += 1;
        }

        if self.remainder >= self.fixed_timestep {
            let kept = self.remainder % self.fixed_timestep;
            let dropped = self.remainder - kept;
            warn!(
                dropped_seconds = dropped,
                max_substeps = self.max_substeps,
                "Frame time exceeds substep budget, dropping excess simulation time"
            );
            self.dropped_time += f64::from(dropped);
            self.remainder = kept;
        }

        steps
    }

    /// How far between the last step and the next one we are, in [0, 1)
    pub fn interpolation_alpha(&self) -> f32 {
        (self.remainder / self.fixed_timestep).clamp(0.0, 1.0)
    }

    /// Time carried over to the next call
    pub fn remainder(&self) -> f32 {
        self.remainder
    }

    /// Total time discarded by the substep cap, in seconds
    pub fn dropped_time(&self) -> f64 {
        self.dropped_time
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

}
