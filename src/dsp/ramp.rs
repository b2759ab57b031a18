/*
Linear Control Ramp
===================

A ramper smooths a control value that arrives in discrete jumps (a pitch
bend wheel, a fader) into a run of small steps, so the parameter it drives
never changes abruptly enough to click.

Vocabulary
----------

  current     The value handed to the consumer right now.

  target      Where the value is heading. Moving the target never moves
              `current`; only `advance()` does.

  call rate   How often `advance()` is called per second. The block renderer
              calls it once per audio block, so the call rate is
              sample_rate / block_frames (e.g. 48000 / 256 = 187.5 Hz).

  steps       Number of `advance()` calls a ramp takes:
                  steps = max(1, round(ramp_ms / 1000 * call_rate))

Every new target spreads the remaining distance evenly over `steps` calls:

    value
      t ┤            ●────────
        │         ●
        │      ●
      c ┤───●
        └──┴──┴──┴──┴──────→ advance() calls
           1  2  3  4 (steps = 4)

The last step lands exactly on the target, so float drift never leaves the
value hovering a hair away from it.
*/

const MIN_VALUE: f32 = -1.0;
const MAX_VALUE: f32 = 1.0;

/// Linear ramp for control values on the range [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamper {
    current: f32,
    target: f32,
    steps_per_ramp: u32,
    delta: f32,
    remaining: u32,
}

impl LinearRamper {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            steps_per_ramp: 1,
            delta: 0.0,
            remaining: 0,
        }
    }

    /// Configure how long a full ramp takes, given how often `advance` runs.
    ///
    /// Non-finite or non-positive inputs collapse to a single-step ramp.
    pub fn set_ramp_time(&mut self, call_rate_hz: f32, ramp_ms: f32) {
        let steps = ramp_ms / 1000.0 * call_rate_hz;
        self.steps_per_ramp = if steps.is_finite() && steps >= 1.0 {
            steps.round().min(u32::MAX as f32) as u32
        } else {
            1
        };

        // Re-spread whatever is left of an in-flight ramp
        if self.remaining > 0 {
            self.retarget();
        }
    }

    /// Move the destination; the current value is left where it is.
    pub fn set_target(&mut self, target: f32) {
        self.target = clamp_value(target);
        self.retarget();
    }

    /// Jump straight to the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.delta = 0.0;
        self.remaining = 0;
    }

    /// Take one step toward the target.
    pub fn advance(&mut self) {
        if self.remaining == 0 {
            return;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target;
            return;
        }

        let next = self.current + self.delta;
        // Never step past the target, whichever direction we travel
        self.current = if self.delta > 0.0 {
            next.min(self.target)
        } else {
            next.max(self.target)
        };
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn steps_per_ramp(&self) -> u32 {
        self.steps_per_ramp
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    fn retarget(&mut self) {
        if self.current == self.target {
            self.delta = 0.0;
            self.remaining = 0;
            return;
        }
        self.delta = (self.target - self.current) / self.steps_per_ramp as f32;
        self.remaining = self.steps_per_ramp;
    }
}

impl Default for LinearRamper {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn clamp_value(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(MIN_VALUE, MAX_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramper_with_steps(steps: u32) -> LinearRamper {
        let mut ramper = LinearRamper::new();
        // 1000 Hz call rate -> one step per ms
        ramper.set_ramp_time(1000.0, steps as f32);
        ramper
    }

    #[test]
    fn ramp_time_sets_step_count() {
        let mut ramper = LinearRamper::new();
        ramper.set_ramp_time(48_000.0 / 256.0, 5.0);
        assert_eq!(ramper.steps_per_ramp(), 1);

        ramper.set_ramp_time(48_000.0 / 64.0, 20.0);
        assert_eq!(ramper.steps_per_ramp(), 15);

        ramper.set_ramp_time(f32::NAN, 5.0);
        assert_eq!(ramper.steps_per_ramp(), 1);
    }

    #[test]
    fn converges_monotonically_without_overshoot() {
        for &(start, target) in &[(0.0, 0.5), (0.8, -0.6), (-1.0, 1.0), (0.25, 0.2)] {
            let mut ramper = ramper_with_steps(10);
            ramper.set_target(start);
            ramper.snap_to_target();
            ramper.set_target(target);

            let mut previous = ramper.current();
            for _ in 0..10 {
                ramper.advance();
                let value = ramper.current();
                if target > start {
                    assert!(value >= previous && value <= target, "{start}->{target}: {value}");
                } else {
                    assert!(value <= previous && value >= target, "{start}->{target}: {value}");
                }
                previous = value;
            }

            assert_eq!(ramper.current(), target);
            assert!(!ramper.is_ramping());
        }
    }

    #[test]
    fn set_target_keeps_current_value() {
        let mut ramper = ramper_with_steps(4);
        ramper.set_target(1.0);
        assert_eq!(ramper.current(), 0.0);

        ramper.advance();
        assert!((ramper.current() - 0.25).abs() < 1e-6);

        // Retarget mid-ramp: no jump, remaining distance re-spread
        ramper.set_target(-1.0);
        assert!((ramper.current() - 0.25).abs() < 1e-6);
        for _ in 0..4 {
            ramper.advance();
        }
        assert_eq!(ramper.current(), -1.0);
    }

    #[test]
    fn snap_to_target_is_immediate() {
        let mut ramper = ramper_with_steps(100);
        ramper.set_target(0.7);
        ramper.advance();
        ramper.snap_to_target();

        assert_eq!(ramper.current(), 0.7);
        assert!(!ramper.is_ramping());
    }

    #[test]
    fn targets_are_clamped() {
        let mut ramper = ramper_with_steps(1);
        ramper.set_target(3.0);
        assert_eq!(ramper.target(), 1.0);

        ramper.set_target(-7.5);
        assert_eq!(ramper.target(), -1.0);

        ramper.set_target(f32::NAN);
        assert_eq!(ramper.target(), 0.0);
    }

    #[test]
    fn advance_at_rest_is_a_no_op() {
        let mut ramper = ramper_with_steps(3);
        ramper.advance();
        assert_eq!(ramper.current(), 0.0);
    }
}
