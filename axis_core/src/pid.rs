//! Per-tick PID law
//!
//! Discrete PID evaluated once per control tick. Unlike a time-aware PID the
//! integral is a plain running sum of errors and the derivative is the raw
//! tick-to-tick error difference, so the gains are expressed per tick.
//!
//! # Features
//!
//! - Proportional, integral, and derivative terms
//! - Optional integral bound (anti-windup), off by default
//! - Exposed state for diagnostics
//!
//! # Example
//!
//! ```rust
//! use axis_core::pid::TickPid;
//!
//! let mut pid = TickPid::new(5.0, 0.05, 0.0);
//!
//! // One tick with 0.5 rad of error
//! let output = pid.compute(0.5);
//! assert!((output - 2.525).abs() < 1e-12);
//! ```
//!
//! # Tick period coupling
//!
//! `kd` multiplies `error - last_error` without dividing by the elapsed time,
//! and `ki` multiplies a sum without weighting by it. Both are only physically
//! consistent while the loop period stays constant; moving to a different
//! period means rescaling `ki` and `kd`.

/// PID controller stepped once per tick
#[derive(Debug, Clone)]
pub struct TickPid {
    kp: f64, // Proportional gain
    ki: f64, // Integral gain
    kd: f64, // Derivative gain

    integral: f64,
    last_error: f64,

    integral_limit: Option<f64>,
}

impl TickPid {
    /// Create new per-tick PID controller
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            last_error: 0.0,
            integral_limit: None,
        }
    }

    /// Set PID gains. State is kept, so new gains apply from the next tick.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Bound the accumulated integral to `[-limit, limit]`, or `None` for an
    /// unbounded sum. A NaN limit leaves the sum unbounded.
    pub fn set_integral_limit(&mut self, limit: Option<f64>) {
        self.integral_limit = limit.filter(|l| !l.is_nan()).map(f64::abs);
    }

    /// Reset integral and previous error
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    /// Advance one tick with the current error (`target - measured`).
    ///
    /// Returns the unclamped control output.
    pub fn compute(&mut self, error: f64) -> f64 {
        // Proportional term
        let p_term = self.kp * error;

        // Integral term
        self.integral += error;
        if let Some(limit) = self.integral_limit {
            self.integral = self.integral.clamp(-limit, limit);
        }
        let i_term = self.ki * self.integral;

        // Derivative term, raw per-tick difference
        let d_term = self.kd * (error - self.last_error);

        self.last_error = error;

        p_term + i_term + d_term
    }

    /// Get integral value
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Get error from the previous tick
    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Get current gains
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    pub fn integral_limit(&self) -> Option<f64> {
        self.integral_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportional_only() {
        let mut pid = TickPid::new(2.0, 0.0, 0.0);

        let output = pid.compute(20.0);
        assert_relative_eq!(output, 40.0);
    }

    #[test]
    fn test_integral_is_plain_sum() {
        let mut pid = TickPid::new(0.0, 0.5, 0.0);

        let mut output = 0.0;
        for _ in 0..10 {
            output = pid.compute(2.0);
        }

        assert_relative_eq!(pid.integral(), 20.0);
        assert_relative_eq!(output, 10.0);
    }

    #[test]
    fn test_derivative_is_raw_difference() {
        let mut pid = TickPid::new(0.0, 0.0, 1.0);

        // First tick compares against a zero previous error
        assert_relative_eq!(pid.compute(20.0), 20.0);

        // Error shrinking by 10 per tick gives -10 regardless of period
        assert_relative_eq!(pid.compute(10.0), -10.0);
    }

    #[test]
    fn test_unbounded_integral_by_default() {
        let mut pid = TickPid::new(0.0, 1.0, 0.0);

        for _ in 0..1000 {
            pid.compute(100.0);
        }

        assert_relative_eq!(pid.integral(), 100_000.0);
        assert_eq!(pid.integral_limit(), None);
    }

    #[test]
    fn test_integral_limit() {
        let mut pid = TickPid::new(0.0, 1.0, 0.0);
        pid.set_integral_limit(Some(-10.0));

        for _ in 0..100 {
            pid.compute(100.0);
        }
        assert_relative_eq!(pid.integral(), 10.0);

        for _ in 0..100 {
            pid.compute(-100.0);
        }
        assert_relative_eq!(pid.integral(), -10.0);
    }

    #[test]
    fn test_nan_integral_limit_ignored() {
        let mut pid = TickPid::new(0.0, 1.0, 0.0);
        pid.set_integral_limit(Some(f64::NAN));
        assert_eq!(pid.integral_limit(), None);

        for _ in 0..10 {
            pid.compute(2.0);
        }
        assert_relative_eq!(pid.integral(), 20.0);
    }

    #[test]
    fn test_reset() {
        let mut pid = TickPid::new(1.0, 1.0, 1.0);

        for _ in 0..10 {
            pid.compute(3.0);
        }
        assert!(pid.integral() > 0.0);

        pid.reset();

        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
    }

    #[test]
    fn test_change_gains_keeps_state() {
        let mut pid = TickPid::new(1.0, 1.0, 0.0);
        pid.compute(1.0);

        pid.set_gains(2.0, 0.0, 0.0);
        assert_eq!(pid.gains(), (2.0, 0.0, 0.0));

        // Integral survives the gain change
        assert_relative_eq!(pid.integral(), 1.0);
        assert_relative_eq!(pid.compute(1.0), 2.0);
    }

    #[test]
    fn test_negative_error() {
        let mut pid = TickPid::new(2.0, 0.0, 0.0);

        assert!(pid.compute(-20.0) < 0.0);
    }
}
