//! Hardware boundary between the controller and one physical axis
//!
//! An implementation wraps whatever drives the actuator (an H-bridge PWM pin,
//! a motor-driver register, a simulator) and whatever counts its encoder.
//! The controller only ever talks to this trait, so one control loop serves
//! wheels, valve actuators, or any other encoder-fed DC motor.
//!
//! # Example
//!
//! ```rust
//! use axis_core::HardwareBinding;
//!
//! struct BenchMotor {
//!     pwm: i32,
//!     count: i64,
//! }
//!
//! impl HardwareBinding for BenchMotor {
//!     fn set_output(&mut self, level: i32) {
//!         self.pwm = level;
//!     }
//!
//!     fn read_encoder(&mut self) -> i64 {
//!         self.count
//!     }
//!
//!     fn reset_encoder(&mut self) {
//!         self.count = 0;
//!     }
//! }
//! ```

/// Capability set for one axis: drive output, read encoder, reset encoder.
///
/// A binding belongs to exactly one controller at a time. The controller
/// borrows it mutably for as long as it is attached, so two controllers can
/// never issue conflicting resets or output commands to the same axis.
pub trait HardwareBinding {
    /// Apply a signed drive level. Sign selects direction, magnitude is the
    /// duty (already clamped by the caller to the configured output range).
    fn set_output(&mut self, level: i32);

    /// Cumulative encoder pulses since the last reset. Negative counts mean
    /// the axis moved in reverse.
    fn read_encoder(&mut self) -> i64;

    /// Zero the cumulative pulse count.
    fn reset_encoder(&mut self);
}

impl<H: HardwareBinding + ?Sized> HardwareBinding for Box<H> {
    fn set_output(&mut self, level: i32) {
        (**self).set_output(level)
    }

    fn read_encoder(&mut self) -> i64 {
        (**self).read_encoder()
    }

    fn reset_encoder(&mut self) {
        (**self).reset_encoder()
    }
}
