//! Position controller for one encoder-fed axis
//!
//! Drives a bound [`HardwareBinding`] to a target position with a per-tick PID
//! loop and blocks until the axis settles inside the convergence threshold.
//!
//! # Loop
//!
//! Each move resets the encoder, clears the PID state and waits the settle
//! time. Every tick then reads the encoder, converts pulses to position, and
//! either stops (error below threshold) or commands
//! `kp·e + ki·Σe + kd·Δe`, truncated toward zero and clamped to the output
//! range. Between ticks the loop sleeps on a [`CancelToken`], which is the only
//! place the move yields and where timeouts and cancellation are observed.
//!
//! Every exit path after the first hardware operation commands zero output,
//! so a failed move never leaves the actuator driving.
//!
//! # Example
//!
//! ```rust
//! use axis_core::{ControllerConfig, PositionController, SimulatedAxis};
//! use std::time::Duration;
//!
//! let config = ControllerConfig::wheel()
//!     .with_loop_period(Duration::ZERO)
//!     .with_settle(Duration::ZERO);
//! let mut axis = SimulatedAxis::new(1.0);
//!
//! let mut controller = PositionController::new(config).unwrap();
//! controller.attach(&mut axis).unwrap();
//!
//! let report = controller.move_to(0.5).unwrap();
//! assert!(report.final_error.abs() < std::f64::consts::PI / 180.0);
//! ```

use crate::cancel::CancelToken;
use crate::config::{check_integral_limit, ControllerConfig, Gains};
use crate::error::{AxisError, AxisResult};
use crate::hardware::HardwareBinding;
use crate::pid::TickPid;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Consecutive clamped ticks before saturation is reported as a warning
const SATURATION_WARN_TICKS: u64 = 100;

/// Outcome of a move that reached its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    pub target: f64,
    /// Ticks that commanded a drive output (the final stop is not counted)
    pub ticks: u64,
    pub final_pulses: i64,
    pub final_position: f64,
    pub final_error: f64,
    /// Largest output magnitude commanded during the move
    pub peak_output: i32,
    /// Ticks whose output sat on the clamp bound
    pub saturated_ticks: u64,
    pub elapsed: Duration,
}

impl MoveReport {
    /// Fraction of ticks spent saturated, 0.0 for a move with no ticks
    pub fn saturation_ratio(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.saturated_ticks as f64 / self.ticks as f64
        }
    }
}

/// Closed-loop position controller borrowing one hardware binding
pub struct PositionController<'a, H: HardwareBinding + ?Sized> {
    config: ControllerConfig,
    angle_per_pulse: f64,
    threshold: f64,
    pid: TickPid,
    binding: Option<&'a mut H>,
    saturated: bool,
}

impl<'a, H: HardwareBinding + ?Sized> PositionController<'a, H> {
    /// Create an unbound controller from a validated configuration
    pub fn new(config: ControllerConfig) -> AxisResult<Self> {
        config.validate()?;

        let mut pid = TickPid::new(config.gains.kp, config.gains.ki, config.gains.kd);
        pid.set_integral_limit(config.integral_limit);

        Ok(Self {
            angle_per_pulse: config.angle_per_pulse(),
            threshold: config.threshold(),
            config,
            pid,
            binding: None,
            saturated: false,
        })
    }

    /// Attach the hardware this controller drives. A controller binds once;
    /// call [`detach`](Self::detach) before binding different hardware.
    pub fn attach(&mut self, hardware: &'a mut H) -> AxisResult<()> {
        if self.binding.is_some() {
            return Err(AxisError::AlreadyBound);
        }
        self.binding = Some(hardware);
        Ok(())
    }

    /// Release the bound hardware, leaving the controller unbound
    pub fn detach(&mut self) -> Option<&'a mut H> {
        self.binding.take()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Read-only view of the bound hardware
    pub fn binding(&self) -> Option<&H> {
        self.binding.as_deref()
    }

    /// Replace the PID gains; applies from the next tick evaluated.
    /// Non-finite gains are refused and the previous gains kept.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) -> AxisResult<()> {
        let gains = Gains::new(kp, ki, kd);
        gains.check()?;

        self.config.gains = gains;
        self.pid.set_gains(kp, ki, kd);
        Ok(())
    }

    pub fn gains(&self) -> (f64, f64, f64) {
        self.pid.gains()
    }

    /// Bound the accumulated integral, or `None` to leave it unbounded.
    /// A negative or NaN limit is refused.
    pub fn set_integral_limit(&mut self, limit: Option<f64>) -> AxisResult<()> {
        check_integral_limit(limit)?;

        self.config.integral_limit = limit;
        self.pid.set_integral_limit(limit);
        Ok(())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn angle_per_pulse(&self) -> f64 {
        self.angle_per_pulse
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn pulses_to_position(&self, pulses: i64) -> f64 {
        pulses as f64 * self.angle_per_pulse
    }

    /// Nearest whole pulse count for a position
    pub fn position_to_pulses(&self, position: f64) -> i64 {
        (position / self.angle_per_pulse).round() as i64
    }

    /// True if the last commanded tick of the last move hit the output clamp
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Drive the axis to `target` and block until it converges.
    pub fn move_to(&mut self, target: f64) -> AxisResult<MoveReport> {
        self.move_to_with_cancel(target, &CancelToken::new())
    }

    /// Like [`move_to`](Self::move_to), aborting with
    /// [`AxisError::Cancelled`] once `cancel` fires.
    pub fn move_to_with_cancel(
        &mut self,
        target: f64,
        cancel: &CancelToken,
    ) -> AxisResult<MoveReport> {
        let hardware = match self.binding.as_deref_mut() {
            Some(hardware) => hardware,
            None => {
                debug!(setpoint = target, "move refused, no hardware bound");
                return Err(AxisError::NotBound);
            }
        };
        if !target.is_finite() {
            return Err(AxisError::InvalidTarget(target));
        }

        let clamp = self.config.output_clamp;
        let period = self.config.loop_period();
        let timeout = self.config.timeout();
        let max_ticks = self.config.max_ticks;
        let started = Instant::now();

        hardware.reset_encoder();
        self.pid.reset();
        self.saturated = false;

        debug!(
            setpoint = target,
            period_ms = self.config.loop_period_ms,
            "move started"
        );

        if cancel.sleep(self.config.settle()) {
            hardware.set_output(0);
            warn!(setpoint = target, "move cancelled before first tick");
            return Err(AxisError::Cancelled { ticks: 0 });
        }

        let mut ticks: u64 = 0;
        let mut peak_output: i32 = 0;
        let mut saturated_ticks: u64 = 0;
        let mut saturated_run: u64 = 0;

        loop {
            let pulses = hardware.read_encoder();
            let position = pulses as f64 * self.angle_per_pulse;
            let error = target - position;

            if error.abs() < self.threshold {
                hardware.set_output(0);

                let report = MoveReport {
                    target,
                    ticks,
                    final_pulses: pulses,
                    final_position: position,
                    final_error: error,
                    peak_output,
                    saturated_ticks,
                    elapsed: started.elapsed(),
                };
                debug!(
                    setpoint = target,
                    ticks,
                    position,
                    saturated_ticks,
                    "move converged"
                );
                return Ok(report);
            }

            let elapsed = started.elapsed();
            let out_of_ticks = max_ticks.is_some_and(|limit| ticks >= limit);
            let out_of_time = timeout.is_some_and(|limit| elapsed >= limit);
            if out_of_ticks || out_of_time {
                hardware.set_output(0);
                warn!(
                    setpoint = target,
                    ticks,
                    position,
                    error,
                    "axis did not converge, output stopped"
                );
                return Err(AxisError::Timeout {
                    ticks,
                    elapsed,
                    last_error: error,
                });
            }

            // `as` truncates toward zero and saturates non-finite values
            let level = (self.pid.compute(error) as i32).clamp(-clamp, clamp);
            let clamped = level.abs() == clamp;

            hardware.set_output(level);
            ticks += 1;
            peak_output = peak_output.max(level.abs());
            self.saturated = clamped;

            if clamped {
                saturated_ticks += 1;
                saturated_run += 1;
                if saturated_run == SATURATION_WARN_TICKS {
                    warn!(
                        setpoint = target,
                        ticks = saturated_run,
                        "output held at clamp, gains or mechanics may be mismatched"
                    );
                }
            } else {
                saturated_run = 0;
            }

            trace!(tick = ticks, pulses, error, level, "control tick");

            if cancel.sleep(period) {
                hardware.set_output(0);
                warn!(setpoint = target, ticks, "move cancelled");
                return Err(AxisError::Cancelled { ticks });
            }
        }
    }
}
