//! Controller configuration
//!
//! Mechanical constants, gains, loop timing and limits for one axis. Values
//! can be built in code, taken from a named preset, or loaded from TOML:
//!
//! ```toml
//! pulses_per_revolution = 4096.0
//! gear_ratio = 1.0
//! loop_period_ms = 10
//! timeout_ms = 5000
//!
//! [gains]
//! kp = 5.0
//! ki = 0.05
//! kd = 0.0
//! ```
//!
//! Missing fields fall back to [`ControllerConfig::default`].

use crate::error::{AxisError, AxisResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Control tick used across the robot (ms)
pub const DEFAULT_LOOP_PERIOD_MS: u64 = 10;

/// Symmetric bound on the commanded drive level (8-bit PWM)
pub const DEFAULT_OUTPUT_CLAMP: i32 = 255;

/// Wheel encoder resolution: 2048 lines, counted on both edges of channel A
pub const WHEEL_ENCODER_RANGE: f64 = 2048.0 * 2.0;

/// Valve actuator motor encoder: pulses per motor revolution
pub const VALVE_ACTUATOR_PPR: f64 = 12.0;
/// Valve actuator gearbox reduction
pub const VALVE_ACTUATOR_GEAR_RATIO: f64 = 50.0;
/// Valve actuator quadrature multiplication (x4 decoding)
pub const VALVE_ACTUATOR_ENC_MULTIPLIER: f64 = 4.0;

/// Unit of the positions passed to and reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PositionUnit {
    #[default]
    Radians,
    Revolutions,
}

impl PositionUnit {
    /// Size of one output-shaft revolution in this unit
    pub fn full_turn(self) -> f64 {
        match self {
            PositionUnit::Radians => std::f64::consts::TAU,
            PositionUnit::Revolutions => 1.0,
        }
    }

    /// One degree expressed in this unit
    pub fn one_degree(self) -> f64 {
        self.full_turn() / 360.0
    }
}

/// PID gains, expressed per control tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Check that every gain is a finite number
    pub fn is_valid(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }

    pub(crate) fn check(&self) -> AxisResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AxisError::InvalidConfig(format!(
                "gains must be finite, got {:?}",
                self
            )))
        }
    }
}

pub(crate) fn check_integral_limit(limit: Option<f64>) -> AxisResult<()> {
    match limit {
        Some(limit) if limit.is_nan() || limit < 0.0 => Err(AxisError::InvalidConfig(format!(
            "integral_limit must be non-negative, got {}",
            limit
        ))),
        _ => Ok(()),
    }
}

/// Whole milliseconds, rounding any sub-millisecond remainder up
fn ceil_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

impl Default for Gains {
    fn default() -> Self {
        Self::new(5.0, 0.05, 0.0)
    }
}

/// Configuration for one position controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Encoder pulses per motor revolution
    pub pulses_per_revolution: f64,
    /// Edge multiplication applied by the decoder (1, 2 or 4)
    pub encoder_multiplication: f64,
    /// Motor revolutions per output-shaft revolution
    pub gear_ratio: f64,
    pub unit: PositionUnit,
    /// Control tick period in milliseconds
    pub loop_period_ms: u64,
    /// Wait after the encoder reset before the first sample, in milliseconds
    pub settle_ms: u64,
    /// Convergence threshold in `unit`; one degree when unset
    pub convergence_threshold: Option<f64>,
    pub output_clamp: i32,
    /// Symmetric bound on the accumulated integral; unbounded when unset
    pub integral_limit: Option<f64>,
    /// Wall-clock bound on a single move; unbounded when unset
    pub timeout_ms: Option<u64>,
    /// Tick-count bound on a single move; unbounded when unset
    pub max_ticks: Option<u64>,
    pub gains: Gains,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pulses_per_revolution: WHEEL_ENCODER_RANGE,
            encoder_multiplication: 1.0,
            gear_ratio: 1.0,
            unit: PositionUnit::Radians,
            loop_period_ms: DEFAULT_LOOP_PERIOD_MS,
            settle_ms: DEFAULT_LOOP_PERIOD_MS,
            convergence_threshold: None,
            output_clamp: DEFAULT_OUTPUT_CLAMP,
            integral_limit: None,
            timeout_ms: Some(30_000),
            max_ticks: None,
            gains: Gains::default(),
        }
    }
}

impl ControllerConfig {
    /// Configuration from the three mechanical constants, defaults elsewhere.
    ///
    /// Argument order is pulses per motor revolution, gear ratio, then
    /// encoder multiplication: `ControllerConfig::new(12.0, 50.0, 4.0)` is the
    /// valve actuator.
    pub fn new(pulses_per_revolution: f64, gear_ratio: f64, encoder_multiplication: f64) -> Self {
        Self {
            pulses_per_revolution,
            gear_ratio,
            encoder_multiplication,
            ..Self::default()
        }
    }

    /// Drive wheel: direct drive, 2048-line encoder counted at 2x
    pub fn wheel() -> Self {
        Self::new(WHEEL_ENCODER_RANGE, 1.0, 1.0)
    }

    /// Valve actuator: 12 PPR motor, 50:1 gearbox, x4 decoding
    pub fn valve_actuator() -> Self {
        Self::new(
            VALVE_ACTUATOR_PPR,
            VALVE_ACTUATOR_GEAR_RATIO,
            VALVE_ACTUATOR_ENC_MULTIPLIER,
        )
    }

    /// Look up a preset by name (`wheel` or `valve_actuator`)
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "wheel" => Some(Self::wheel()),
            "valve_actuator" | "valve" => Some(Self::valve_actuator()),
            _ => None,
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> AxisResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> AxisResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.gains = Gains::new(kp, ki, kd);
        self
    }

    pub fn with_unit(mut self, unit: PositionUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Periods are stored in milliseconds; a fraction of a millisecond rounds
    /// up so a non-zero period never turns into a busy loop.
    pub fn with_loop_period(mut self, period: Duration) -> Self {
        self.loop_period_ms = ceil_millis(period);
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle_ms = ceil_millis(settle);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = Some(threshold);
        self
    }

    pub fn with_output_clamp(mut self, clamp: i32) -> Self {
        self.output_clamp = clamp;
        self
    }

    pub fn with_integral_limit(mut self, limit: Option<f64>) -> Self {
        self.integral_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(ceil_millis);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Physical units per encoder pulse
    pub fn angle_per_pulse(&self) -> f64 {
        self.unit.full_turn()
            / (self.pulses_per_revolution * self.encoder_multiplication * self.gear_ratio)
    }

    /// Effective convergence threshold in `unit`
    pub fn threshold(&self) -> f64 {
        self.convergence_threshold
            .unwrap_or_else(|| self.unit.one_degree())
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(self.loop_period_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject constants that would make the conversion or loop meaningless
    pub fn validate(&self) -> AxisResult<()> {
        let mechanical = [
            ("pulses_per_revolution", self.pulses_per_revolution),
            ("encoder_multiplication", self.encoder_multiplication),
            ("gear_ratio", self.gear_ratio),
        ];
        for (name, value) in mechanical {
            if !value.is_finite() || value <= 0.0 {
                return Err(AxisError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        self.gains.check()?;

        let threshold = self.threshold();
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AxisError::InvalidConfig(format!(
                "convergence_threshold must be positive, got {}",
                threshold
            )));
        }

        if self.output_clamp <= 0 {
            return Err(AxisError::InvalidConfig(format!(
                "output_clamp must be positive, got {}",
                self.output_clamp
            )));
        }

        check_integral_limit(self.integral_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.gains, Gains::new(5.0, 0.05, 0.0));
        assert_eq!(config.loop_period(), Duration::from_millis(10));
        assert_eq!(config.output_clamp, 255);
        assert_eq!(config.integral_limit, None);
        assert_relative_eq!(config.threshold(), PI / 180.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wheel_angle_per_pulse() {
        let config = ControllerConfig::wheel();
        assert_relative_eq!(config.angle_per_pulse(), 2.0 * PI / 4096.0);
        assert_relative_eq!(4096.0 * config.angle_per_pulse(), 2.0 * PI);
    }

    #[test]
    fn test_valve_actuator_angle_per_pulse() {
        let config = ControllerConfig::valve_actuator();
        // 12 * 4 * 50 = 2400 pulses per output revolution
        assert_relative_eq!(config.angle_per_pulse(), 2.0 * PI / 2400.0);
    }

    #[test]
    fn test_revolution_unit() {
        let config = ControllerConfig::wheel().with_unit(PositionUnit::Revolutions);
        assert_relative_eq!(config.angle_per_pulse(), 1.0 / 4096.0);
        assert_relative_eq!(config.threshold(), 1.0 / 360.0);
    }

    #[test]
    fn test_presets_by_name() {
        assert_eq!(ControllerConfig::preset("wheel"), Some(ControllerConfig::wheel()));
        assert_eq!(
            ControllerConfig::preset("valve"),
            Some(ControllerConfig::valve_actuator())
        );
        assert!(ControllerConfig::preset("arm").is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ControllerConfig::from_toml_str(
            r#"
            pulses_per_revolution = 12.0
            gear_ratio = 50.0
            encoder_multiplication = 4.0
            unit = "revolutions"
            max_ticks = 500

            [gains]
            kp = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.unit, PositionUnit::Revolutions);
        assert_eq!(config.gains, Gains::new(40.0, 0.05, 0.0));
        assert_eq!(config.max_ticks, Some(500));
        assert_eq!(config.loop_period_ms, 10);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ControllerConfig::valve_actuator()
            .with_integral_limit(Some(50.0))
            .with_threshold(0.01);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ControllerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let bad = [
            ControllerConfig::new(0.0, 1.0, 1.0),
            ControllerConfig::new(4096.0, -2.0, 1.0),
            ControllerConfig::new(4096.0, 1.0, f64::NAN),
            ControllerConfig::default().with_output_clamp(0),
            ControllerConfig::default().with_threshold(0.0),
            ControllerConfig::default().with_gains(f64::INFINITY, 0.0, 0.0),
            ControllerConfig::default().with_integral_limit(Some(-1.0)),
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(AxisError::InvalidConfig(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_new_argument_order() {
        let config = ControllerConfig::new(12.0, 50.0, 4.0);
        assert_eq!(config.pulses_per_revolution, 12.0);
        assert_eq!(config.gear_ratio, 50.0);
        assert_eq!(config.encoder_multiplication, 4.0);
        assert_eq!(config, ControllerConfig::valve_actuator());
    }

    #[test]
    fn test_sub_millisecond_durations_round_up() {
        let config = ControllerConfig::default()
            .with_loop_period(Duration::from_micros(500))
            .with_settle(Duration::from_micros(1_500))
            .with_timeout(Some(Duration::from_nanos(1)));

        assert_eq!(config.loop_period(), Duration::from_millis(1));
        assert_eq!(config.settle(), Duration::from_millis(2));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1)));

        let exact = ControllerConfig::default()
            .with_loop_period(Duration::ZERO)
            .with_settle(Duration::from_millis(7));
        assert_eq!(exact.loop_period(), Duration::ZERO);
        assert_eq!(exact.settle(), Duration::from_millis(7));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = ControllerConfig::from_toml_str("loop_period_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, AxisError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ControllerConfig::load("/nonexistent/axis.toml").unwrap_err();
        assert!(matches!(err, AxisError::ConfigIo(_)));
    }
}
