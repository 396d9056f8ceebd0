//! Simulated axis for testing and dry runs
//!
//! An idealized linear actuator: every output command moves the shaft by
//! `pulses_per_unit × level` encoder pulses, as if one command were held for
//! exactly one control tick. Useful wherever real hardware is absent.

use crate::hardware::HardwareBinding;

/// Linear actuator model implementing [`HardwareBinding`]
#[derive(Debug, Clone)]
pub struct SimulatedAxis {
    pulses_per_unit: f64,
    deadband: i32,

    travel: f64,
    origin: f64,
    output: i32,
    peak_output: i32,

    commands: u64,
    reads: u64,
    resets: u64,
}

impl SimulatedAxis {
    /// Axis that advances `pulses_per_unit` pulses per unit of output per tick
    pub fn new(pulses_per_unit: f64) -> Self {
        Self {
            pulses_per_unit,
            deadband: 0,
            travel: 0.0,
            origin: 0.0,
            output: 0,
            peak_output: 0,
            commands: 0,
            reads: 0,
            resets: 0,
        }
    }

    /// Axis whose shaft never moves (seized gearbox, unplugged motor)
    pub fn stalled() -> Self {
        Self::new(0.0)
    }

    /// Ignore outputs whose magnitude is below `deadband` (static friction)
    pub fn with_deadband(mut self, deadband: i32) -> Self {
        self.deadband = deadband.abs();
        self
    }

    /// Last commanded output level
    pub fn output(&self) -> i32 {
        self.output
    }

    /// Largest output magnitude ever commanded
    pub fn peak_output(&self) -> i32 {
        self.peak_output
    }

    /// Shaft position in pulses since construction, unaffected by resets
    pub fn absolute_pulses(&self) -> f64 {
        self.travel
    }

    pub fn commands(&self) -> u64 {
        self.commands
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Total hardware operations issued against this axis
    pub fn operations(&self) -> u64 {
        self.commands + self.reads + self.resets
    }
}

impl HardwareBinding for SimulatedAxis {
    fn set_output(&mut self, level: i32) {
        self.commands += 1;
        self.output = level;
        self.peak_output = self.peak_output.max(level.saturating_abs());

        if level.saturating_abs() >= self.deadband {
            self.travel += level as f64 * self.pulses_per_unit;
        }
    }

    fn read_encoder(&mut self) -> i64 {
        self.reads += 1;
        (self.travel - self.origin).trunc() as i64
    }

    fn reset_encoder(&mut self) {
        self.resets += 1;
        self.origin = self.travel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_moves_linearly() {
        let mut axis = SimulatedAxis::new(1.0);

        axis.set_output(10);
        axis.set_output(-3);

        assert_eq!(axis.read_encoder(), 7);
        assert_eq!(axis.output(), -3);
        assert_eq!(axis.peak_output(), 10);
    }

    #[test]
    fn test_reset_keeps_physical_position() {
        let mut axis = SimulatedAxis::new(2.0);
        axis.set_output(5);
        axis.reset_encoder();

        assert_eq!(axis.read_encoder(), 0);
        assert_eq!(axis.absolute_pulses(), 10.0);

        axis.set_output(-1);
        assert_eq!(axis.read_encoder(), -2);
    }

    #[test]
    fn test_fractional_gain_truncates_count() {
        let mut axis = SimulatedAxis::new(0.4);
        axis.set_output(1);
        axis.set_output(1);
        assert_eq!(axis.read_encoder(), 0);

        axis.set_output(1);
        assert_eq!(axis.read_encoder(), 1);
    }

    #[test]
    fn test_stalled_and_deadband() {
        let mut stalled = SimulatedAxis::stalled();
        stalled.set_output(255);
        assert_eq!(stalled.read_encoder(), 0);

        let mut sticky = SimulatedAxis::new(1.0).with_deadband(20);
        sticky.set_output(19);
        assert_eq!(sticky.read_encoder(), 0);
        sticky.set_output(-20);
        assert_eq!(sticky.read_encoder(), -20);
    }

    #[test]
    fn test_operation_counters() {
        let mut axis = SimulatedAxis::new(1.0);
        axis.reset_encoder();
        axis.read_encoder();
        axis.set_output(0);

        assert_eq!((axis.resets(), axis.reads(), axis.commands()), (1, 1, 1));
        assert_eq!(axis.operations(), 3);
    }
}
