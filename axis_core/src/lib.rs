//! # Axis Core
//!
//! Closed-loop position control for a single encoder-fed DC axis: a drive
//! wheel, a valve actuator, or any other quadrature-encoded motor.
//!
//! - **Hardware**: the three-operation boundary every actuator implements
//! - **Controller**: per-tick PID position loop with convergence detection,
//!   output clamping, timeouts and cancellation
//! - **Config**: mechanical constants, gains and limits, with presets and TOML
//!   loading
//! - **Frames**: fixed wire shapes of the upstream command link
//!
//! ## Quick Start
//!
//! ```rust
//! use axis_core::{ControllerConfig, PositionController, SimulatedAxis};
//! use std::time::Duration;
//!
//! let mut axis = SimulatedAxis::new(1.0);
//! let config = ControllerConfig::wheel().with_loop_period(Duration::from_millis(1));
//!
//! let mut controller = PositionController::new(config)?;
//! controller.attach(&mut axis)?;
//!
//! let report = controller.move_to(std::f64::consts::FRAC_PI_2)?;
//! println!("settled after {} ticks", report.ticks);
//! # Ok::<(), axis_core::AxisError>(())
//! ```

pub mod cancel;
pub mod config;
pub mod controller;
pub mod error;
pub mod frames;
pub mod hardware;
pub mod pid;
pub mod sim;

// Re-export commonly used types for easy access
pub use cancel::CancelToken;
pub use config::{ControllerConfig, Gains, PositionUnit};
pub use controller::{MoveReport, PositionController};
pub use error::{AxisError, AxisResult};
pub use frames::{CommandFrame, PayloadFrame, SerialFrame};
pub use hardware::HardwareBinding;
pub use sim::SimulatedAxis;
