/// Axis Simulator
///
/// Binds the position controller to a simulated DC motor and runs a single
/// move, printing the resulting report. Useful for tuning gains against a
/// configuration before it goes onto a real board.
use anyhow::{bail, Context, Result};
use axis_core::{
    AxisError, CancelToken, ControllerConfig, PositionController, PositionUnit, SimulatedAxis,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "axis_sim")]
#[command(about = "Run the axis position controller against a simulated motor", long_about = None)]
struct Args {
    /// Target position, in the configured unit
    #[arg(short, long, allow_hyphen_values = true)]
    target: f64,

    /// TOML configuration file
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in configuration: wheel or valve_actuator
    #[arg(short, long, default_value = "wheel")]
    preset: String,

    /// Override the position unit of the configuration
    #[arg(short, long, value_enum)]
    unit: Option<UnitArg>,

    /// Encoder pulses the simulated motor travels per unit of output per tick
    #[arg(long, default_value_t = 1.0)]
    pulses_per_unit: f64,

    /// Smallest output magnitude that moves the simulated motor
    #[arg(long, default_value_t = 0)]
    deadband: i32,

    /// Enable verbose logging (per-tick trace)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnitArg {
    Radians,
    Revolutions,
}

impl From<UnitArg> for PositionUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Radians => PositionUnit::Radians,
            UnitArg::Revolutions => PositionUnit::Revolutions,
        }
    }
}

fn load_config(args: &Args) -> Result<ControllerConfig> {
    let config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match ControllerConfig::preset(&args.preset) {
            Some(config) => config,
            None => bail!(
                "Unknown preset '{}' (expected wheel or valve_actuator)",
                args.preset
            ),
        },
    };

    Ok(match args.unit {
        Some(unit) => config.with_unit(unit.into()),
        None => config,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        "axis_sim=debug,axis_core=trace"
    } else {
        "axis_sim=info,axis_core=info"
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&args)?;
    if !args.pulses_per_unit.is_finite() || args.pulses_per_unit < 0.0 {
        bail!("--pulses-per-unit must be a finite, non-negative number");
    }

    let mut axis = SimulatedAxis::new(args.pulses_per_unit).with_deadband(args.deadband);
    let mut controller =
        PositionController::new(config).context("Rejected controller configuration")?;
    controller
        .attach(&mut axis)
        .context("Failed to bind simulated axis")?;

    // Ctrl+C stops the move at the next tick and leaves the motor at zero
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nCtrl+C received, stopping axis...");
        on_signal.cancel();
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    info!(
        "Moving to {} {:?} ({:.6} per pulse, threshold {:.6})",
        args.target,
        controller.config().unit,
        controller.angle_per_pulse(),
        controller.threshold()
    );

    let outcome = controller.move_to_with_cancel(args.target, &cancel);
    drop(controller);

    match outcome {
        Ok(report) => {
            println!("Converged to {:.6}", report.final_position);
            println!("  ticks:        {}", report.ticks);
            println!("  elapsed:      {:?}", report.elapsed);
            println!("  pulses:       {}", report.final_pulses);
            println!("  final error:  {:.6}", report.final_error);
            println!("  peak output:  {}", report.peak_output);
            println!(
                "  saturated:    {} ticks ({:.1}%)",
                report.saturated_ticks,
                report.saturation_ratio() * 100.0
            );
            Ok(())
        }
        Err(e) if e.is_aborted_move() => {
            error!("{}", e);
            if let AxisError::Timeout { last_error, .. } = &e {
                println!("Gave up {:.6} short of the target", last_error);
            }
            println!(
                "Axis stopped after {} pulses of travel, output {}",
                axis.absolute_pulses(),
                axis.output()
            );
            Err(e.into())
        }
        Err(e) => Err(e).context("Move rejected"),
    }
}
