use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spaceshot_loop::config::Config;
use spaceshot_loop::dynamics::{Derivation, GravityModel, ModelOptions, TransverseTerm};
use spaceshot_loop::io::{self, DerivationReport, FlightSummary};
use spaceshot_loop::sim::{self, CompiledSystem, EventKind};

#[derive(Parser)]
#[command(name = "spaceshot-loop")]
#[command(about = "Lagrangian equations of motion for a spaceshot rocket")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and print the Lagrangian, equations of motion and first-order system
    Derive {
        #[command(flatten)]
        model: ModelArgs,

        /// Apply sin^2 + cos^2 = 1 to the first-order equations
        #[arg(long)]
        simplify: bool,

        /// Also write the derivation as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Derive, compile and integrate the first-order system
    Simulate {
        /// JSON configuration file (missing fields take defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,

        /// Write the trajectory as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the flight summary as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Transverse rotational energy term
    #[arg(long, value_enum)]
    transverse: Option<TransverseArg>,

    /// Gravity generalized force
    #[arg(long, value_enum)]
    gravity: Option<GravityArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransverseArg {
    Linear,
    Quadratic,
}

#[derive(Clone, Copy, ValueEnum)]
enum GravityArg {
    /// -g*z
    #[value(name = "altitude_proportional")]
    AltitudeProportional,
    /// -m*g
    Uniform,
}

impl ModelArgs {
    fn apply(&self, options: &mut ModelOptions) {
        if let Some(t) = self.transverse {
            options.transverse = match t {
                TransverseArg::Linear => TransverseTerm::Linear,
                TransverseArg::Quadratic => TransverseTerm::Quadratic,
            };
        }
        if let Some(g) = self.gravity {
            options.gravity = match g {
                GravityArg::AltitudeProportional => GravityModel::AltitudeProportional,
                GravityArg::Uniform => GravityModel::Uniform,
            };
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Derive { model, simplify, json } => {
            let mut options = ModelOptions::default();
            model.apply(&mut options);
            run_derive(options, simplify, json)
        }
        Commands::Simulate { config, model, csv, summary } => {
            let mut cfg = match config {
                Some(path) => Config::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => Config::default(),
            };
            model.apply(&mut cfg.model);
            run_simulate(&cfg, csv, summary)
        }
    }
}

fn rule() {
    println!("  ──────────────────────────────────────────────────────────────────");
}

fn run_derive(options: ModelOptions, simplify: bool, json: Option<PathBuf>) -> Result<()> {
    let derivation = Derivation::run(options)?;
    let report = DerivationReport::new(&derivation, simplify);

    println!();
    println!("====================================================================");
    println!("  SPACESHOT LOOP — equations of motion");
    println!("====================================================================");
    println!();
    println!("  Model: {}", io::model_json(&options)?);
    println!();
    println!("  Lagrangian");
    rule();
    println!("  L = {}", report.lagrangian);
    println!();
    println!("  Euler-Lagrange equations (each = 0)");
    rule();
    for eq in &report.second_order {
        println!("  [{:>2}] {:<6} {}", eq.index, eq.label, eq.expr);
    }
    println!();
    println!("  First-order system (each = 0)");
    rule();
    for eq in &report.first_order {
        println!("  [{:>2}] {:<6} {}", eq.index, eq.label, eq.expr);
    }
    println!();

    if let Some(path) = json {
        io::write_json_file(&path, &report)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Derivation written to {}", path.display());
    }
    Ok(())
}

fn run_simulate(cfg: &Config, csv: Option<PathBuf>, summary_path: Option<PathBuf>) -> Result<()> {
    cfg.validate()?;
    let derivation = Derivation::run(cfg.model)?;
    let system = CompiledSystem::compile(&derivation.first_order)?;
    if system.structurally_singular() {
        anyhow::bail!(
            "the {:?} transverse term leaves theta without an acceleration; \
             the first-order system cannot be solved for its rates (try --transverse quadratic)",
            cfg.model.transverse
        );
    }

    let constants = cfg.vehicle.bindings(&derivation.symbols);
    let trajectory = sim::simulate(&system, &constants, cfg.initial.state(), &cfg.sim)?;
    let summary = FlightSummary::from_trajectory(&trajectory)
        .context("simulation produced an empty trajectory")?;
    let events = sim::detect_events(&trajectory, &mut sim::detectors_for(&cfg.sim));

    println!();
    println!("====================================================================");
    println!("  SPACESHOT LOOP — flight simulation");
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    rule();
    println!(
        "  Mass:          {:>8.1} kg    Thrust:       {:>8.0} N",
        cfg.vehicle.mass, cfg.vehicle.thrust
    );
    println!(
        "  I1:            {:>8.3} kg m^2  I3:         {:>8.3} kg m^2",
        cfg.vehicle.i1, cfg.vehicle.i3
    );
    println!("  Model:         {}", io::model_json(&cfg.model)?);
    println!();

    println!("  Flight Events");
    rule();
    for e in &events {
        let name = match &e.kind {
            EventKind::Launch => "LAUNCH".to_string(),
            EventKind::Apogee => "APOGEE".to_string(),
            EventKind::Landing => "LANDING".to_string(),
            EventKind::AltitudeCrossing { altitude, ascending } => {
                format!("{altitude:.0}m {}", if *ascending { "UP" } else { "DOWN" })
            }
        };
        println!(
            "  {:<9} t={:>6.2}s   alt={:>8.1}m   speed={:>7.1}m/s",
            name,
            e.time,
            e.state.altitude(),
            e.state.speed()
        );
    }
    println!();

    println!("  Performance Summary");
    rule();
    println!("  Max altitude:  {:>8.1} m at t={:.2} s", summary.apogee_m, summary.apogee_time);
    println!("  Max speed:     {:>8.1} m/s", summary.max_speed);
    println!("  Max tilt:      {:>8.2} deg", summary.max_tilt_deg);
    println!("  Downrange:     {:>8.1} m", summary.downrange_m);
    println!("  Flight time:   {:>8.2} s", summary.flight_time);
    println!();
    println!("  Simulation: {} steps, dt={} s", trajectory.len(), cfg.sim.dt);
    println!("====================================================================");
    println!();

    if let Some(path) = csv {
        io::write_trajectory_file(&path, &trajectory)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = summary_path {
        io::write_json_file(&path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
