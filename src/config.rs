// ---------------------------------------------------------------------------
// Run configuration: model options, vehicle constants, initial state, stepping
// ---------------------------------------------------------------------------

use std::path::Path;

use nalgebra::Vector6;
use serde::{Deserialize, Serialize};

use crate::dynamics::state::{State, G0};
use crate::dynamics::{ModelOptions, SpaceshotSymbols};
use crate::error::{Error, Result};
use crate::symbolic::Bindings;

/// Numeric values of the model constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Vehicle mass, kg.
    pub mass: f64,
    /// Gravitational acceleration, m/s^2.
    pub gravity: f64,
    /// Transverse moment of inertia, kg m^2.
    pub i1: f64,
    /// Axial moment of inertia, kg m^2.
    pub i3: f64,
    /// Thrust magnitude, N.
    pub thrust: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 30.0,
            gravity: G0,
            i1: 5.0,
            i3: 0.5,
            thrust: 2000.0,
        }
    }
}

impl VehicleParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("mass", self.mass), ("i1", self.i1), ("i3", self.i3)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        for (name, value) in [("gravity", self.gravity), ("thrust", self.thrust)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Bind `m, g, I1, I3, T` for numeric evaluation.
    pub fn bindings(&self, sym: &SpaceshotSymbols) -> Bindings {
        let mut b = Bindings::new();
        b.bind_symbol(&sym.mass, self.mass)
            .bind_symbol(&sym.gravity, self.gravity)
            .bind_symbol(&sym.i1, self.i1)
            .bind_symbol(&sym.i3, self.i3)
            .bind_symbol(&sym.thrust, self.thrust);
        b
    }
}

/// Initial coordinates `(x, y, z, phi, theta, psi)` and their rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub coords: [f64; 6],
    pub rates: [f64; 6],
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            // Small tilt: theta = 0 is the Euler-angle singularity.
            coords: [0.0, 0.0, 0.0, 0.0, 0.05, 0.0],
            rates: [0.0; 6],
        }
    }
}

impl InitialConditions {
    pub fn state(&self) -> State {
        State::new(
            0.0,
            Vector6::from_column_slice(&self.coords),
            Vector6::from_column_slice(&self.rates),
        )
    }
}

/// Integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
    /// Altitudes (m) whose crossings are reported as flight events.
    pub altitude_marks: Vec<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.005,       // 200 Hz
            max_time: 60.0,
            altitude_marks: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(Error::Config(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.max_time.is_finite() && self.max_time >= self.dt) {
            return Err(Error::Config(format!(
                "max_time must be at least dt ({}), got {}",
                self.dt, self.max_time
            )));
        }
        if let Some(bad) = self.altitude_marks.iter().find(|a| !(a.is_finite() && **a > 0.0)) {
            return Err(Error::Config(format!("altitude marks must be positive, got {bad}")));
        }
        Ok(())
    }
}

/// Complete run configuration, loadable from JSON. Missing fields take
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelOptions,
    pub vehicle: VehicleParams,
    pub initial: InitialConditions,
    pub sim: SimConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.vehicle.validate()?;
        self.sim.validate()?;
        if self.initial.coords.iter().chain(&self.initial.rates).any(|v| !v.is_finite()) {
            return Err(Error::Config("initial conditions must be finite".into()));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
