use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::dynamics::state::State;
use crate::dynamics::{Derivation, EquationSet, ModelOptions};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Derivation report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EquationEntry {
    pub index: usize,
    pub label: String,
    pub expr: String,
}

/// Printable record of one derivation.
#[derive(Debug, Clone, Serialize)]
pub struct DerivationReport {
    pub model: ModelOptions,
    pub lagrangian: String,
    pub second_order: Vec<EquationEntry>,
    pub first_order: Vec<EquationEntry>,
    pub unknowns: Vec<String>,
}

fn entries(set: &EquationSet) -> Vec<EquationEntry> {
    set.iter()
        .enumerate()
        .map(|(index, eq)| EquationEntry {
            index,
            label: eq.label.clone(),
            expr: eq.expr.to_string(),
        })
        .collect()
}

impl DerivationReport {
    /// Report `derivation`, optionally with trig-simplified first-order equations.
    pub fn new(derivation: &Derivation, simplify: bool) -> Self {
        let first_order = if simplify {
            derivation.simplified()
        } else {
            derivation.first_order.equations().clone()
        };
        Self {
            model: derivation.options,
            lagrangian: derivation.lagrangian.to_string(),
            second_order: entries(&derivation.second_order),
            first_order: entries(&first_order),
            unknowns: derivation
                .first_order
                .unknowns()
                .iter()
                .map(|s| s.name().to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Flight summary
// ---------------------------------------------------------------------------

/// Summary statistics computed from a trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub apogee_m: f64,
    pub apogee_time: f64,
    pub max_speed: f64,
    pub max_tilt_deg: f64,
    pub downrange_m: f64,
    pub flight_time: f64,
    pub final_speed: f64,
}

impl FlightSummary {
    /// Compute summary from trajectory data. `None` for an empty trajectory.
    pub fn from_trajectory(trajectory: &[State]) -> Option<Self> {
        let last = trajectory.last()?;
        let apogee_state = trajectory
            .iter()
            .max_by(|a, b| a.altitude().total_cmp(&b.altitude()))?;

        let max_speed = trajectory.iter().map(State::speed).fold(0.0_f64, f64::max);
        let max_tilt = trajectory
            .iter()
            .map(|s| s.tilt().abs())
            .fold(0.0_f64, f64::max);

        Some(FlightSummary {
            apogee_m: apogee_state.altitude(),
            apogee_time: apogee_state.time,
            max_speed,
            max_tilt_deg: max_tilt.to_degrees(),
            downrange_m: last.coords.fixed_rows::<2>(0).norm(),
            flight_time: last.time,
            final_speed: last.speed(),
        })
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write any serializable record as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_json_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_json(&mut file, value)
}

/// Convenience: the model options alone, for echoing a run's setup.
pub fn model_json(options: &ModelOptions) -> Result<String> {
    Ok(serde_json::to_string(options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector6;

    fn simple_trajectory() -> Vec<State> {
        vec![
            State::new(0.0, Vector6::zeros(), Vector6::new(0.0, 0.0, 100.0, 0.0, 0.0, 0.0)),
            State::new(
                10.0,
                Vector6::new(30.0, 40.0, 5000.0, 0.0, 0.1, 0.0),
                Vector6::zeros(),
            ),
            State::new(
                20.0,
                Vector6::new(60.0, 80.0, 0.0, 0.0, 0.2, 0.0),
                Vector6::new(0.0, 0.0, -50.0, 0.0, 0.0, 0.0),
            ),
        ]
    }

    #[test]
    fn summary_computes_apogee() {
        let s = FlightSummary::from_trajectory(&simple_trajectory()).unwrap();
        assert!((s.apogee_m - 5000.0).abs() < 0.1);
        assert!((s.apogee_time - 10.0).abs() < 0.1);
        assert!((s.downrange_m - 100.0).abs() < 1e-9);
        assert!((s.max_speed - 100.0).abs() < 1e-9);
        assert!((s.max_tilt_deg - 0.2_f64.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn empty_trajectory_has_no_summary() {
        assert!(FlightSummary::from_trajectory(&[]).is_none());
    }

    #[test]
    fn report_json_is_valid() {
        let d = Derivation::run(ModelOptions::default()).unwrap();
        let report = DerivationReport::new(&d, false);

        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["model"]["transverse"], "linear");
        assert_eq!(value["model"]["gravity"], "altitude_proportional");
        assert_eq!(value["second_order"].as_array().unwrap().len(), 6);
        assert_eq!(value["first_order"].as_array().unwrap().len(), 12);
        assert_eq!(value["first_order"][11]["label"], "f");
        assert_eq!(value["unknowns"][6], "a");
    }

    #[test]
    fn model_options_serialize_to_snake_case() {
        let text = model_json(&ModelOptions::default()).unwrap();
        assert_eq!(text, r#"{"transverse":"linear","gravity":"altitude_proportional"}"#);
    }
}
