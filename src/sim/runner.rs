use tracing::{info, warn};

use crate::config::SimConfig;
use crate::dynamics::state::State;
use crate::error::{Error, Result};
use crate::symbolic::Bindings;

use super::integrator::rk4_step;
use super::rates::CompiledSystem;

/// Altitude above which the vehicle counts as launched.
const LAUNCH_ALTITUDE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Full simulation loop
// ---------------------------------------------------------------------------

/// Integrate from `initial` until ground impact (or `max_time`).
/// Returns the full trajectory as a Vec of state snapshots.
pub fn simulate(
    system: &CompiledSystem,
    constants: &Bindings,
    initial: State,
    config: &SimConfig,
) -> Result<Vec<State>> {
    config.validate()?;
    if system.structurally_singular() {
        return Err(Error::SingularRates { time: initial.time });
    }

    let capacity = (config.max_time / config.dt) as usize + 1;
    let mut trajectory = Vec::with_capacity(capacity.min(200_000));

    let mut state = initial;
    let end_time = state.time + config.max_time;
    trajectory.push(state.clone());

    info!(dt = config.dt, max_time = config.max_time, "starting integration");

    let mut launched = false;

    while state.time < end_time {
        state = rk4_step(&state, system, constants, config.dt)?;

        if !state.is_finite() {
            warn!(time = state.time, "state diverged");
            return Err(Error::Numerical(format!(
                "non-finite state at t = {:.4} s",
                state.time
            )));
        }

        if state.altitude() > LAUNCH_ALTITUDE {
            launched = true;
        }

        // Ground impact after launch
        if launched && state.altitude() <= 0.0 {
            state.coords[2] = 0.0;
            trajectory.push(state);
            break;
        }

        trajectory.push(state.clone());
    }

    if let Some(last) = trajectory.last() {
        info!(steps = trajectory.len(), final_time = last.time, "integration finished");
    }
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitialConditions, VehicleParams};
    use crate::dynamics::{Derivation, GravityModel, ModelOptions, TransverseTerm};
    use approx::assert_relative_eq;

    fn ballistic_setup() -> (CompiledSystem, Bindings, VehicleParams) {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            gravity: GravityModel::Uniform,
        })
        .unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        let params = VehicleParams { thrust: 0.0, ..VehicleParams::default() };
        let constants = params.bindings(&d.symbols);
        (sys, constants, params)
    }

    #[test]
    fn ballistic_arc_lands() {
        let (sys, constants, params) = ballistic_setup();
        let mut initial = InitialConditions::default();
        initial.rates[2] = 30.0;
        let config = SimConfig { dt: 0.01, max_time: 20.0, ..SimConfig::default() };
        let traj = simulate(&sys, &constants, initial.state(), &config).unwrap();

        let last = traj.last().unwrap();
        assert!(last.altitude() <= 1e-9, "should end on the ground");
        let flight_time = 2.0 * 30.0 / params.gravity;
        assert!((last.time - flight_time).abs() < 0.02, "landed at {}", last.time);

        let apogee = traj.iter().map(|s| s.altitude()).fold(0.0_f64, f64::max);
        assert_relative_eq!(apogee, 30.0 * 30.0 / (2.0 * params.gravity), max_relative = 1e-3);
    }

    #[test]
    fn stops_at_max_time() {
        let (sys, constants, _) = ballistic_setup();
        let mut initial = InitialConditions::default();
        initial.rates[2] = 100.0;
        let config = SimConfig { dt: 0.125, max_time: 1.0, ..SimConfig::default() };
        let traj = simulate(&sys, &constants, initial.state(), &config).unwrap();
        assert_eq!(traj.len(), 9);
        assert!(traj.last().unwrap().altitude() > 0.0);
    }

    #[test]
    fn singular_system_refused_up_front() {
        let d = Derivation::run(ModelOptions::default()).unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        let constants = VehicleParams::default().bindings(&d.symbols);
        let result = simulate(
            &sys,
            &constants,
            InitialConditions::default().state(),
            &SimConfig::default(),
        );
        assert!(matches!(result, Err(Error::SingularRates { .. })));
    }
}
