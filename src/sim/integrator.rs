use crate::dynamics::state::State;
use crate::error::Result;
use crate::symbolic::Bindings;

use super::rates::CompiledSystem;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta integrator
// ---------------------------------------------------------------------------

/// Single RK4 step: advance state by dt.
pub fn rk4_step(
    state: &State,
    system: &CompiledSystem,
    constants: &Bindings,
    dt: f64,
) -> Result<State> {
    let k1 = system.derivatives(state, constants)?;
    let k2 = system.derivatives(&state.apply(&k1, dt * 0.5), constants)?;
    let k3 = system.derivatives(&state.apply(&k2, dt * 0.5), constants)?;
    let k4 = system.derivatives(&state.apply(&k3, dt), constants)?;

    Ok(State {
        time: state.time + dt,
        coords: state.coords
            + (k1.dcoords + 2.0 * k2.dcoords + 2.0 * k3.dcoords + k4.dcoords) * (dt / 6.0),
        rates: state.rates
            + (k1.drates + 2.0 * k2.drates + 2.0 * k3.drates + k4.drates) * (dt / 6.0),
    })
}
