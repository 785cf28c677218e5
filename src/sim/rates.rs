use nalgebra::{DMatrix, DVector, Vector6};
use tracing::debug;

use crate::dynamics::state::{Deriv, State};
use crate::dynamics::FirstOrderSystem;
use crate::error::{Error, Result};
use crate::symbolic::{Atom, Bindings, CompiledExprs, Expr, Symbol};

/// Unknowns of the reduced system: six coordinates and six auxiliaries.
const N: usize = 12;

/// Determinants below this fraction of the Hadamard bound count as singular.
const SINGULAR_RATIO: f64 = 1e-12;

// ---------------------------------------------------------------------------
// First-order system compiled for numeric rate evaluation
// ---------------------------------------------------------------------------

/// The first-order system written as `M(q) * rates + r(q) = 0`.
///
/// `M[i][j]` is the partial derivative of equation `i` with respect to the
/// rate of unknown `j`; `r` is each equation with all rates set to zero.
/// Both are lowered into one compiled graph whose first twelve inputs are the
/// unknowns, followed by the model constants.
#[derive(Debug)]
pub struct CompiledSystem {
    unknowns: Vec<Symbol>,
    singular_rows: Vec<usize>,
    compiled: CompiledExprs,
}

impl CompiledSystem {
    pub fn compile(system: &FirstOrderSystem) -> Result<Self> {
        let unknowns = system.unknowns();
        if unknowns.len() != N || system.equations().len() != N {
            return Err(Error::InvalidMapping(format!(
                "expected {N} unknowns and {N} equations, got {} and {}",
                unknowns.len(),
                system.equations().len()
            )));
        }

        let rate_atoms: Vec<Atom> = unknowns.iter().map(|u| Atom::derivative(u, 1)).collect();

        let mut matrix = Vec::with_capacity(N * N);
        let mut residual = Vec::with_capacity(N);
        let mut singular_rows = Vec::new();
        for (index, eq) in system.equations().iter().enumerate() {
            let row_start = matrix.len();
            for (j, rate) in rate_atoms.iter().enumerate() {
                let coeff = eq.expr.partial(rate);
                if rate_atoms.iter().any(|r| coeff.depends_on(r)) {
                    return Err(Error::NonlinearRates {
                        index,
                        unknown: unknowns[j].name().to_string(),
                    });
                }
                matrix.push(coeff);
            }
            if matrix[row_start..].iter().all(Expr::is_zero) {
                singular_rows.push(index);
            }
            residual.push(
                rate_atoms
                    .iter()
                    .fold(eq.expr.clone(), |e, rate| e.subs(rate, &Expr::zero())),
            );
        }

        let state_atoms: Vec<Atom> = unknowns.iter().map(Atom::of).collect();
        let outputs: Vec<&Expr> = matrix.iter().chain(residual.iter()).collect();
        let compiled = CompiledExprs::compile(&outputs, &state_atoms)?;

        debug!(
            unknowns = unknowns.len(),
            constants = compiled.inputs().len() - N,
            singular_rows = ?singular_rows,
            "compiled rate system"
        );
        Ok(Self { unknowns, singular_rows, compiled })
    }

    pub fn unknowns(&self) -> &[Symbol] {
        &self.unknowns
    }

    /// True if some equation carries no rate at all, which makes the rate
    /// matrix singular everywhere.
    pub fn structurally_singular(&self) -> bool {
        !self.singular_rows.is_empty()
    }

    /// Input slice for the compiled graph: the state's coordinates and
    /// auxiliary velocities, then each constant from `constants`.
    pub fn inputs(&self, state: &State, constants: &Bindings) -> Result<Vec<f64>> {
        let mut inputs = Vec::with_capacity(self.compiled.inputs().len());
        inputs.extend(state.coords.iter().chain(state.rates.iter()).copied());
        for atom in &self.compiled.inputs()[N..] {
            let value = constants
                .get(atom)
                .ok_or_else(|| Error::Unbound(Expr::atom(atom.clone()).to_string()))?;
            inputs.push(value);
        }
        Ok(inputs)
    }

    /// Solve for the rates at `state`.
    pub fn derivatives(&self, state: &State, constants: &Bindings) -> Result<Deriv> {
        let inputs = self.inputs(state, constants)?;
        let mut flat = vec![0.0; N * N + N];
        self.compiled.eval_into(&inputs, &mut flat)?;

        let m = DMatrix::<f64>::from_row_slice(N, N, &flat[..N * N]);
        let r = DVector::<f64>::from_column_slice(&flat[N * N..]);

        let bound: f64 = m.row_iter().map(|row| row.norm()).product();
        let lu = m.lu();
        let det = lu.determinant();
        if !det.is_finite() || bound == 0.0 || det.abs() <= SINGULAR_RATIO * bound {
            return Err(Error::SingularRates { time: state.time });
        }

        let rates = lu
            .solve(&(-r))
            .ok_or(Error::SingularRates { time: state.time })?;
        if rates.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numerical(format!(
                "non-finite rate at t = {:.4} s",
                state.time
            )));
        }

        Ok(Deriv {
            dcoords: Vector6::from_iterator(rates.iter().take(6).copied()),
            drates: Vector6::from_iterator(rates.iter().skip(6).copied()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleParams;
    use crate::dynamics::{Derivation, GravityModel, ModelOptions, TransverseTerm};
    use approx::assert_relative_eq;

    fn tilted_state(vz: f64) -> State {
        State::new(
            0.0,
            Vector6::new(0.0, 0.0, 10.0, 0.0, 0.3, 0.0),
            Vector6::new(0.0, 0.0, vz, 0.0, 0.0, 0.0),
        )
    }

    #[test]
    fn linear_transverse_term_is_singular() {
        let d = Derivation::run(ModelOptions::default()).unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        assert!(sys.structurally_singular());
        let constants = VehicleParams::default().bindings(&d.symbols);
        let err = sys.derivatives(&tilted_state(0.0), &constants).unwrap_err();
        assert!(matches!(err, Error::SingularRates { .. }));
    }

    #[test]
    fn quadratic_translational_accelerations() {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            gravity: GravityModel::Uniform,
        })
        .unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        assert!(!sys.structurally_singular());

        let params = VehicleParams::default();
        let constants = params.bindings(&d.symbols);
        let state = tilted_state(12.0);
        let deriv = sys.derivatives(&state, &constants).unwrap();

        let theta = 0.3_f64;
        assert_relative_eq!(deriv.dcoords[2], 12.0, epsilon = 1e-9);
        assert_relative_eq!(deriv.drates[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            deriv.drates[1],
            params.thrust * theta.sin() / params.mass,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            deriv.drates[2],
            params.thrust * theta.cos() / params.mass - params.gravity,
            epsilon = 1e-9
        );
        // No rotation and no torque: attitude rates stay zero.
        for k in 3..6 {
            assert_relative_eq!(deriv.drates[k], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn gimbal_lock_attitude_is_singular() {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            gravity: GravityModel::Uniform,
        })
        .unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        assert!(!sys.structurally_singular());
        let constants = VehicleParams::default().bindings(&d.symbols);

        // theta = 0 zeroes the phi row's sin(theta)^2 coefficient.
        let level = State::new(0.0, Vector6::new(0.0, 0.0, 10.0, 0.0, 0.0, 0.0), Vector6::zeros());
        let err = sys.derivatives(&level, &constants).unwrap_err();
        assert!(matches!(err, Error::SingularRates { time } if time == 0.0));

        let mut near = level.clone();
        near.coords[4] = 1e-7;
        assert!(matches!(
            sys.derivatives(&near, &constants),
            Err(Error::SingularRates { .. })
        ));

        near.coords[4] = 1e-5;
        assert!(sys.derivatives(&near, &constants).is_ok());
    }

    #[test]
    fn inputs_are_state_then_constants() {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            gravity: GravityModel::Uniform,
        })
        .unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        let params = VehicleParams::default();
        let inputs = sys.inputs(&tilted_state(12.0), &params.bindings(&d.symbols)).unwrap();

        assert_eq!(inputs[2], 10.0);
        assert_eq!(inputs[4], 0.3);
        assert_eq!(inputs[8], 12.0);
        let mut constants = inputs[12..].to_vec();
        constants.sort_by(f64::total_cmp);
        let mut expected = vec![params.mass, params.gravity, params.i1, params.i3, params.thrust];
        expected.sort_by(f64::total_cmp);
        assert_eq!(constants, expected);
    }

    #[test]
    fn missing_constant_is_unbound() {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            ..ModelOptions::default()
        })
        .unwrap();
        let sys = CompiledSystem::compile(&d.first_order).unwrap();
        let err = sys.derivatives(&tilted_state(0.0), &Bindings::new()).unwrap_err();
        assert!(matches!(err, Error::Unbound(_)));
    }
}
