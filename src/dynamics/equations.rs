use serde::{Deserialize, Serialize};
use tracing::debug;

use super::symbols::{Coordinate, SpaceshotSymbols};
use crate::symbolic::Expr;

// ---------------------------------------------------------------------------
// Equation containers
// ---------------------------------------------------------------------------

/// An expression implicitly set equal to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub label: String,
    pub expr: Expr,
}

/// Ordered list of equations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquationSet {
    equations: Vec<Equation>,
}

impl EquationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, expr: Expr) {
        self.equations.push(Equation { label: label.into(), expr });
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Equation> {
        self.equations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equation> {
        self.equations.iter()
    }

    pub fn exprs(&self) -> Vec<Expr> {
        self.equations.iter().map(|e| e.expr.clone()).collect()
    }

    /// Apply `f` to every expression, keeping labels.
    pub fn map(&self, f: impl Fn(&Expr) -> Expr) -> EquationSet {
        EquationSet {
            equations: self
                .equations
                .iter()
                .map(|e| Equation { label: e.label.clone(), expr: f(&e.expr) })
                .collect(),
        }
    }
}

impl std::ops::Index<usize> for EquationSet {
    type Output = Expr;
    fn index(&self, index: usize) -> &Expr {
        &self.equations[index].expr
    }
}

// ---------------------------------------------------------------------------
// Generalized forces
// ---------------------------------------------------------------------------

/// How gravity enters the z generalized force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityModel {
    /// `-g*z` (default).
    #[default]
    AltitudeProportional,
    /// `-m*g`, constant weight.
    Uniform,
}

/// Generalized forces conjugate to `(x, y, z, phi, theta, psi)`.
///
/// Thrust acts along the body axis, so its inertial components follow the
/// Euler angles; no generalized torques are modelled.
pub fn generalized_forces(sym: &SpaceshotSymbols, gravity: GravityModel) -> [Expr; 6] {
    let t = Expr::symbol(&sym.thrust);
    let g = Expr::symbol(&sym.gravity);
    let phi = sym.position(Coordinate::Phi);
    let theta = sym.position(Coordinate::Theta);

    let sin_theta = Expr::sin(theta.clone());
    let f_x = &t * Expr::sin(phi.clone()) * &sin_theta;
    let f_y = &t * Expr::cos(phi) * &sin_theta;
    let weight = match gravity {
        GravityModel::AltitudeProportional => -(&g * sym.position(Coordinate::Z)),
        GravityModel::Uniform => -(Expr::symbol(&sym.mass) * &g),
    };
    let f_z = &t * Expr::cos(theta) + weight;

    [f_x, f_y, f_z, Expr::zero(), Expr::zero(), Expr::zero()]
}

// ---------------------------------------------------------------------------
// Euler-Lagrange assembly
// ---------------------------------------------------------------------------

/// Form `d/dt(dL/dq') - dL/dq - F_q` for each coordinate, in order.
pub fn euler_lagrange(
    lagrangian: &Expr,
    sym: &SpaceshotSymbols,
    forces: &[Expr; 6],
) -> EquationSet {
    let mut set = EquationSet::new();
    for c in Coordinate::ALL {
        let momentum = lagrangian.partial(&sym.velocity_atom(c));
        let generalized = lagrangian.partial(&sym.position_atom(c));
        let expr = momentum.time_derivative() - generalized - &forces[c.index()];
        debug!(coordinate = c.name(), terms = expr.num_terms(), "assembled equation of motion");
        set.push(c.name(), expr);
    }
    set
}
