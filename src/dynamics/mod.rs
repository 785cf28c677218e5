//! Symbolic equations of motion: symbols, Lagrangian, Euler-Lagrange
//! assembly and reduction to first order.

pub mod equations;
pub mod lagrangian;
pub mod reduction;
pub mod state;
pub mod symbols;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::symbolic::{Expr, SymbolContext};

pub use equations::{euler_lagrange, generalized_forces, Equation, EquationSet, GravityModel};
pub use lagrangian::{lagrangian, TransverseTerm};
pub use reduction::{reduce_order, reduce_order_with, FirstOrderSystem, ReductionMap};
pub use symbols::{Coordinate, SpaceshotSymbols};

/// Modelling choices that change the derived equations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub transverse: TransverseTerm,
    pub gravity: GravityModel,
}

/// Every intermediate product of one run of the pipeline.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub options: ModelOptions,
    pub context: SymbolContext,
    pub symbols: SpaceshotSymbols,
    pub lagrangian: Expr,
    pub second_order: EquationSet,
    pub first_order: FirstOrderSystem,
}

impl Derivation {
    /// Declare symbols, build `L`, assemble the six equations of motion and
    /// reduce them to twelve first-order equations.
    pub fn run(options: ModelOptions) -> Result<Self> {
        let mut context = SymbolContext::new();
        let symbols = SpaceshotSymbols::declare(&mut context)?;

        let lagrangian = lagrangian::lagrangian(&symbols, options.transverse);
        debug!(terms = lagrangian.num_terms(), "built Lagrangian");

        let forces = equations::generalized_forces(&symbols, options.gravity);
        let second_order = equations::euler_lagrange(&lagrangian, &symbols, &forces);

        let map = ReductionMap::declare(&mut context, &symbols)?;
        let first_order = reduction::reduce_order(&second_order, &map)?;

        info!(
            transverse = ?options.transverse,
            gravity = ?options.gravity,
            equations = first_order.equations().len(),
            "derived first-order system"
        );

        Ok(Self {
            options,
            context,
            symbols,
            lagrangian,
            second_order,
            first_order,
        })
    }

    /// Copy with every equation passed through `sin^2 + cos^2 = 1`.
    pub fn simplified(&self) -> EquationSet {
        self.first_order.equations().map(Expr::trig_simplify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_produces_twelve_first_order_equations() {
        let d = Derivation::run(ModelOptions::default()).unwrap();
        assert_eq!(d.second_order.len(), 6);
        assert_eq!(d.first_order.equations().len(), 12);
        assert_eq!(d.context.len(), 17);
        for eq in d.first_order.equations().iter() {
            assert!(eq.expr.max_derivative_order() <= 1, "{} = {}", eq.label, eq.expr);
        }
    }

    #[test]
    fn simplified_system_is_equivalent() {
        let d = Derivation::run(ModelOptions {
            transverse: TransverseTerm::Quadratic,
            gravity: GravityModel::Uniform,
        })
        .unwrap();
        let simplified = d.simplified();
        for (orig, simp) in d.first_order.equations().iter().zip(simplified.iter()) {
            assert!(orig.expr.trig_equivalent(&simp.expr));
            assert!(simp.expr.num_terms() <= orig.expr.num_terms());
        }
    }
}
