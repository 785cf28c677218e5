use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::symbolic::{Atom, Expr, Symbol, SymbolContext};

// ---------------------------------------------------------------------------
// Generalized coordinates
// ---------------------------------------------------------------------------

/// The six generalized coordinates, in equation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    X,
    Y,
    Z,
    Phi,
    Theta,
    Psi,
}

impl Coordinate {
    pub const ALL: [Coordinate; 6] = [
        Coordinate::X,
        Coordinate::Y,
        Coordinate::Z,
        Coordinate::Phi,
        Coordinate::Theta,
        Coordinate::Psi,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Coordinate::X => "x",
            Coordinate::Y => "y",
            Coordinate::Z => "z",
            Coordinate::Phi => "phi",
            Coordinate::Theta => "theta",
            Coordinate::Psi => "psi",
        }
    }

    /// Name of the auxiliary velocity standing for this coordinate's rate.
    pub fn auxiliary_name(self) -> &'static str {
        match self {
            Coordinate::X => "a",
            Coordinate::Y => "b",
            Coordinate::Z => "c",
            Coordinate::Phi => "d",
            Coordinate::Theta => "e",
            Coordinate::Psi => "f",
        }
    }
}

// ---------------------------------------------------------------------------
// Declared symbols of the model
// ---------------------------------------------------------------------------

/// Constants and coordinates of the spaceshot model.
#[derive(Debug, Clone)]
pub struct SpaceshotSymbols {
    pub mass: Symbol,
    pub gravity: Symbol,
    /// Transverse moment of inertia.
    pub i1: Symbol,
    /// Axial moment of inertia.
    pub i3: Symbol,
    pub thrust: Symbol,
    coords: [Symbol; 6],
}

impl SpaceshotSymbols {
    /// Declare `m, g, I1, I3, T` and the six coordinates in `ctx`.
    pub fn declare(ctx: &mut SymbolContext) -> Result<Self> {
        let mass = ctx.constant("m")?;
        let gravity = ctx.constant("g")?;
        let i1 = ctx.constant("I1")?;
        let i3 = ctx.constant("I3")?;
        let thrust = ctx.constant("T")?;

        let coords = [
            ctx.function(Coordinate::X.name())?,
            ctx.function(Coordinate::Y.name())?,
            ctx.function(Coordinate::Z.name())?,
            ctx.function(Coordinate::Phi.name())?,
            ctx.function(Coordinate::Theta.name())?,
            ctx.function(Coordinate::Psi.name())?,
        ];

        Ok(Self { mass, gravity, i1, i3, thrust, coords })
    }

    pub fn coord(&self, c: Coordinate) -> &Symbol {
        &self.coords[c.index()]
    }

    pub fn coords(&self) -> &[Symbol; 6] {
        &self.coords
    }

    /// `q(t)` as an expression.
    pub fn position(&self, c: Coordinate) -> Expr {
        Expr::symbol(self.coord(c))
    }

    /// `q'(t)` as an expression.
    pub fn velocity(&self, c: Coordinate) -> Expr {
        Expr::derivative(self.coord(c), 1)
    }

    pub fn position_atom(&self, c: Coordinate) -> Atom {
        Atom::derivative(self.coord(c), 0)
    }

    pub fn velocity_atom(&self, c: Coordinate) -> Atom {
        Atom::derivative(self.coord(c), 1)
    }

    pub fn constants(&self) -> [&Symbol; 5] {
        [&self.mass, &self.gravity, &self.i1, &self.i3, &self.thrust]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn declares_eleven_symbols() {
        let mut ctx = SymbolContext::new();
        let sym = SpaceshotSymbols::declare(&mut ctx).unwrap();
        assert_eq!(ctx.len(), 11);
        assert_eq!(sym.coord(Coordinate::Theta).name(), "theta");
        assert!(sym.coord(Coordinate::Psi).is_time_function());
        assert!(!sym.thrust.is_time_function());
    }

    #[test]
    fn second_declaration_in_same_context_fails() {
        let mut ctx = SymbolContext::new();
        SpaceshotSymbols::declare(&mut ctx).unwrap();
        assert!(matches!(
            SpaceshotSymbols::declare(&mut ctx),
            Err(Error::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn coordinate_order_and_names() {
        let names: Vec<_> = Coordinate::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["x", "y", "z", "phi", "theta", "psi"]);
        let aux: String = Coordinate::ALL.iter().map(|c| c.auxiliary_name()).collect();
        assert_eq!(aux, "abcdef");
        assert_eq!(Coordinate::Theta.index(), 4);
    }
}
