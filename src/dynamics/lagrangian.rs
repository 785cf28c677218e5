use serde::{Deserialize, Serialize};

use super::symbols::{Coordinate, SpaceshotSymbols};
use crate::symbolic::Expr;

// ---------------------------------------------------------------------------
// Lagrangian (kinetic energy only, gravity enters as a generalized force)
// ---------------------------------------------------------------------------

/// Form of the transverse rotational energy term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransverseTerm {
    /// `I1/2 * (phi' sin(theta) + theta')` (default).
    #[default]
    Linear,
    /// `I1/2 * ((phi' sin(theta))^2 + theta'^2)`, the symmetric-top form.
    Quadratic,
}

/// Build
///
/// ```text
/// L = m/2 (x'^2 + y'^2 + z'^2)
///   + I1/2 (phi' sin(theta) + theta')
///   + I3/2 (phi' cos(theta) + psi')^2
/// ```
///
/// with the transverse term replaced by its quadratic form when requested.
pub fn lagrangian(sym: &SpaceshotSymbols, transverse: TransverseTerm) -> Expr {
    let m = Expr::symbol(&sym.mass);
    let i1 = Expr::symbol(&sym.i1);
    let i3 = Expr::symbol(&sym.i3);

    let xd = sym.velocity(Coordinate::X);
    let yd = sym.velocity(Coordinate::Y);
    let zd = sym.velocity(Coordinate::Z);
    let phid = sym.velocity(Coordinate::Phi);
    let thetad = sym.velocity(Coordinate::Theta);
    let psid = sym.velocity(Coordinate::Psi);
    let theta = sym.position(Coordinate::Theta);

    let translational = &m / 2 * (xd.pow(2) + yd.pow(2) + zd.pow(2));

    let transverse = match transverse {
        TransverseTerm::Linear => &i1 / 2 * (&phid * Expr::sin(theta.clone()) + &thetad),
        TransverseTerm::Quadratic => {
            &i1 / 2 * ((&phid * Expr::sin(theta.clone())).pow(2) + thetad.pow(2))
        }
    };

    let axial = &i3 / 2 * (&phid * Expr::cos(theta) + &psid).pow(2);

    translational + transverse + axial
}
