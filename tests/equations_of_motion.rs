use proptest::prelude::*;

use spaceshot_loop::dynamics::{
    reduce_order_with, Coordinate, Derivation, GravityModel, ModelOptions, TransverseTerm,
};
use spaceshot_loop::symbolic::{Atom, Expr};

fn all_options() -> Vec<ModelOptions> {
    let mut out = Vec::new();
    for transverse in [TransverseTerm::Linear, TransverseTerm::Quadratic] {
        for gravity in [GravityModel::AltitudeProportional, GravityModel::Uniform] {
            out.push(ModelOptions { transverse, gravity });
        }
    }
    out
}

#[test]
fn no_second_derivative_survives_reduction() {
    for options in all_options() {
        let d = Derivation::run(options).unwrap();
        assert!(d.second_order.iter().any(|eq| eq.expr.max_derivative_order() == 2));
        for eq in d.first_order.equations().iter() {
            assert!(
                eq.expr.max_derivative_order() <= 1,
                "{:?}: {} = {}",
                options,
                eq.label,
                eq.expr
            );
        }
    }
}

#[test]
fn restoring_auxiliaries_reproduces_second_order_equations() {
    for options in all_options() {
        let d = Derivation::run(options).unwrap();
        assert_eq!(d.first_order.restore(), d.second_order.exprs());
    }
}

#[test]
fn auxiliary_definitions_follow_coordinate_order() {
    let d = Derivation::run(ModelOptions::default()).unwrap();
    let eqs = d.first_order.equations();
    for c in Coordinate::ALL {
        let aux = d.context.get(c.auxiliary_name()).unwrap();
        let expected = d.symbols.velocity(c) - Expr::symbol(&aux);
        assert_eq!(eqs[6 + c.index()], expected);
        assert_eq!(eqs.get(6 + c.index()).unwrap().label, c.auxiliary_name());
    }
}

#[test]
fn lagrangian_is_cyclic_in_all_but_theta() {
    let d = Derivation::run(ModelOptions::default()).unwrap();
    for c in [Coordinate::X, Coordinate::Y, Coordinate::Z, Coordinate::Phi, Coordinate::Psi] {
        assert!(d.lagrangian.partial(&d.symbols.position_atom(c)).is_zero());
    }
    let theta = d.symbols.position_atom(Coordinate::Theta);
    assert!(!d.lagrangian.partial(&theta).is_zero());
    for (mono, _) in d.lagrangian.terms() {
        assert!(mono.exponent(&theta) == 0, "theta outside sin/cos");
    }
}

#[test]
fn x_equation_is_momentum_rate_minus_thrust() {
    let d = Derivation::run(ModelOptions::default()).unwrap();
    let s = &d.symbols;
    let expected = Expr::symbol(&s.mass) * Expr::derivative(s.coord(Coordinate::X), 2)
        - Expr::symbol(&s.thrust)
            * Expr::sin(s.position(Coordinate::Phi))
            * Expr::sin(s.position(Coordinate::Theta));
    assert_eq!(d.second_order[0], expected);

    let px = d.lagrangian.partial(&s.velocity_atom(Coordinate::X));
    assert_eq!(px, Expr::symbol(&s.mass) * s.velocity(Coordinate::X));
}

#[test]
fn phi_equation_matches_reference_form() {
    let d = Derivation::run(ModelOptions::default()).unwrap();
    let s = &d.symbols;
    let i1 = Expr::symbol(&s.i1);
    let i3 = Expr::symbol(&s.i3);
    let sin_t = Expr::sin(s.position(Coordinate::Theta));
    let cos_t = Expr::cos(s.position(Coordinate::Theta));
    let phid = s.velocity(Coordinate::Phi);
    let thetad = s.velocity(Coordinate::Theta);
    let psid = s.velocity(Coordinate::Psi);
    let phidd = Expr::derivative(s.coord(Coordinate::Phi), 2);
    let psidd = Expr::derivative(s.coord(Coordinate::Psi), 2);

    let expected = &i1 * &cos_t * &thetad / 2
        - &i3 * (&cos_t * &phid + &psid) * &sin_t * &thetad
        + &i3 * (-(&sin_t * &phid * &thetad) + &cos_t * &phidd + &psidd) * &cos_t;

    assert_eq!(d.second_order[3], expected);
}

#[test]
fn reduced_phi_equation_uses_auxiliaries() {
    let d = Derivation::run(ModelOptions::default()).unwrap();
    let aux = |name: &str| d.context.get(name).unwrap();
    let (dd, e, f) = (aux("d"), aux("e"), aux("f"));
    let reduced = &d.first_order.equations()[3];
    assert!(reduced.depends_on(&Atom::derivative(&dd, 1)));
    assert!(reduced.depends_on(&Atom::derivative(&f, 1)));
    assert!(reduced.depends_on(&Atom::of(&e)));
    for c in Coordinate::ALL {
        assert!(!reduced.depends_on(&d.symbols.velocity_atom(c)));
    }
}

proptest! {
    #[test]
    fn substitution_order_does_not_matter(
        order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle(),
        quadratic in any::<bool>(),
    ) {
        let transverse = if quadratic { TransverseTerm::Quadratic } else { TransverseTerm::Linear };
        let d = Derivation::run(ModelOptions { transverse, ..ModelOptions::default() }).unwrap();
        let shuffled = reduce_order_with(&d.second_order, d.first_order.map(), &order).unwrap();
        prop_assert_eq!(shuffled.equations(), d.first_order.equations());
    }
}
