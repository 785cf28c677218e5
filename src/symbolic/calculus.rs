use std::collections::{BTreeSet, HashMap};

use super::expr::{Atom, Expr, Monomial, Symbol};
use super::lower::CompiledExprs;
use super::rational::Rational;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Differentiation
// ---------------------------------------------------------------------------

impl Expr {
    /// Product rule over every factor, with `d_atom` giving the derivative
    /// of a single atom.
    fn differentiate_with(&self, d_atom: &dyn Fn(&Atom) -> Expr) -> Expr {
        let mut out = Expr::zero();
        for (mono, coeff) in self.terms() {
            for (atom, exp) in mono.factors() {
                let da = d_atom(atom);
                if da.is_zero() {
                    continue;
                }
                let rest = Expr::monomial(
                    mono.with_exponent(atom, exp - 1),
                    coeff * Rational::integer(exp as i64),
                );
                out = out + rest * da;
            }
        }
        out
    }

    /// Partial derivative with respect to `wrt`, holding every other atom
    /// fixed. Trig arguments are differentiated through the chain rule.
    pub fn partial(&self, wrt: &Atom) -> Expr {
        self.differentiate_with(&|atom| {
            if atom == wrt {
                return Expr::one();
            }
            match atom {
                Atom::Sin(u) => Expr::cos((**u).clone()) * u.partial(wrt),
                Atom::Cos(u) => -Expr::sin((**u).clone()) * u.partial(wrt),
                _ => Expr::zero(),
            }
        })
    }

    /// Total derivative with respect to time.
    pub fn time_derivative(&self) -> Expr {
        self.differentiate_with(&|atom| match atom {
            Atom::Const(_) => Expr::zero(),
            Atom::Func { symbol, order } => Expr::derivative(symbol, order + 1),
            Atom::Sin(u) => Expr::cos((**u).clone()) * u.time_derivative(),
            Atom::Cos(u) => -Expr::sin((**u).clone()) * u.time_derivative(),
        })
    }
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

impl Expr {
    /// Rebuild the expression, replacing each atom for which `f` returns a
    /// value. Trig arguments are rewritten recursively.
    fn map_atoms(&self, f: &dyn Fn(&Atom) -> Option<Expr>) -> Expr {
        let mut out = Expr::zero();
        for (mono, coeff) in self.terms() {
            let mut term = Expr::num(coeff);
            for (atom, exp) in mono.factors() {
                let replaced = match f(atom) {
                    Some(e) => e,
                    None => match atom {
                        Atom::Sin(u) => Expr::sin(u.map_atoms(f)),
                        Atom::Cos(u) => Expr::cos(u.map_atoms(f)),
                        _ => Expr::atom(atom.clone()),
                    },
                };
                term = term * replaced.pow(exp);
            }
            out = out + term;
        }
        out
    }

    /// Replace every occurrence of `target` by `replacement`.
    pub fn subs(&self, target: &Atom, replacement: &Expr) -> Expr {
        self.map_atoms(&|atom| (atom == target).then(|| replacement.clone()))
    }

    /// Derivative-aware function substitution.
    ///
    /// Every `from^(n)` with `n >= from_order` becomes
    /// `to^(n - from_order + to_order)`. Replacing `x'` by `a` therefore
    /// turns `x''` into `a'` while leaving `x` alone.
    pub fn subs_derivative(
        &self,
        from: &Symbol,
        from_order: u32,
        to: &Symbol,
        to_order: u32,
    ) -> Expr {
        self.map_atoms(&|atom| match atom {
            Atom::Func { symbol, order } if symbol == from && *order >= from_order => {
                Some(Expr::derivative(to, order - from_order + to_order))
            }
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Structural queries
// ---------------------------------------------------------------------------

impl Expr {
    /// Constants and function derivatives appearing anywhere, including
    /// inside trig arguments.
    pub fn free_atoms(&self) -> BTreeSet<Atom> {
        let mut out = BTreeSet::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut BTreeSet<Atom>) {
        for (mono, _) in self.terms() {
            for (atom, _) in mono.factors() {
                match atom {
                    Atom::Sin(u) | Atom::Cos(u) => u.collect_atoms(out),
                    leaf => {
                        out.insert(leaf.clone());
                    }
                }
            }
        }
    }

    pub fn depends_on(&self, atom: &Atom) -> bool {
        self.free_atoms().contains(atom)
    }

    /// Highest time-derivative order of any function in the expression.
    pub fn max_derivative_order(&self) -> u32 {
        self.free_atoms()
            .iter()
            .filter_map(|a| match a {
                Atom::Func { order, .. } => Some(*order),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Trigonometric simplification
// ---------------------------------------------------------------------------

impl Expr {
    /// Rewrite `sin(u)^2 -> 1 - cos(u)^2` (or the reverse) until no top-level
    /// factor of the rewritten kind has exponent two or more.
    fn rewrite_pythagorean(&self, sin_to_cos: bool) -> Expr {
        let mut out = Expr::zero();
        let mut pending: Vec<(Monomial, Rational)> =
            self.terms().map(|(m, c)| (m.clone(), c)).collect();

        while let Some((mono, coeff)) = pending.pop() {
            let square = mono.factors().find_map(|(atom, exp)| {
                let partner = match (atom, sin_to_cos) {
                    (Atom::Sin(u), true) => Atom::Cos(u.clone()),
                    (Atom::Cos(u), false) => Atom::Sin(u.clone()),
                    _ => return None,
                };
                (exp >= 2).then(|| (atom.clone(), partner, exp))
            });
            match square {
                Some((atom, partner, exp)) => {
                    let base = mono.with_exponent(&atom, exp - 2);
                    let partner_exp = base.exponent(&partner);
                    pending.push((base.with_exponent(&partner, partner_exp + 2), -coeff));
                    pending.push((base, coeff));
                }
                None => out.add_term(mono, coeff),
            }
        }
        out
    }

    /// Apply `sin^2 + cos^2 = 1` in whichever direction yields the fewest
    /// terms. Ties keep the input.
    pub fn trig_simplify(&self) -> Expr {
        let candidates = [self.rewrite_pythagorean(true), self.rewrite_pythagorean(false)];
        let mut best = self.clone();
        for c in candidates {
            if c.num_terms() < best.num_terms() {
                best = c;
            }
        }
        best
    }

    /// True when `self - other` vanishes under the Pythagorean identity.
    pub fn trig_equivalent(&self, other: &Expr) -> bool {
        (self - other).rewrite_pythagorean(true).is_zero()
    }
}

// ---------------------------------------------------------------------------
// Numeric evaluation
// ---------------------------------------------------------------------------

/// Numeric values for constants and function derivatives.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<Atom, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, atom: Atom, value: f64) -> &mut Self {
        self.values.insert(atom, value);
        self
    }

    pub fn bind_symbol(&mut self, symbol: &Symbol, value: f64) -> &mut Self {
        self.bind(Atom::of(symbol), value)
    }

    pub fn bind_derivative(&mut self, symbol: &Symbol, order: u32, value: f64) -> &mut Self {
        self.bind(Atom::derivative(symbol, order), value)
    }

    pub fn get(&self, atom: &Atom) -> Option<f64> {
        self.values.get(atom).copied()
    }
}

impl Expr {
    /// One-off numeric value. Repeated evaluation should compile once with
    /// [`CompiledExprs`] instead.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64> {
        let compiled = CompiledExprs::compile(&[self], &[])?;
        let inputs = compiled.input_values(bindings)?;
        let mut out = [0.0];
        compiled.eval_into(&inputs, &mut out)?;
        Ok(out[0])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
