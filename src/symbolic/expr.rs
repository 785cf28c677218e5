use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use super::rational::Rational;

// ---------------------------------------------------------------------------
// Symbols and atoms
// ---------------------------------------------------------------------------

/// Whether a symbol is a fixed scalar or a function of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Constant,
    TimeFunction,
}

/// A named symbol. Created through a [`SymbolContext`](super::SymbolContext).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: Arc<str>,
    kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(name: &str, kind: SymbolKind) -> Self {
        Symbol { name: Arc::from(name), kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_time_function(&self) -> bool {
        self.kind == SymbolKind::TimeFunction
    }
}

/// Indivisible factor of a monomial.
///
/// Variant order fixes the canonical print order: constants first, then
/// function derivatives, then trig factors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    Const(Symbol),
    /// `order`-th time derivative of a time function (order 0 = the function).
    Func { symbol: Symbol, order: u32 },
    Sin(Box<Expr>),
    Cos(Box<Expr>),
}

impl Atom {
    pub fn derivative(symbol: &Symbol, order: u32) -> Atom {
        Atom::Func { symbol: symbol.clone(), order }
    }

    /// The atom standing for `symbol` itself.
    pub fn of(symbol: &Symbol) -> Atom {
        match symbol.kind() {
            SymbolKind::Constant => Atom::Const(symbol.clone()),
            SymbolKind::TimeFunction => Atom::derivative(symbol, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Monomial: product of atoms raised to positive powers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<Atom, u32>);

impl Monomial {
    /// The empty product.
    pub fn one() -> Self {
        Monomial(BTreeMap::new())
    }

    pub fn from_atom(atom: Atom, exp: u32) -> Self {
        Monomial::one().with_exponent(&atom, exp)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn exponent(&self, atom: &Atom) -> u32 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    /// Copy with `atom` raised to exactly `exp` (removed when `exp == 0`).
    pub fn with_exponent(&self, atom: &Atom, exp: u32) -> Monomial {
        let mut factors = self.0.clone();
        if exp == 0 {
            factors.remove(atom);
        } else {
            factors.insert(atom.clone(), exp);
        }
        Monomial(factors)
    }

    pub fn factors(&self) -> impl Iterator<Item = (&Atom, u32)> {
        self.0.iter().map(|(a, &e)| (a, e))
    }

    fn times(&self, other: &Monomial) -> Monomial {
        let mut factors = self.0.clone();
        for (atom, exp) in &other.0 {
            *factors.entry(atom.clone()).or_insert(0) += exp;
        }
        Monomial(factors)
    }
}

// ---------------------------------------------------------------------------
// Expression: canonical sum of monomials with rational coefficients
// ---------------------------------------------------------------------------

/// Symbolic expression in expanded canonical form.
///
/// Every expression is a sum of `coefficient * monomial` with no zero
/// coefficients and no repeated monomials, so structurally equal means
/// algebraically equal (modulo trig identities, see
/// [`Expr::trig_simplify`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr {
    terms: BTreeMap<Monomial, Rational>,
}

impl Expr {
    pub fn zero() -> Self {
        Expr::default()
    }

    pub fn one() -> Self {
        Expr::num(Rational::ONE)
    }

    pub fn num(value: Rational) -> Self {
        Expr::monomial(Monomial::one(), value)
    }

    pub fn int(value: i64) -> Self {
        Expr::num(Rational::integer(value))
    }

    pub fn monomial(mono: Monomial, coeff: Rational) -> Self {
        let mut e = Expr::zero();
        e.add_term(mono, coeff);
        e
    }

    pub fn atom(atom: Atom) -> Self {
        Expr::monomial(Monomial::from_atom(atom, 1), Rational::ONE)
    }

    /// A constant, or a time function at derivative order zero.
    pub fn symbol(symbol: &Symbol) -> Self {
        Expr::atom(Atom::of(symbol))
    }

    /// `order`-th time derivative of `symbol`. Constants differentiate to zero.
    pub fn derivative(symbol: &Symbol, order: u32) -> Self {
        match symbol.kind() {
            SymbolKind::Constant if order > 0 => Expr::zero(),
            SymbolKind::Constant => Expr::symbol(symbol),
            SymbolKind::TimeFunction => Expr::atom(Atom::derivative(symbol, order)),
        }
    }

    pub fn sin(arg: Expr) -> Self {
        if arg.is_zero() {
            return Expr::zero();
        }
        if arg.leading_negative() {
            return -Expr::atom(Atom::Sin(Box::new(-arg)));
        }
        Expr::atom(Atom::Sin(Box::new(arg)))
    }

    pub fn cos(arg: Expr) -> Self {
        if arg.is_zero() {
            return Expr::one();
        }
        if arg.leading_negative() {
            return Expr::atom(Atom::Cos(Box::new(-arg)));
        }
        Expr::atom(Atom::Cos(Box::new(arg)))
    }

    pub fn pow(&self, exp: u32) -> Expr {
        let mut out = Expr::one();
        for _ in 0..exp {
            out = &out * self;
        }
        out
    }

    pub fn scale(&self, factor: Rational) -> Expr {
        if factor.is_zero() {
            return Expr::zero();
        }
        Expr {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), *c * factor))
                .collect(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value if the expression is a plain number.
    pub fn as_rational(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::ZERO),
            1 => self.terms.get(&Monomial::one()).copied(),
            _ => None,
        }
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, Rational)> {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    pub(crate) fn add_term(&mut self, mono: Monomial, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        let sum = match self.terms.get(&mono) {
            Some(&existing) => existing + coeff,
            None => coeff,
        };
        if sum.is_zero() {
            self.terms.remove(&mono);
        } else {
            self.terms.insert(mono, sum);
        }
    }

    fn leading_negative(&self) -> bool {
        self.terms.values().next().is_some_and(|c| c.is_negative())
    }

    fn sum(&self, other: &Expr) -> Expr {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), *c);
        }
        out
    }

    fn product(&self, other: &Expr) -> Expr {
        let mut out = Expr::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                out.add_term(ma.times(mb), *ca * *cb);
            }
        }
        out
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Expr::num(value)
    }
}

// ---------------------------------------------------------------------------
// Operators (owned and borrowed operands)
// ---------------------------------------------------------------------------

macro_rules! binary_op {
    ($trait:ident, $method:ident, $body:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                self.$body(&rhs)
            }
        }
        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                self.$body(rhs)
            }
        }
        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                self.$body(&rhs)
            }
        }
        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                self.$body(rhs)
            }
        }
    };
}

impl Expr {
    fn difference(&self, other: &Expr) -> Expr {
        self.sum(&other.scale(-Rational::ONE))
    }
}

binary_op!(Add, add, sum);
binary_op!(Sub, sub, difference);
binary_op!(Mul, mul, product);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.scale(-Rational::ONE)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.scale(-Rational::ONE)
    }
}

impl Div<i64> for Expr {
    type Output = Expr;
    fn div(self, rhs: i64) -> Expr {
        self.scale(Rational::ONE / Rational::integer(rhs))
    }
}

impl Div<i64> for &Expr {
    type Output = Expr;
    fn div(self, rhs: i64) -> Expr {
        self.scale(Rational::ONE / Rational::integer(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind)
    }

    #[test]
    fn like_terms_combine() {
        let m = Expr::symbol(&sym("m", SymbolKind::Constant));
        let sum = &m + &m - Expr::int(2) * &m;
        assert!(sum.is_zero());
    }

    #[test]
    fn products_expand() {
        let x = Expr::symbol(&sym("x", SymbolKind::TimeFunction));
        let y = Expr::symbol(&sym("y", SymbolKind::TimeFunction));
        let lhs = (&x + &y).pow(2);
        let rhs = &x * &x + Expr::int(2) * &x * &y + &y * &y;
        assert_eq!(lhs, rhs);
        assert_eq!(lhs.num_terms(), 3);
    }

    #[test]
    fn trig_of_zero_and_negation() {
        let theta = Expr::symbol(&sym("theta", SymbolKind::TimeFunction));
        assert!(Expr::sin(Expr::zero()).is_zero());
        assert_eq!(Expr::cos(Expr::zero()), Expr::one());
        assert_eq!(Expr::sin(-&theta), -Expr::sin(theta.clone()));
        assert_eq!(Expr::cos(-&theta), Expr::cos(theta));
    }

    #[test]
    fn constant_derivative_is_zero() {
        let g = sym("g", SymbolKind::Constant);
        assert!(Expr::derivative(&g, 1).is_zero());
        assert_eq!(Expr::derivative(&g, 0), Expr::symbol(&g));
    }

    #[test]
    fn as_rational_only_for_numbers() {
        assert_eq!((Expr::int(3) / 6).as_rational(), Some(Rational::new(1, 2)));
        let x = Expr::symbol(&sym("x", SymbolKind::TimeFunction));
        assert_eq!(x.as_rational(), None);
    }
}
