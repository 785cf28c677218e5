use std::fmt;

use super::expr::{Atom, Expr, Monomial};

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Const(s) => write!(f, "{}", s.name()),
            Atom::Func { symbol, order } => match order {
                0..=3 => write!(f, "{}{}", symbol.name(), "'".repeat(*order as usize)),
                n => write!(f, "{}^({})", symbol.name(), n),
            },
            Atom::Sin(u) => write!(f, "sin({})", u),
            Atom::Cos(u) => write!(f, "cos({})", u),
        }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        for (i, (atom, exp)) in self.factors().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            if exp > 1 {
                write!(f, "{}^{}", atom, exp)?;
            } else {
                write!(f, "{}", atom)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (mono, coeff)) in self.terms().enumerate() {
            let sign = if coeff.is_negative() { "-" } else { "+" };
            match (i, coeff.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                _ => write!(f, " {} ", sign)?,
            }
            let mag = coeff.abs();
            if mono.is_one() {
                write!(f, "{}", mag)?;
            } else if mag.is_one() {
                write!(f, "{}", mono)?;
            } else if mag.denom() == 1 {
                write!(f, "{}*{}", mag.numer(), mono)?;
            } else if mag.numer() == 1 {
                write!(f, "{}/{}", mono, mag.denom())?;
            } else {
                write!(f, "{}*{}/{}", mag.numer(), mono, mag.denom())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::symbolic::{Expr, SymbolContext};

    #[test]
    fn prints_terms_with_signs() {
        let mut ctx = SymbolContext::new();
        let m = ctx.constant("m").unwrap();
        let x = ctx.function("x").unwrap();
        let e = Expr::symbol(&m) * Expr::derivative(&x, 2) - Expr::int(3) / 2;
        assert_eq!(e.to_string(), "-3/2 + m*x''");
    }

    #[test]
    fn prints_powers_and_trig() {
        let mut ctx = SymbolContext::new();
        let i3 = ctx.constant("I3").unwrap();
        let theta = ctx.function("theta").unwrap();
        let e = Expr::symbol(&i3) * Expr::cos(Expr::symbol(&theta)).pow(2) / 2;
        assert_eq!(e.to_string(), "I3*cos(theta)^2/2");
        assert_eq!(Expr::zero().to_string(), "0");
    }
}
