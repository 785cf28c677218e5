//! Small exact computer-algebra core: expressions over rational
//! coefficients, constants, time functions and their derivatives, `sin` and
//! `cos`. Supports partial and total time differentiation, substitution,
//! Pythagorean simplification, pretty printing, and numeric evaluation
//! through expressions lowered into a compiled `tang_expr` graph.

pub mod calculus;
pub mod context;
mod display;
pub mod expr;
pub mod lower;
pub mod rational;

pub use calculus::Bindings;
pub use context::SymbolContext;
pub use expr::{Atom, Expr, Monomial, Symbol, SymbolKind};
pub use lower::CompiledExprs;
pub use rational::Rational;
