//! Lowering of canonical expressions into a `tang_expr` graph, compiled once
//! into a closure over a flat input slice.
//!
//! Every constant and function derivative gets one input slot. `sin` maps to
//! the graph's only trig primitive and `cos(u)` is lowered as
//! `sin(u + pi/2)`. Coefficients become `f64` literals, so exactness ends
//! here.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

use tang_expr::compile::CompiledMany;
use tang_expr::{ExprGraph, ExprId};
use tracing::trace;

use super::calculus::Bindings;
use super::expr::{Atom, Expr};
use crate::error::{Error, Result};

struct Lowering {
    graph: ExprGraph,
    slots: HashMap<Atom, u16>,
}

impl Lowering {
    fn expr(&mut self, expr: &Expr) -> ExprId {
        let mut sum: Option<ExprId> = None;
        for (mono, coeff) in expr.terms() {
            let mut term = if coeff.is_one() {
                None
            } else {
                Some(self.graph.lit(coeff.to_f64()))
            };
            for (atom, exp) in mono.factors() {
                let base = self.atom(atom);
                let factor = self.power(base, exp);
                term = Some(match term {
                    Some(t) => self.graph.mul(t, factor),
                    None => factor,
                });
            }
            let term = term.unwrap_or(ExprId::ONE);
            sum = Some(match sum {
                Some(s) => self.graph.add(s, term),
                None => term,
            });
        }
        sum.unwrap_or(ExprId::ZERO)
    }

    fn atom(&mut self, atom: &Atom) -> ExprId {
        match atom {
            Atom::Sin(u) => {
                let arg = self.expr(u);
                self.graph.sin(arg)
            }
            Atom::Cos(u) => {
                let arg = self.expr(u);
                let quarter = self.graph.lit(FRAC_PI_2);
                let shifted = self.graph.add(arg, quarter);
                self.graph.sin(shifted)
            }
            // Slots are assigned for every free atom before lowering starts.
            leaf => self.graph.var(self.slots[leaf]),
        }
    }

    fn power(&mut self, base: ExprId, exp: u32) -> ExprId {
        let mut acc: Option<ExprId> = None;
        let mut square = base;
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                acc = Some(match acc {
                    Some(a) => self.graph.mul(a, square),
                    None => square,
                });
            }
            e >>= 1;
            if e > 0 {
                square = self.graph.mul(square, square);
            }
        }
        acc.unwrap_or(ExprId::ONE)
    }
}

/// A batch of expressions compiled to one closure.
///
/// Input slot `i` holds the value of `inputs()[i]`; outputs come back in the
/// order the expressions were given.
pub struct CompiledExprs {
    inputs: Vec<Atom>,
    outputs: usize,
    eval_fn: CompiledMany,
}

impl fmt::Debug for CompiledExprs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExprs")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl CompiledExprs {
    /// Compile `exprs`. Atoms in `leading` take the first input slots in the
    /// given order, whether or not they appear; every other free atom follows
    /// in canonical order.
    pub fn compile(exprs: &[&Expr], leading: &[Atom]) -> Result<Self> {
        let mut rest = BTreeSet::new();
        for e in exprs {
            rest.extend(e.free_atoms());
        }
        let mut inputs: Vec<Atom> = leading.to_vec();
        inputs.extend(rest.into_iter().filter(|a| !leading.contains(a)));

        if inputs.len() > usize::from(u16::MAX) {
            return Err(Error::Numerical(format!(
                "{} inputs exceed the graph's slots",
                inputs.len()
            )));
        }
        let mut slots = HashMap::with_capacity(inputs.len());
        for (i, atom) in inputs.iter().enumerate() {
            if slots.insert(atom.clone(), i as u16).is_some() {
                return Err(Error::InvalidMapping(format!(
                    "input {} given twice",
                    Expr::atom(atom.clone())
                )));
            }
        }

        let mut lowering = Lowering { graph: ExprGraph::new(), slots };
        let roots: Vec<ExprId> = exprs.iter().map(|e| lowering.expr(e)).collect();
        trace!(
            inputs = inputs.len(),
            outputs = roots.len(),
            nodes = lowering.graph.len(),
            "lowered expressions"
        );

        Ok(Self {
            inputs,
            outputs: roots.len(),
            eval_fn: lowering.graph.compile_many(&roots),
        })
    }

    pub fn inputs(&self) -> &[Atom] {
        &self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Gather input values from `bindings`, in slot order.
    pub fn input_values(&self, bindings: &Bindings) -> Result<Vec<f64>> {
        self.inputs
            .iter()
            .map(|a| {
                bindings
                    .get(a)
                    .ok_or_else(|| Error::Unbound(Expr::atom(a.clone()).to_string()))
            })
            .collect()
    }

    /// Evaluate every output into `out`.
    pub fn eval_into(&self, inputs: &[f64], out: &mut [f64]) -> Result<()> {
        if inputs.len() != self.inputs.len() || out.len() != self.outputs {
            return Err(Error::Numerical(format!(
                "expected {} inputs and {} outputs, got {} and {}",
                self.inputs.len(),
                self.outputs,
                inputs.len(),
                out.len()
            )));
        }
        (self.eval_fn)(inputs, out);
        Ok(())
    }
}
