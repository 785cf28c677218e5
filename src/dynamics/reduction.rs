use std::collections::BTreeSet;

use tracing::debug;

use super::equations::EquationSet;
use super::symbols::{Coordinate, SpaceshotSymbols};
use crate::error::{Error, Result};
use crate::symbolic::{Expr, Symbol, SymbolContext};

// ---------------------------------------------------------------------------
// Coordinate -> auxiliary velocity mapping
// ---------------------------------------------------------------------------

/// Pairs `(coordinate, auxiliary)` where `auxiliary` stands for the
/// coordinate's first time derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionMap {
    pairs: Vec<(Symbol, Symbol)>,
}

impl ReductionMap {
    /// Validate and build a mapping. Every symbol must be a time function,
    /// and no symbol may appear twice on either side or on both sides.
    pub fn new(pairs: Vec<(Symbol, Symbol)>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for (coord, aux) in &pairs {
            for s in [coord, aux] {
                if !s.is_time_function() {
                    return Err(Error::InvalidMapping(format!(
                        "`{}` is not a function of time",
                        s.name()
                    )));
                }
                if !seen.insert(s.clone()) {
                    return Err(Error::InvalidMapping(format!(
                        "`{}` appears more than once",
                        s.name()
                    )));
                }
            }
        }
        Ok(Self { pairs })
    }

    /// Declare `a..f` in `ctx` and pair them with `x..psi`.
    pub fn declare(ctx: &mut SymbolContext, sym: &SpaceshotSymbols) -> Result<Self> {
        let mut pairs = Vec::with_capacity(6);
        for c in Coordinate::ALL {
            let aux = ctx.function(c.auxiliary_name())?;
            pairs.push((sym.coord(c).clone(), aux));
        }
        Self::new(pairs)
    }

    pub fn pairs(&self) -> &[(Symbol, Symbol)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// First-order system
// ---------------------------------------------------------------------------

/// The reduced system: substituted second-order equations followed by one
/// defining equation `q' - aux` per mapped coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstOrderSystem {
    equations: EquationSet,
    map: ReductionMap,
    reduced_count: usize,
}

impl FirstOrderSystem {
    pub fn equations(&self) -> &EquationSet {
        &self.equations
    }

    pub fn map(&self) -> &ReductionMap {
        &self.map
    }

    /// Unknowns in state order: mapped coordinates, then auxiliaries.
    pub fn unknowns(&self) -> Vec<Symbol> {
        let coords = self.map.pairs.iter().map(|(c, _)| c.clone());
        let aux = self.map.pairs.iter().map(|(_, a)| a.clone());
        coords.chain(aux).collect()
    }

    /// Number of leading equations that came from the second-order system.
    pub fn reduced_count(&self) -> usize {
        self.reduced_count
    }

    /// Undo the reduction on the leading equations (`aux -> q'`).
    pub fn restore(&self) -> Vec<Expr> {
        self.equations
            .iter()
            .take(self.reduced_count)
            .map(|eq| {
                self.map
                    .pairs
                    .iter()
                    .fold(eq.expr.clone(), |e, (coord, aux)| e.subs_derivative(aux, 0, coord, 1))
            })
            .collect()
    }
}

/// Reduce `equations` to first order, substituting coordinates in map order.
pub fn reduce_order(equations: &EquationSet, map: &ReductionMap) -> Result<FirstOrderSystem> {
    let order: Vec<usize> = (0..map.len()).collect();
    reduce_order_with(equations, map, &order)
}

/// Reduce `equations`, running one substitution pass per mapping entry in
/// the order given by `pass_order` (indices into `map`). Each pass rewrites
/// the whole accumulated equation list before the next coordinate.
pub fn reduce_order_with(
    equations: &EquationSet,
    map: &ReductionMap,
    pass_order: &[usize],
) -> Result<FirstOrderSystem> {
    let mut distinct = pass_order.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if pass_order.len() != map.len()
        || distinct.len() != map.len()
        || distinct.iter().any(|&i| i >= map.len())
    {
        return Err(Error::InvalidMapping(format!(
            "pass order {:?} is not a permutation of 0..{}",
            pass_order,
            map.len()
        )));
    }

    let mut reduced = equations.clone();
    for &i in pass_order {
        let (coord, aux) = &map.pairs[i];
        reduced = reduced.map(|e| e.subs_derivative(coord, 1, aux, 0));
        debug!(coordinate = coord.name(), auxiliary = aux.name(), "substituted first derivative");
    }

    for (index, eq) in reduced.iter().enumerate() {
        let order = eq.expr.max_derivative_order();
        if order >= 2 {
            return Err(Error::ResidualHigherOrder { index, order });
        }
    }

    let reduced_count = reduced.len();
    for (coord, aux) in &map.pairs {
        reduced.push(aux.name(), Expr::derivative(coord, 1) - Expr::symbol(aux));
    }

    debug!(equations = reduced.len(), "reduced to first order");
    Ok(FirstOrderSystem {
        equations: reduced,
        map: map.clone(),
        reduced_count,
    })
}
