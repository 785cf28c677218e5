use std::collections::BTreeMap;

use tracing::trace;

use super::expr::{Symbol, SymbolKind};
use crate::error::{Error, Result};

/// Explicit symbol registry.
///
/// Every symbol used by a derivation is declared here, and each name may be
/// declared once. Builders take the context (or symbols obtained from it) as
/// a parameter instead of reaching into shared global state.
#[derive(Debug, Clone, Default)]
pub struct SymbolContext {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a time-independent scalar.
    pub fn constant(&mut self, name: &str) -> Result<Symbol> {
        self.declare(name, SymbolKind::Constant)
    }

    /// Declare a function of time.
    pub fn function(&mut self, name: &str) -> Result<Symbol> {
        self.declare(name, SymbolKind::TimeFunction)
    }

    fn declare(&mut self, name: &str, kind: SymbolKind) -> Result<Symbol> {
        if self.symbols.contains_key(name) {
            return Err(Error::DuplicateSymbol(name.to_string()));
        }
        let symbol = Symbol::new(name, kind);
        trace!(name, ?kind, "declared symbol");
        self.symbols.insert(name.to_string(), symbol.clone());
        Ok(symbol)
    }

    pub fn get(&self, name: &str) -> Result<Symbol> {
        self.symbols
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_and_looks_up() {
        let mut ctx = SymbolContext::new();
        let m = ctx.constant("m").unwrap();
        let x = ctx.function("x").unwrap();
        assert_eq!(m.kind(), SymbolKind::Constant);
        assert!(x.is_time_function());
        assert_eq!(ctx.get("x").unwrap(), x);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn rejects_duplicates() {
        let mut ctx = SymbolContext::new();
        ctx.constant("g").unwrap();
        let err = ctx.function("g").unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol(n) if n == "g"));
    }

    #[test]
    fn unknown_lookup_fails() {
        let ctx = SymbolContext::new();
        assert!(matches!(ctx.get("psi"), Err(Error::UnknownSymbol(_))));
    }
}
