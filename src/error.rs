use thiserror::Error;

/// Errors raised by the derivation pipeline and the numeric integrator.
#[derive(Error, Debug)]
pub enum Error {
    /// A symbol name was declared twice in the same context.
    #[error("symbol `{0}` is already declared")]
    DuplicateSymbol(String),

    /// Lookup of a name that was never declared.
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    /// Numeric evaluation hit an atom with no bound value.
    #[error("no value bound for `{0}`")]
    Unbound(String),

    /// Coordinate-to-auxiliary mapping is not usable for order reduction.
    #[error("invalid reduction mapping: {0}")]
    InvalidMapping(String),

    /// An equation still carries a derivative of order two or more.
    #[error("equation {index} still contains a derivative of order {order}")]
    ResidualHigherOrder { index: usize, order: u32 },

    /// The first-order system is not linear in its rates.
    #[error("equation {index} is not linear in the rate of `{unknown}`")]
    NonlinearRates { index: usize, unknown: String },

    /// The rate matrix cannot be inverted at this state.
    #[error("rate matrix is singular at t = {time:.4} s")]
    SingularRates { time: f64 },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// NaN/Inf in a numeric computation.
    #[error("numerical error: {0}")]
    Numerical(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
