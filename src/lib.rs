//! Equations of motion for a simplified spaceshot rocket.
//!
//! The Lagrangian (kinetic energy only) is built symbolically, turned into
//! six Euler-Lagrange equations with thrust and gravity as generalized
//! forces, and reduced to a twelve-equation first-order system. The reduced
//! system can be compiled into a rate solver and integrated with RK4.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod sim;
pub mod symbolic;

pub use config::Config;
pub use dynamics::{Derivation, ModelOptions};
pub use error::{Error, Result};
