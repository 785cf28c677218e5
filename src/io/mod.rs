pub mod csv;
pub mod json;

pub use csv::{write_trajectory, write_trajectory_file};
pub use json::{model_json, write_json, write_json_file, DerivationReport, FlightSummary};
