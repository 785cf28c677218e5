pub mod event;
pub mod integrator;
pub mod rates;
pub mod runner;

pub use event::{
    detect_events, detectors_for, standard_detectors, AltitudeMark, EventDetector, EventKind,
    FlightEvent,
};
pub use integrator::rk4_step;
pub use rates::CompiledSystem;
pub use runner::simulate;
