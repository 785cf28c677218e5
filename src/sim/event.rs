use crate::config::SimConfig;
use crate::dynamics::state::State;

/// Altitude above which lift-off is reported.
const LIFTOFF_ALTITUDE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Trajectory events
// ---------------------------------------------------------------------------

/// Kinds of flight events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Launch,
    Apogee,
    Landing,
    /// The trajectory passed a configured altitude mark.
    AltitudeCrossing { altitude: f64, ascending: bool },
}

/// A discrete event found in a trajectory.
#[derive(Debug, Clone)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: State,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind>;
}

/// Detects apogee (vertical speed going from positive to non-positive).
pub struct ApogeeDetector;

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        let turned = prev.vertical_speed() > 0.0 && current.vertical_speed() <= 0.0;
        (turned && current.altitude() > LIFTOFF_ALTITUDE).then_some(EventKind::Apogee)
    }
}

/// Detects lift-off (first climb above `altitude`) and touchdown afterwards.
pub struct LaunchLandingDetector {
    altitude: f64,
    launched: bool,
    landed: bool,
}

impl LaunchLandingDetector {
    pub fn new(altitude: f64) -> Self {
        Self { altitude, launched: false, landed: false }
    }
}

impl EventDetector for LaunchLandingDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        let climbed = prev.altitude() <= self.altitude && current.altitude() > self.altitude;
        if !self.launched && climbed {
            self.launched = true;
            return Some(EventKind::Launch);
        }
        if self.launched && !self.landed && current.altitude() <= 0.0 {
            self.landed = true;
            return Some(EventKind::Landing);
        }
        None
    }
}

/// Reports every pass through a fixed altitude, in either direction.
pub struct AltitudeMark {
    altitude: f64,
}

impl AltitudeMark {
    pub fn new(altitude: f64) -> Self {
        Self { altitude }
    }
}

impl EventDetector for AltitudeMark {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        let (before, after) = (prev.altitude(), current.altitude());
        let ascending = before < self.altitude && after >= self.altitude;
        let descending = before >= self.altitude && after < self.altitude;
        (ascending || descending).then_some(EventKind::AltitudeCrossing {
            altitude: self.altitude,
            ascending,
        })
    }
}

/// Run every detector over consecutive state pairs, in trajectory order.
pub fn detect_events(
    trajectory: &[State],
    detectors: &mut [Box<dyn EventDetector>],
) -> Vec<FlightEvent> {
    let mut events = Vec::new();
    for pair in trajectory.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&pair[0], &pair[1]) {
                events.push(FlightEvent {
                    time: pair[1].time,
                    kind,
                    state: pair[1].clone(),
                });
            }
        }
    }
    events
}

/// Launch, apogee and landing detectors.
pub fn standard_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![Box::new(LaunchLandingDetector::new(LIFTOFF_ALTITUDE)), Box::new(ApogeeDetector)]
}

/// The standard detectors plus one [`AltitudeMark`] per configured altitude.
pub fn detectors_for(config: &SimConfig) -> Vec<Box<dyn EventDetector>> {
    let mut detectors = standard_detectors();
    for &altitude in &config.altitude_marks {
        detectors.push(Box::new(AltitudeMark::new(altitude)));
    }
    detectors
}
