use nalgebra::Vector6;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665;

// ---------------------------------------------------------------------------
// Numeric state of the first-order system
// ---------------------------------------------------------------------------

/// State at a single point in time.
///
/// `coords` holds `(x, y, z, phi, theta, psi)` and `rates` the auxiliary
/// velocities `(a, b, c, d, e, f)`, in the order of the first-order system.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub time: f64,
    pub coords: Vector6<f64>,   // m, m, m, rad, rad, rad
    pub rates: Vector6<f64>,    // m/s, m/s, m/s, rad/s, rad/s, rad/s
}

impl State {
    pub fn new(time: f64, coords: Vector6<f64>, rates: Vector6<f64>) -> Self {
        Self { time, coords, rates }
    }

    pub fn apply(&self, d: &Deriv, dt: f64) -> State {
        State {
            time: self.time + dt,
            coords: self.coords + d.dcoords * dt,
            rates: self.rates + d.drates * dt,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.coords[2]
    }

    pub fn vertical_speed(&self) -> f64 {
        self.rates[2]
    }

    /// Translational speed from the auxiliary velocities.
    pub fn speed(&self) -> f64 {
        self.rates.fixed_rows::<3>(0).norm()
    }

    /// Nutation angle theta (rad), the tilt of the body axis from vertical.
    pub fn tilt(&self) -> f64 {
        self.coords[4]
    }

    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.coords.iter().all(|v| v.is_finite())
            && self.rates.iter().all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Deriv {
    pub dcoords: Vector6<f64>,
    pub drates: Vector6<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn apply_advances_time_and_vectors() {
        let s = State::new(1.0, Vector6::zeros(), Vector6::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0));
        let d = Deriv {
            dcoords: s.rates,
            drates: Vector6::new(0.0, 0.0, -G0, 0.0, 0.0, 0.0),
        };
        let next = s.apply(&d, 0.5);
        assert_relative_eq!(next.time, 1.5);
        assert_relative_eq!(next.coords[0], 1.5);
        assert_relative_eq!(next.coords[1], 2.0);
        assert_relative_eq!(next.vertical_speed(), -0.5 * G0);
        assert_relative_eq!(s.speed(), 5.0);
    }

    #[test]
    fn non_finite_detected() {
        let mut s = State::new(0.0, Vector6::zeros(), Vector6::zeros());
        assert!(s.is_finite());
        s.coords[4] = f64::NAN;
        assert!(!s.is_finite());
    }
}
