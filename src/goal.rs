use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::device::{Contact, ProximityDetector, RangingSensor};
use crate::error::PilotError;

// ---------------------------------------------------------------------------
// Goal: tracked target with time extrapolation
// ---------------------------------------------------------------------------

/// A target for the autopilot: a fixed point in world space, or a moving
/// contact whose position is extrapolated from its last observation.
#[derive(Debug, Clone)]
pub struct Goal {
    name: String,
    /// Position at the time of the last observation.
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    /// Time since the last observation, ms.
    elapsed_ms: f64,
    /// Separation to keep from the raw target position, m.
    pub standoff: f64,
    entity_id: Option<u64>,
}

impl Goal {
    /// Stationary goal from a GPS string, e.g. `"GPS:Pad A:59.55:-11.63:-22.81:"`.
    pub fn from_coordinates(gps: &str) -> Result<Self, PilotError> {
        gps.parse()
    }

    /// Stationary goal at a literal world position.
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::moving(position, Vector3::zeros(), "Location")
    }

    /// Goal with an explicit velocity.
    pub fn moving(position: Vector3<f64>, velocity: Vector3<f64>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            velocity,
            elapsed_ms: 0.0,
            standoff: 0.0,
            entity_id: None,
        }
    }

    /// Goal tracking a detected contact.
    pub fn from_contact(contact: &Contact) -> Self {
        let mut goal = Self::moving(contact.position, contact.velocity, contact.name.clone());
        goal.entity_id = Some(contact.id);
        goal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last observed velocity.
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    /// Correlation id of the tracked contact, if any.
    pub fn entity_id(&self) -> Option<u64> {
        self.entity_id
    }

    /// Replace the observation with a fresh detection and reset elapsed time.
    pub fn update(&mut self, contact: &Contact) {
        self.entity_id = Some(contact.id);
        self.name = contact.name.clone();
        self.position = contact.position;
        self.velocity = contact.velocity;
        self.elapsed_ms = 0.0;
    }

    /// Accumulate time since the last observation.
    pub fn advance(&mut self, milliseconds: f64) {
        self.elapsed_ms += milliseconds;
    }

    /// Extrapolated position. A zero-velocity goal is returned exactly as
    /// observed, so stationary waypoints never accumulate drift.
    pub fn current_position(&self) -> Vector3<f64> {
        if self.velocity == Vector3::zeros() {
            self.position
        } else {
            self.position + self.velocity * (self.elapsed_ms / 1000.0)
        }
    }

    /// Default reacquisition matcher: same correlation id as the last
    /// observation. A goal that never came from a detection matches nothing.
    pub fn matches(&self, contact: &Contact) -> bool {
        self.entity_id == Some(contact.id)
    }

    /// Query proximity detectors for the tracked target. `selector` overrides
    /// the default id matcher. Returns true if the goal was refreshed.
    pub fn reacquire_from(
        &mut self,
        detectors: &[Rc<RefCell<dyn ProximityDetector>>],
        selector: Option<&dyn Fn(&Contact) -> bool>,
    ) -> bool {
        for detector in detectors {
            for contact in detector.borrow().contacts() {
                if selector.map_or_else(|| self.matches(&contact), |s| s(&contact)) {
                    self.update(&contact);
                    return true;
                }
            }
        }
        false
    }

    /// Aim ranging sensors at the extrapolated position estimate and scan for
    /// the tracked target. Returns true if the goal was refreshed.
    pub fn reacquire_by_scan(
        &mut self,
        sensors: &[Rc<RefCell<dyn RangingSensor>>],
        selector: Option<&dyn Fn(&Contact) -> bool>,
    ) -> bool {
        let estimate = self.current_position();
        for sensor in sensors {
            let mut sensor = sensor.borrow_mut();
            sensor.start_charging();
            if !sensor.can_scan(estimate) {
                continue;
            }
            if let Some(contact) = sensor.scan(estimate) {
                if selector.map_or_else(|| self.matches(&contact), |s| s(&contact)) {
                    self.update(&contact);
                    return true;
                }
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// GPS text round-trip
// ---------------------------------------------------------------------------

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.current_position();
        write!(f, "GPS:{}:{:.2}:{:.2}:{:.2}:", self.name, p.x, p.y, p.z)
    }
}

impl FromStr for Goal {
    type Err = PilotError;

    /// Parses `"GPS:<name>:<x>:<y>:<z>:"`. The name may not contain colons;
    /// malformed input is an error, never a silent zero.
    fn from_str(s: &str) -> Result<Self, PilotError> {
        let bad = || PilotError::BadGps(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 || parts[0] != "GPS" || !parts[5].is_empty() {
            return Err(bad());
        }
        let x: f64 = parts[2].parse().map_err(|_| bad())?;
        let y: f64 = parts[3].parse().map_err(|_| bad())?;
        let z: f64 = parts[4].parse().map_err(|_| bad())?;
        Ok(Goal::moving(Vector3::new(x, y, z), Vector3::zeros(), parts[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ContactKind;
    use crate::testutil::{contact, TestDetector};
    use approx::assert_relative_eq;

    #[test]
    fn stationary_goal_never_drifts() {
        let mut goal = Goal::from_position(Vector3::new(1.0, 2.0, 3.0));
        for _ in 0..100 {
            goal.advance(16.0);
        }
        assert_eq!(goal.current_position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn moving_goal_extrapolates_by_elapsed_time() {
        let mut goal = Goal::moving(Vector3::zeros(), Vector3::new(10.0, 0.0, -5.0), "tgt");
        for _ in 0..4 {
            goal.advance(250.0); // 1 s total
        }
        let p = goal.current_position();
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn update_resets_elapsed_time() {
        let mut goal = Goal::moving(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0), "tgt");
        goal.advance(5000.0);
        goal.update(&contact(7, Vector3::new(100.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)));
        assert_relative_eq!(goal.current_position().x, 100.0);
        assert_eq!(goal.entity_id(), Some(7));
    }

    #[test]
    fn gps_round_trip_to_two_decimals() {
        let goal = Goal::moving(Vector3::new(59.554, -11.635, -22.815), Vector3::zeros(), "Pad A");
        let parsed = Goal::from_coordinates(&goal.to_string()).unwrap();
        let p = parsed.current_position();
        assert_relative_eq!(p.x, 59.554, epsilon = 6e-3);
        assert_relative_eq!(p.y, -11.635, epsilon = 6e-3);
        assert_relative_eq!(p.z, -22.815, epsilon = 6e-3);
        assert_eq!(parsed.name(), "Pad A");
    }

    #[test]
    fn malformed_gps_is_rejected() {
        for bad in [
            "GPS:OnlyTwoFields:1:2:",
            "GPS:name:1:2:not_a_number:",
            "WP:name:1:2:3:",
            "GPS:name:1:2:3",
            "",
        ] {
            assert!(
                Goal::from_coordinates(bad).is_err(),
                "'{bad}' should fail to parse"
            );
        }
    }

    #[test]
    fn default_matcher_requires_same_id() {
        let tracked = contact(42, Vector3::zeros(), Vector3::zeros());
        let goal = Goal::from_contact(&tracked);
        assert!(goal.matches(&tracked));
        assert!(!goal.matches(&contact(43, Vector3::zeros(), Vector3::zeros())));
        // A literal waypoint matches no detection by default.
        let literal = Goal::from_position(Vector3::zeros());
        assert!(!literal.matches(&tracked));
    }

    #[test]
    fn reacquire_uses_selector_override() {
        let mut goal = Goal::from_position(Vector3::zeros());
        let mut near = contact(9, Vector3::new(5.0, 0.0, 0.0), Vector3::zeros());
        near.kind = ContactKind::Station;
        let detector: Rc<RefCell<dyn ProximityDetector>> =
            Rc::new(RefCell::new(TestDetector { list: vec![near] }));
        // Default matcher refuses an unknown id…
        assert!(!goal.reacquire_from(std::slice::from_ref(&detector), None));
        // …but a caller-supplied predicate may accept it.
        let any_station = |c: &Contact| c.kind == ContactKind::Station;
        assert!(goal.reacquire_from(std::slice::from_ref(&detector), Some(&any_station)));
        assert_eq!(goal.entity_id(), Some(9));
    }
}
