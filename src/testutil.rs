//! Shared test doubles for the device traits, plus tick-context builders.

use std::cell::RefCell;
use std::f64::consts::FRAC_PI_4;
use std::rc::Rc;

use nalgebra::{UnitQuaternion, Vector3};

use crate::device::{
    AttitudeActuator, AttitudeCommand, ClampKind, Contact, ContactKind, DockingClamp,
    ForceActuator, PoseProvider, ProximityDetector, RangingSensor,
};
use crate::frame::Frame;
use crate::pilot::{ThrustAxis, TickContext};

pub(crate) fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

/// Detection record with the given id, no hit point, unknown kind.
pub(crate) fn contact(id: u64, position: Vector3<f64>, velocity: Vector3<f64>) -> Contact {
    Contact {
        id,
        name: format!("contact-{id}"),
        kind: ContactKind::Unknown,
        position,
        velocity,
        hit_point: None,
    }
}

/// Axis-aligned thruster layout with the same force on all six directions.
pub(crate) fn six_axis_thrust(force: f64) -> Vec<(Vector3<f64>, f64)> {
    vec![
        (Vector3::x(), force),
        (-Vector3::x(), force),
        (Vector3::y(), force),
        (-Vector3::y(), force),
        (Vector3::z(), force),
        (-Vector3::z(), force),
    ]
}

/// Tick snapshot for a vehicle at rest in the identity frame, with the given
/// thrust capability.
pub(crate) fn context_at_rest(mass: f64, thrusters: &[(Vector3<f64>, f64)]) -> TickContext {
    TickContext {
        frame: Frame::default(),
        linear_velocity: Vector3::zeros(),
        angular_velocity: Vector3::zeros(),
        mass,
        dt: 0.1,
        thrust_axes: thrusters
            .iter()
            .map(|&(direction, max_force)| ThrustAxis {
                direction,
                max_force,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

pub(crate) struct FixedPose {
    pub frame: Frame,
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
    pub mass: f64,
    pub gravity: Vector3<f64>,
    pub damping: bool,
}

impl FixedPose {
    pub fn at_rest(mass: f64) -> Self {
        Self {
            frame: Frame::default(),
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
            mass,
            gravity: Vector3::zeros(),
            damping: true,
        }
    }
}

impl PoseProvider for FixedPose {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn linear_velocity(&self) -> Vector3<f64> {
        self.linear
    }

    fn angular_velocity(&self) -> Vector3<f64> {
        self.angular
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn natural_gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    fn set_inertia_damping(&mut self, enabled: bool) {
        self.damping = enabled;
    }
}

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

pub(crate) struct TestThruster {
    pub direction: Vector3<f64>,
    pub max_force: f64,
    pub working: bool,
    /// Last force override received, N.
    pub commanded: f64,
}

impl TestThruster {
    pub fn along(direction: Vector3<f64>, max_force: f64) -> Self {
        Self {
            direction,
            max_force,
            working: true,
            commanded: 0.0,
        }
    }
}

impl ForceActuator for TestThruster {
    fn thrust_direction(&self) -> Vector3<f64> {
        self.direction
    }

    fn max_force(&self) -> f64 {
        self.max_force
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn set_force(&mut self, newtons: f64) {
        self.commanded = newtons;
    }
}

pub(crate) struct TestGyro {
    pub frame: Frame,
    pub working: bool,
    pub last: Option<AttitudeCommand>,
    pub released: bool,
}

impl TestGyro {
    pub fn rotated(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            frame: Frame::new(Vector3::zeros(), rotation),
            ..Self::default()
        }
    }
}

impl Default for TestGyro {
    fn default() -> Self {
        Self {
            frame: Frame::default(),
            working: true,
            last: None,
            released: false,
        }
    }
}

impl AttitudeActuator for TestGyro {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn apply(&mut self, command: AttitudeCommand) {
        self.last = Some(command);
        self.released = false;
    }

    fn release(&mut self) {
        self.released = true;
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

pub(crate) struct TestCamera {
    pub frame: Frame,
    pub cone: f64,
    pub rate: f64,
    pub working: bool,
    pub charging: bool,
    /// Whether `can_scan` currently answers yes.
    pub can: bool,
    /// What the next scan returns.
    pub result: Option<Contact>,
    /// Every probe point scanned so far.
    pub scanned: Vec<Vector3<f64>>,
}

impl Default for TestCamera {
    fn default() -> Self {
        Self {
            frame: Frame::default(),
            cone: FRAC_PI_4,
            rate: 2000.0,
            working: true,
            charging: false,
            can: true,
            result: None,
            scanned: Vec::new(),
        }
    }
}

impl TestCamera {
    pub fn mounted(self, frame: Frame) -> Self {
        Self { frame, ..self }
    }

    pub fn cannot_resolve(self) -> Self {
        Self { can: false, ..self }
    }

    pub fn resolving(self, contact: Contact) -> Self {
        Self {
            result: Some(contact),
            ..self
        }
    }
}

impl RangingSensor for TestCamera {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn cone_limit(&self) -> f64 {
        self.cone
    }

    fn charge_rate(&self) -> f64 {
        self.rate
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn start_charging(&mut self) {
        self.charging = true;
    }

    fn can_scan(&self, _point: Vector3<f64>) -> bool {
        self.can
    }

    fn scan(&mut self, point: Vector3<f64>) -> Option<Contact> {
        self.scanned.push(point);
        self.result.clone()
    }
}

pub(crate) struct TestDetector {
    pub list: Vec<Contact>,
}

impl ProximityDetector for TestDetector {
    fn contacts(&self) -> Vec<Contact> {
        self.list.clone()
    }
}

// ---------------------------------------------------------------------------
// Docking clamp
// ---------------------------------------------------------------------------

pub(crate) struct TestClamp {
    pub kind: ClampKind,
    pub frame: Frame,
    /// Separations below this succeed on the next lock attempt.
    pub lock_within: f64,
    pub locked: bool,
    pub attempts: usize,
}

impl TestClamp {
    pub fn new(kind: ClampKind) -> Self {
        Self {
            kind,
            frame: Frame::default(),
            lock_within: 0.0,
            locked: false,
            attempts: 0,
        }
    }

    pub fn locking_within(self, distance: f64) -> Self {
        Self {
            lock_within: distance,
            ..self
        }
    }
}

impl DockingClamp for TestClamp {
    fn kind(&self) -> ClampKind {
        self.kind
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn try_lock_in(&mut self, distance: f64) -> bool {
        self.attempts += 1;
        if distance < self.lock_within {
            self.locked = true;
        }
        self.locked
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}
