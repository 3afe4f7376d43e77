use nalgebra::Vector3;

use crate::frame::{Axis6, Frame};

// ---------------------------------------------------------------------------
// Detection records
// ---------------------------------------------------------------------------

/// What a proximity or ranging sensor reports about one external object.
#[derive(Debug, Clone)]
pub struct Contact {
    /// Correlation id, stable across repeated detections of the same object.
    pub id: u64,
    pub name: String,
    pub kind: ContactKind,
    /// World position at detection time.
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Exact surface point a ranging scan hit, when available.
    pub hit_point: Option<Vector3<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Unknown,
    SmallVessel,
    LargeVessel,
    Station,
    Asteroid,
    Debris,
}

// ---------------------------------------------------------------------------
// Pose provider
// ---------------------------------------------------------------------------

/// Source of vehicle pose, velocity, mass and gravity. Pose data is read-only
/// to the core; the inertia-damping toggle is the one control the autopilot
/// exercises while it owns the vehicle.
pub trait PoseProvider {
    fn frame(&self) -> Frame;
    /// World-space linear velocity, m/s.
    fn linear_velocity(&self) -> Vector3<f64>;
    /// World-space angular velocity, rad/s.
    fn angular_velocity(&self) -> Vector3<f64>;
    /// Total vehicle mass, kg.
    fn mass(&self) -> f64;

    fn natural_gravity(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn artificial_gravity(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn total_gravity(&self) -> Vector3<f64> {
        self.natural_gravity() + self.artificial_gravity()
    }

    /// Built-in velocity-nulling assist. The autopilot turns it off while a
    /// task flies the vehicle and back on when the queue drains.
    fn set_inertia_damping(&mut self, enabled: bool);
}

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// One discrete directional force actuator (thruster).
pub trait ForceActuator {
    /// World-space direction of the force this actuator applies to the
    /// vehicle when fired.
    fn thrust_direction(&self) -> Vector3<f64>;
    /// Maximum effective force, N.
    fn max_force(&self) -> f64;
    fn is_working(&self) -> bool;
    /// Override the actuator to a fixed force. Zero returns it to neutral.
    fn set_force(&mut self, newtons: f64);
}

/// Per-channel rate override for one attitude actuator, expressed in that
/// actuator's own frame. Channel signs follow the orientation solver's
/// convention (see [`crate::orientation::rotate_to_match`]).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttitudeCommand {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// One discrete attitude-rate actuator (gyro, reaction wheel cluster).
pub trait AttitudeActuator {
    /// World orientation of the actuator; commands are remapped into it.
    fn frame(&self) -> Frame;
    fn is_working(&self) -> bool;
    /// Apply a rate override. A zero command actively holds rotation at zero.
    fn apply(&mut self, command: AttitudeCommand);
    /// Drop the override and return the actuator to manual control.
    fn release(&mut self);
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// An aimable long-range scanner that must charge up range over time.
pub trait RangingSensor {
    fn frame(&self) -> Frame;
    /// Half-angle of the cone the sensor can be aimed within, rad.
    fn cone_limit(&self) -> f64;
    /// Scan range banked per second of charging, m/s.
    fn charge_rate(&self) -> f64;
    fn is_working(&self) -> bool;
    /// Start banking range for future scans.
    fn start_charging(&mut self);
    /// Whether the given world point is currently resolvable.
    fn can_scan(&self, point: Vector3<f64>) -> bool;
    /// Scan toward the point. `None` means the ray hit nothing.
    fn scan(&mut self, point: Vector3<f64>) -> Option<Contact>;
}

/// Short-range detector returning every contact in its envelope.
pub trait ProximityDetector {
    fn contacts(&self) -> Vec<Contact>;
}

// ---------------------------------------------------------------------------
// Docking clamps
// ---------------------------------------------------------------------------

/// The concrete mechanism a docking actuator uses. Determines which of the
/// device's axes form the docking face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampKind {
    Connector,
    Coupler,
    LandingGear,
    RotorBase,
    RotorHead,
}

impl ClampKind {
    /// Device axes pointing out of the docking face and along its top.
    pub fn face_axes(self) -> (Axis6, Axis6) {
        match self {
            ClampKind::Connector => (Axis6::Forward, Axis6::Up),
            ClampKind::Coupler => (Axis6::Right, Axis6::Up),
            ClampKind::LandingGear => (Axis6::Down, Axis6::Forward),
            ClampKind::RotorBase => (Axis6::Up, Axis6::Forward),
            ClampKind::RotorHead => (Axis6::Down, Axis6::Forward),
        }
    }
}

/// Capability interface of a docking actuator. Implementations own their
/// enable/lock state machines; the docking strategy treats them as opaque.
pub trait DockingClamp {
    fn kind(&self) -> ClampKind;
    fn frame(&self) -> Frame;
    /// One lock attempt. `distance` is the current separation from the dock
    /// point; implementations may use it to gate auto-lock behavior. Powers
    /// the clamp up as needed. Returns true once locked.
    fn try_lock_in(&mut self, distance: f64) -> bool;
    fn unlock(&mut self);
    fn is_locked(&self) -> bool;
}
