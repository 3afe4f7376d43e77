use thiserror::Error;

use crate::frame::Axis6;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal guidance errors: bad configuration caught at construction, or a
/// missing capability caught on first update. Transient conditions (a sensor
/// that cannot resolve a scan, a goal that is momentarily unobservable) are
/// never errors; strategies simply report "not done" and retry next tick.
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("forward axis {forward:?} and up axis {up:?} are not orthogonal")]
    InvalidAxisPair { forward: Axis6, up: Axis6 },

    #[error("'{0}' is not a valid GPS string")]
    BadGps(String),

    #[error("autopilot has no force actuators")]
    NoForceActuators,

    #[error("autopilot has no attitude actuators")]
    NoAttitudeActuators,

    #[error("orbit radius must be above zero")]
    NonPositiveOrbitRadius,

    #[error("orbit plane normal must not be zero")]
    ZeroOrbitNormal,

    #[error("no ranging sensor covers the flight direction")]
    CannotScan,

    #[error("no braking thrust along the flight direction")]
    CannotBrake,
}

/// Fatal mission-sequencer defects. Mission-level aborts (lost target, fuel
/// threshold) are policy, expressed as state transitions, and never appear
/// here.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("no step factory registered for state '{0}'")]
    UnknownState(String),

    #[error("state '{0}' finished without signalling a transition")]
    MissingSignal(String),
}
