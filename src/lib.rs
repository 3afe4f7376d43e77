//! Guidance, control and mission sequencing for free-flying 6DOF vehicles
//! actuated by discrete thrusters and gyros.

pub mod device;
pub mod error;
pub mod frame;
pub mod goal;
pub mod guidance;
pub mod mission;
pub mod orientation;
pub mod pilot;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{MissionError, PilotError};
pub use goal::Goal;
pub use guidance::{
    AimedFlightStrategy, AimingStrategy, DockingStrategy, FlyForwardStrategy, Maneuver,
    OrbitingStrategy, RammingStrategy, Strategy, TaskParams, UnaimedFlightStrategy,
};
pub use mission::{MissionStateMachine, MissionStep, StepSignal};
pub use pilot::{AutoPilot, GravityMode, TickContext};
