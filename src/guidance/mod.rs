use nalgebra::Vector3;

use crate::error::PilotError;
use crate::frame::{Axis6, Facing};
use crate::goal::Goal;
use crate::orientation::AngularRates;
use crate::pilot::TickContext;

mod aimed;
mod aiming;
mod docking;
mod fly_forward;
mod orbiting;
mod ramming;
mod unaimed;

pub use aimed::AimedFlightStrategy;
pub use aiming::AimingStrategy;
pub use docking::DockingStrategy;
pub use fly_forward::FlyForwardStrategy;
pub use orbiting::OrbitingStrategy;
pub use ramming::RammingStrategy;
pub use unaimed::UnaimedFlightStrategy;

// ---------------------------------------------------------------------------
// Strategy contract
// ---------------------------------------------------------------------------

/// What one guidance tick asks of the vehicle.
#[derive(Debug, Clone, Copy)]
pub struct Maneuver {
    /// Desired world-space linear velocity, m/s.
    pub linear: Vector3<f64>,
    /// Desired rate command around the task's facing axes.
    pub angular: AngularRates,
    /// Whether the goal is considered achieved.
    pub done: bool,
}

impl Maneuver {
    /// Keep the current velocity and attitude untouched; nothing to do this
    /// tick. Used by strategies whose goal is absent.
    pub fn drift(ctx: &TickContext) -> Self {
        Self {
            linear: ctx.linear_velocity,
            angular: AngularRates::ZERO,
            done: false,
        }
    }
}

/// One guidance law: vehicle state plus a goal in, velocity request out.
///
/// Implement this to create custom strategies that can be queued on the
/// [`crate::pilot::AutoPilot`] alongside the built-in ones.
pub trait Strategy {
    /// The frame this task steers by: the primary pose with the task's
    /// forward/up axis selection applied, or a device's own pose.
    fn facing(&self, ctx: &TickContext) -> Facing;

    /// Runs one guidance increment. Fatal capability errors propagate;
    /// transient conditions report "not done".
    fn update(&mut self, ctx: &TickContext) -> Result<Maneuver, PilotError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Shared tunables
// ---------------------------------------------------------------------------

/// Tunables common to every guidance law.
#[derive(Debug)]
pub struct TaskParams {
    /// Goal to pursue. An absent goal makes the strategy do nothing while
    /// still reporting its task as incomplete.
    pub goal: Option<Goal>,
    /// Which body axes define the vehicle's facing for this task.
    pub forward: Axis6,
    pub up: Axis6,
    /// Speed ceiling relative to the goal, m/s.
    pub max_linear_speed: f64,
    /// Divergence below which orientation counts as converged.
    pub orientation_epsilon: f64,
    /// Residual distance below which position counts as reached, m.
    pub position_epsilon: f64,
    /// How close to the maximum still-stoppable speed we are allowed to get,
    /// in (0, 1].
    pub velocity_usage: f64,
}

impl TaskParams {
    /// Validates the axis pair; everything else takes the default tuning.
    pub fn new(goal: Option<Goal>, forward: Axis6, up: Axis6) -> Result<Self, PilotError> {
        if !Axis6::is_valid_pair(forward, up) {
            return Err(PilotError::InvalidAxisPair { forward, up });
        }
        let mut params = Self::defaults(goal);
        params.forward = forward;
        params.up = up;
        Ok(params)
    }

    pub fn with_goal(goal: Goal) -> Self {
        Self::defaults(Some(goal))
    }

    pub fn without_goal() -> Self {
        Self::defaults(None)
    }

    fn defaults(goal: Option<Goal>) -> Self {
        Self {
            goal,
            forward: Axis6::Forward,
            up: Axis6::Up,
            max_linear_speed: 100.0,
            orientation_epsilon: 1e-4,
            position_epsilon: 0.1,
            velocity_usage: 0.9,
        }
    }

    pub(crate) fn facing(&self, ctx: &TickContext) -> Facing {
        ctx.frame.facing(self.forward, self.up)
    }
}

// ---------------------------------------------------------------------------
// Shared kinematics
// ---------------------------------------------------------------------------

/// Fastest speed we may hold toward a point `distance` away and still stop
/// there: a fraction of the kinematic limit, capped by the configured ceiling
/// and by the raw distance itself (which drives the command to zero on final
/// approach, avoiding oscillation).
pub fn braking_speed(
    ctx: &TickContext,
    approach: &Vector3<f64>,
    distance: f64,
    params: &TaskParams,
) -> f64 {
    let decel = ctx.max_acceleration_for(&-approach);
    if decel <= 0.0 {
        // No stopping authority along this approach; don't commit to motion.
        return 0.0;
    }
    let braking_time = (2.0 * distance / decel).sqrt();
    (params.velocity_usage * decel * braking_time)
        .min(params.max_linear_speed)
        .min(distance)
}

/// Splits a displacement into unit direction and length. Zero stays zero.
pub(crate) fn split_direction(v: Vector3<f64>) -> (Vector3<f64>, f64) {
    let len = v.norm();
    if len > 0.0 {
        (v / len, len)
    } else {
        (Vector3::zeros(), 0.0)
    }
}

/// Direction and residual distance once the goal's standoff is applied.
/// Inside the standoff radius the direction flips outward and the residual is
/// the "too close" amount.
pub(crate) fn standoff_adjusted(
    direction: Vector3<f64>,
    distance: f64,
    standoff: f64,
) -> (Vector3<f64>, f64) {
    if distance < standoff {
        (-direction, standoff - distance)
    } else {
        (direction, distance - standoff)
    }
}
