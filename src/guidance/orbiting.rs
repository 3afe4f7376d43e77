use nalgebra::{Unit, Vector3};

use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::rotate_to_match;
use crate::pilot::TickContext;

use super::{split_direction, Maneuver, Strategy, TaskParams};

/// Default orbital speed, m/s. Much lower than the translation strategies:
/// circular motion from discrete thrusters degrades fast with speed.
const DEFAULT_ORBIT_SPEED: f64 = 10.0;

/// Circles the goal at its standoff radius, in the plane defined by the orbit
/// normal, nose on the goal. Station-keeping behavior: never reports done.
pub struct OrbitingStrategy {
    pub params: TaskParams,
    /// Unit normal of the orbital plane.
    pub normal: Unit<Vector3<f64>>,
}

impl OrbitingStrategy {
    /// The goal's standoff is the orbit radius and must be positive; the
    /// normal must be a usable direction.
    pub fn new(goal: Goal, normal: Vector3<f64>) -> Result<Self, PilotError> {
        if goal.standoff <= 0.0 {
            return Err(PilotError::NonPositiveOrbitRadius);
        }
        let normal =
            Unit::try_new(normal, f64::EPSILON).ok_or(PilotError::ZeroOrbitNormal)?;
        let mut params = TaskParams::with_goal(goal);
        params.max_linear_speed = DEFAULT_ORBIT_SPEED;
        Ok(Self { params, normal })
    }
}

impl Strategy for OrbitingStrategy {
    fn facing(&self, ctx: &TickContext) -> Facing {
        self.params.facing(ctx)
    }

    fn update(&mut self, ctx: &TickContext) -> Result<Maneuver, PilotError> {
        let facing = self.params.facing(ctx);
        let goal = match self.params.goal.as_mut() {
            Some(goal) => goal,
            None => return Ok(Maneuver::drift(ctx)),
        };
        goal.advance(ctx.elapsed_ms());
        let (radial, range) = split_direction(goal.current_position() - facing.position);
        let (tangent, _) = split_direction(self.normal.cross(&radial));
        // Tangential motion plus a radial term proportional to radius error,
        // riding on the goal's own velocity.
        let linear = goal.velocity()
            + tangent * self.params.max_linear_speed
            + radial * (range - goal.standoff);
        // Face the goal, roof along the orbit normal.
        let (rates, _) =
            rotate_to_match(&radial, &self.normal.into_inner(), &facing.forward, &facing.up);
        Ok(Maneuver {
            linear,
            angular: rates,
            done: false,
        })
    }

    fn name(&self) -> &str {
        "orbiting"
    }
}
