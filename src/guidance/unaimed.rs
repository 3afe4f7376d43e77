use log::trace;
use nalgebra::Vector3;

use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::AngularRates;
use crate::pilot::TickContext;

use super::{braking_speed, split_direction, standoff_adjusted, Maneuver, Strategy, TaskParams};

/// Flies straight to the goal, ignoring vehicle orientation entirely. No
/// collision avoidance.
pub struct UnaimedFlightStrategy {
    pub params: TaskParams,
}

impl UnaimedFlightStrategy {
    pub fn new(goal: Goal) -> Self {
        Self {
            params: TaskParams::with_goal(goal),
        }
    }

    pub fn with_params(params: TaskParams) -> Self {
        Self { params }
    }
}

impl Strategy for UnaimedFlightStrategy {
    fn facing(&self, ctx: &TickContext) -> Facing {
        self.params.facing(ctx)
    }

    fn update(&mut self, ctx: &TickContext) -> Result<Maneuver, PilotError> {
        let facing = self.params.facing(ctx);
        let (goal_position, goal_velocity, standoff) = match self.params.goal.as_mut() {
            Some(goal) => {
                goal.advance(ctx.elapsed_ms());
                (goal.current_position(), goal.velocity(), goal.standoff)
            }
            None => return Ok(Maneuver::drift(ctx)),
        };
        let (direction, distance) = split_direction(goal_position - facing.position);
        let (direction, distance) = standoff_adjusted(direction, distance, standoff);

        let linear = if distance > self.params.position_epsilon {
            direction * braking_speed(ctx, &direction, distance, &self.params) + goal_velocity
        } else {
            trace!("target position reached");
            Vector3::zeros()
        };
        Ok(Maneuver {
            linear,
            angular: AngularRates::ZERO,
            done: linear == Vector3::zeros(),
        })
    }

    fn name(&self) -> &str {
        "unaimed-flight"
    }
}
