use nalgebra::Vector3;

use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::{rotate_to_match, AngularRates};
use crate::pilot::TickContext;

use super::{split_direction, Maneuver, Strategy, TaskParams};

/// Points the vehicle at the goal. Rotation only; never translates.
pub struct AimingStrategy {
    pub params: TaskParams,
}

impl AimingStrategy {
    pub fn new(goal: Goal) -> Self {
        Self {
            params: TaskParams::with_goal(goal),
        }
    }

    pub fn with_params(params: TaskParams) -> Self {
        Self { params }
    }
}

impl Strategy for AimingStrategy {
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
        let (direction, _) = split_direction(goal.current_position() - facing.position);
        let (rates, divergence) =
            rotate_to_match(&direction, &Vector3::zeros(), &facing.forward, &facing.up);
        if divergence < self.params.orientation_epsilon {
            Ok(Maneuver {
                linear: Vector3::zeros(),
                angular: AngularRates::ZERO,
                done: true,
            })
        } else {
            Ok(Maneuver {
                linear: Vector3::zeros(),
                angular: rates,
                done: false,
            })
        }
    }

    fn name(&self) -> &str {
        "aiming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::context_at_rest;

    #[test]
    fn aligned_reports_done_with_zero_command() {
        let ctx = context_at_rest(100.0, &[(Vector3::x(), 1000.0)]);
        // Goal straight ahead of the default frame's +X forward.
        let mut strategy = AimingStrategy::new(Goal::from_position(Vector3::new(50.0, 0.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(m.done);
        assert_eq!(m.linear, Vector3::zeros());
        assert!(m.angular.is_zero());
    }

    #[test]
    fn off_axis_goal_requests_rotation_only() {
        let ctx = context_at_rest(100.0, &[(Vector3::x(), 1000.0)]);
        let mut strategy = AimingStrategy::new(Goal::from_position(Vector3::new(0.0, 50.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done);
        assert_eq!(m.linear, Vector3::zeros(), "aiming never translates");
        assert!(!m.angular.is_zero());
    }

    #[test]
    fn missing_goal_drifts_forever() {
        let ctx = context_at_rest(100.0, &[(Vector3::x(), 1000.0)]);
        let mut strategy = AimingStrategy::with_params(TaskParams::without_goal());
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done, "a goal-less task never completes");
        assert_eq!(m.linear, ctx.linear_velocity);
    }
}
