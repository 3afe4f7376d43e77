use nalgebra::Vector3;

use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::{rotate_to_match, AngularRates};
use crate::pilot::TickContext;

use super::{split_direction, Maneuver, Strategy, TaskParams};

/// Aims at the goal and flies there flat out, turning and translating at the
/// same time. Never slows down and ignores the goal's standoff; intended for
/// deliberate contact.
pub struct RammingStrategy {
    pub params: TaskParams,
}

impl RammingStrategy {
    pub fn new(goal: Goal) -> Self {
        Self {
            params: TaskParams::with_goal(goal),
        }
    }

    pub fn with_params(params: TaskParams) -> Self {
        Self { params }
    }
}

impl Strategy for RammingStrategy {
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
        let (direction, distance) = split_direction(goal.current_position() - facing.position);
        let linear = direction * self.params.max_linear_speed + goal.velocity();
        let (rates, divergence) =
            rotate_to_match(&direction, &Vector3::zeros(), &facing.forward, &facing.up);
        let aimed = divergence < self.params.orientation_epsilon;
        Ok(Maneuver {
            linear,
            angular: if aimed { AngularRates::ZERO } else { rates },
            done: aimed && distance < self.params.position_epsilon,
        })
    }

    fn name(&self) -> &str {
        "ramming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{context_at_rest, six_axis_thrust};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn charges_at_full_speed_while_turning() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        let mut strategy =
            RammingStrategy::new(Goal::from_position(Vector3::new(0.0, 300.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done);
        assert!(!m.angular.is_zero(), "turns while already moving");
        assert_relative_eq!(m.linear.norm(), strategy.params.max_linear_speed);
        assert!(m.linear.y > 0.0);
    }

    #[test]
    fn never_slows_on_final_approach() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        // One metre out and dead ahead: still commands full speed.
        let mut strategy = RammingStrategy::new(Goal::from_position(Vector3::new(1.0, 0.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done);
        assert_relative_eq!(m.linear.x, strategy.params.max_linear_speed);
    }

    #[test]
    fn done_requires_contact_and_alignment() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        let mut strategy =
            RammingStrategy::new(Goal::from_position(Vector3::new(0.05, 0.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(m.done, "aligned and within epsilon of the goal");
        assert!(m.angular.is_zero());
    }
}
