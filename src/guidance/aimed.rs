use nalgebra::Vector3;

use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::{rotate_to_match, AngularRates};
use crate::pilot::TickContext;

use super::{braking_speed, split_direction, standoff_adjusted, Maneuver, Strategy, TaskParams};

/// Aims at the goal, then flies directly there, decelerating to arrive at
/// rest relative to it. Translation does not start until the aim converges;
/// until then the vehicle drifts along with the goal without closing
/// distance.
pub struct AimedFlightStrategy {
    pub params: TaskParams,
}

impl AimedFlightStrategy {
    pub fn new(goal: Goal) -> Self {
        Self {
            params: TaskParams::with_goal(goal),
        }
    }

    pub fn with_params(params: TaskParams) -> Self {
        Self { params }
    }
}

impl Strategy for AimedFlightStrategy {
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
        let (aim, raw_distance) = split_direction(goal_position - facing.position);
        // Standoff may flip the travel direction, but the nose still points
        // at the goal itself.
        let (direction, distance) = standoff_adjusted(aim, raw_distance, standoff);

        if distance <= self.params.position_epsilon {
            // Close enough that turning would only stir the final approach.
            return Ok(Maneuver {
                linear: goal_velocity,
                angular: AngularRates::ZERO,
                done: true,
            });
        }

        let (rates, divergence) =
            rotate_to_match(&aim, &Vector3::zeros(), &facing.forward, &facing.up);
        if divergence > self.params.orientation_epsilon {
            // Not pointed yet; pace the goal so the range holds steady.
            Ok(Maneuver {
                linear: goal_velocity,
                angular: rates,
                done: false,
            })
        } else {
            let speed = braking_speed(ctx, &direction, distance, &self.params);
            Ok(Maneuver {
                linear: direction * speed + goal_velocity,
                angular: AngularRates::ZERO,
                done: false,
            })
        }
    }

    fn name(&self) -> &str {
        "aimed-flight"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{context_at_rest, six_axis_thrust};
    use nalgebra::Vector3;

    #[test]
    fn paces_the_goal_while_still_turning() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        // Goal abeam: 90 degrees off the default +X forward.
        let goal = Goal::moving(Vector3::new(0.0, 500.0, 0.0), Vector3::new(0.0, 0.0, 4.0), "tgt");
        let mut strategy = AimedFlightStrategy::new(goal);
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done);
        assert!(!m.angular.is_zero(), "must be commanding rotation");
        assert_eq!(m.linear, Vector3::new(0.0, 0.0, 4.0), "exactly the goal's velocity");
    }

    #[test]
    fn translates_once_aim_converges() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        // Goal straight ahead along +X: already aimed.
        let mut strategy =
            AimedFlightStrategy::new(Goal::from_position(Vector3::new(500.0, 0.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(!m.done);
        assert!(m.angular.is_zero());
        assert!(m.linear.x > 0.0);
    }

    #[test]
    fn arrival_reports_done_without_turning() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        // Within epsilon, even though the goal sits behind the vehicle.
        let mut strategy =
            AimedFlightStrategy::new(Goal::from_position(Vector3::new(-0.05, 0.0, 0.0)));
        let m = strategy.update(&ctx).unwrap();
        assert!(m.done);
        assert!(m.angular.is_zero(), "no aiming this close in");
        assert_eq!(m.linear, Vector3::zeros());
    }

    #[test]
    fn standoff_backs_away_while_facing_the_goal() {
        let ctx = context_at_rest(100.0, &six_axis_thrust(1000.0));
        let mut goal = Goal::from_position(Vector3::new(10.0, 0.0, 0.0));
        goal.standoff = 50.0;
        let mut strategy = AimedFlightStrategy::new(goal);
        let m = strategy.update(&ctx).unwrap();
        assert!(m.angular.is_zero(), "nose already on the goal");
        assert!(m.linear.x < 0.0, "travel is away from the goal");
    }
}
