use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Unit, Vector3};

use crate::device::DockingClamp;
use crate::error::PilotError;
use crate::frame::Facing;
use crate::goal::Goal;
use crate::orientation::{rotate_to_match, AngularRates};
use crate::pilot::TickContext;

use super::{braking_speed, split_direction, Maneuver, Strategy, TaskParams};

/// Default docking closure speed, m/s. Contact hardware sets the limit here,
/// not thrust authority.
const DEFAULT_DOCKING_SPEED: f64 = 2.0;

/// Brings the vehicle's docking clamp onto a counterpart and locks in.
///
/// With a non-zero approach vector the clamp face is aimed along it and the
/// vehicle first steers onto the corridor through the goal before closing,
/// so the final contact is square. With a zero approach vector the vehicle
/// flies straight at the goal, which may dock crooked or not at all.
pub struct DockingStrategy {
    pub params: TaskParams,
    clamp: Rc<RefCell<dyn DockingClamp>>,
    /// World direction of final closure, unit or zero.
    approach: Vector3<f64>,
    /// World direction the clamp's top should take, zero leaves roll free.
    facing_up: Vector3<f64>,
}

impl DockingStrategy {
    /// `approach` is the world direction of final closure (zero disables the
    /// corridor); `facing_up` optionally pins the roll of the docking face.
    pub fn new(
        goal: Goal,
        clamp: Rc<RefCell<dyn DockingClamp>>,
        approach: Vector3<f64>,
        facing_up: Option<Vector3<f64>>,
    ) -> Self {
        let (forward, up) = clamp.borrow().kind().face_axes();
        let mut params = TaskParams::with_goal(goal);
        params.forward = forward;
        params.up = up;
        params.max_linear_speed = DEFAULT_DOCKING_SPEED;
        let approach = Unit::try_new(approach, f64::EPSILON)
            .map(Unit::into_inner)
            .unwrap_or_else(Vector3::zeros);
        Self {
            params,
            clamp,
            approach,
            facing_up: facing_up.unwrap_or_else(Vector3::zeros),
        }
    }

    /// Dock point and outward approach vector of a counterpart clamp, from
    /// its own pose and kind. For wiring up the accepting side.
    pub fn approach_of(clamp: &dyn DockingClamp) -> (Vector3<f64>, Vector3<f64>) {
        let frame = clamp.frame();
        let (face, _) = clamp.kind().face_axes();
        (frame.position, -frame.axis(face))
    }

    pub fn unlock(&self) {
        self.clamp.borrow_mut().unlock();
    }

    pub fn is_locked(&self) -> bool {
        self.clamp.borrow().is_locked()
    }
}

impl Strategy for DockingStrategy {
    /// The clamp's own pose, not the primary one: docking geometry is about
    /// where the clamp face is.
    fn facing(&self, _ctx: &TickContext) -> Facing {
        self.clamp
            .borrow()
            .frame()
            .facing(self.params.forward, self.params.up)
    }

    fn update(&mut self, ctx: &TickContext) -> Result<Maneuver, PilotError> {
        let facing = self.facing(ctx);
        let (goal_position, goal_velocity) = match self.params.goal.as_mut() {
            Some(goal) => {
                goal.advance(ctx.elapsed_ms());
                (goal.current_position(), goal.velocity())
            }
            None => return Ok(Maneuver::drift(ctx)),
        };
        let (mut direction, mut distance) = split_direction(goal_position - facing.position);
        let separation = distance;

        let (rates, divergence) = if self.approach != Vector3::zeros() {
            // Aim the clamp face along the approach vector, then steer onto
            // the corridor through the goal before closing along it.
            let aim = rotate_to_match(&self.approach, &self.facing_up, &facing.forward, &facing.up);
            let offset = facing.position - goal_position;
            let corridor_point =
                goal_position + self.approach * offset.dot(&self.approach);
            let correction = corridor_point - facing.position;
            if correction.norm() > self.params.position_epsilon {
                let (dir, dist) = split_direction(correction);
                direction = dir;
                distance = dist;
            }
            aim
        } else {
            rotate_to_match(&direction, &self.facing_up, &facing.forward, &facing.up)
        };

        let (linear, angular) = if divergence > self.params.orientation_epsilon {
            (goal_velocity, rates)
        } else {
            let speed = braking_speed(ctx, &direction, distance, &self.params);
            (direction * speed + goal_velocity, AngularRates::ZERO)
        };

        // A lock attempt runs every tick; the clamp decides when it can bite.
        let locked = self.clamp.borrow_mut().try_lock_in(separation);
        Ok(Maneuver {
            linear,
            angular,
            done: locked || separation < self.params.position_epsilon,
        })
    }

    fn name(&self) -> &str {
        "docking"
    }
}
