use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, trace};
use nalgebra::Vector3;

use crate::device::{AttitudeActuator, AttitudeCommand, ForceActuator, PoseProvider};
use crate::error::PilotError;
use crate::frame::{Facing, Frame};
use crate::guidance::Strategy;
use crate::orientation::AngularRates;

// ---------------------------------------------------------------------------
// Tick snapshot
// ---------------------------------------------------------------------------

/// Frozen vehicle state handed to the active strategy for one tick. The
/// snapshot is taken once per [`AutoPilot::update`] call, so a strategy sees
/// consistent pose, velocity and mass even if the host updates them faster
/// than ticks occur.
#[derive(Debug, Clone)]
pub struct TickContext {
    pub frame: Frame,
    pub linear_velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
    /// Total vehicle mass, kg.
    pub mass: f64,
    /// Time since the previous tick, s.
    pub dt: f64,
    pub(crate) thrust_axes: Vec<ThrustAxis>,
}

/// Per-actuator capability sampled at the start of the tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ThrustAxis {
    pub(crate) direction: Vector3<f64>,
    pub(crate) max_force: f64,
}

impl TickContext {
    /// Time since the previous tick, ms (the unit [`crate::goal::Goal`]
    /// accumulates).
    pub fn elapsed_ms(&self) -> f64 {
        self.dt * 1000.0
    }

    /// How hard the vehicle can accelerate along `direction` without turning,
    /// m/s². Sums every working actuator's projection onto the direction;
    /// actuators pointing away contribute nothing.
    pub fn max_acceleration_for(&self, direction: &Vector3<f64>) -> f64 {
        let norm = direction.norm();
        if norm == 0.0 || self.mass <= 0.0 {
            return 0.0;
        }
        let dir = direction / norm;
        let mut force = 0.0;
        for axis in &self.thrust_axes {
            let projection = axis.direction.dot(&dir);
            if projection > 0.0 {
                force += axis.max_force * projection;
            }
        }
        force / self.mass
    }
}

// ---------------------------------------------------------------------------
// Gravity compensation
// ---------------------------------------------------------------------------

/// Which gravity reading, if any, the thrust allocator compensates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityMode {
    #[default]
    None,
    Natural,
    Artificial,
    Total,
}

// ---------------------------------------------------------------------------
// AutoPilot: the per-vehicle controller
// ---------------------------------------------------------------------------

/// Desired-velocity changes below this are treated as already achieved.
const DELTA_V_DEADBAND: f64 = 1e-3;

/// Owns the queue of guidance tasks for one vehicle and allocates actuator
/// commands to satisfy the head task. Call [`AutoPilot::update`] once per
/// control tick.
///
/// Actuator state is recomputed from scratch every tick; there is no
/// accumulated state, so pausing and resuming the controller is safe.
pub struct AutoPilot {
    tasks: VecDeque<Box<dyn Strategy>>,
    pose: Rc<RefCell<dyn PoseProvider>>,
    thrusters: Vec<Rc<RefCell<dyn ForceActuator>>>,
    gyros: Vec<Rc<RefCell<dyn AttitudeActuator>>>,
    /// Gravity term subtracted from the required-force vector.
    pub gravity: GravityMode,
    /// Keep the last remaining task alive after it reports done. Intended for
    /// station-keeping tasks that should run until a later task overrides
    /// them.
    pub repeat_last_task: bool,
}

impl AutoPilot {
    /// Builds the controller for one vehicle. The actuator lists must not be
    /// empty; a vehicle without force or attitude authority cannot be flown.
    pub fn new(
        pose: Rc<RefCell<dyn PoseProvider>>,
        thrusters: Vec<Rc<RefCell<dyn ForceActuator>>>,
        gyros: Vec<Rc<RefCell<dyn AttitudeActuator>>>,
    ) -> Result<Self, PilotError> {
        if thrusters.is_empty() {
            return Err(PilotError::NoForceActuators);
        }
        if gyros.is_empty() {
            return Err(PilotError::NoAttitudeActuators);
        }
        Ok(Self {
            tasks: VecDeque::new(),
            pose,
            thrusters,
            gyros,
            gravity: GravityMode::None,
            repeat_last_task: false,
        })
    }

    /// Append a task to the end of the queue.
    pub fn push_task(&mut self, task: Box<dyn Strategy>) {
        self.tasks.push_back(task);
    }

    /// Insert a task ahead of everything queued, overriding the current one.
    pub fn push_priority_task(&mut self, task: Box<dyn Strategy>) {
        self.tasks.push_front(task);
    }

    /// Abort every queued task. Actuator overrides keep their last commanded
    /// values until the next update or [`AutoPilot::release_overrides`].
    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Runs one control tick: snapshot the vehicle, query the head task, and
    /// allocate actuator commands for the velocities it requested. Returns
    /// true once all tasks have completed (an empty queue leaves the vehicle
    /// drifting; damping policy is mission-owned).
    pub fn update(&mut self, dt: f64) -> Result<bool, PilotError> {
        debug_assert!(dt > 0.0, "tick period must be positive");
        if self.tasks.is_empty() {
            return Ok(true);
        }

        let ctx = self.snapshot(dt);
        self.pose.borrow_mut().set_inertia_damping(false);

        let (maneuver, facing) = {
            let task = match self.tasks.front_mut() {
                Some(task) => task,
                None => return Ok(true),
            };
            let maneuver = task.update(&ctx)?;
            trace!(
                "task {}: done={} linear=({:.2},{:.2},{:.2})",
                task.name(),
                maneuver.done,
                maneuver.linear.x,
                maneuver.linear.y,
                maneuver.linear.z
            );
            (maneuver, task.facing(&ctx))
        };

        self.apply_rotation(&facing, &maneuver.angular);
        self.apply_thrust(&ctx, &maneuver.linear);

        if maneuver.done {
            let keep = self.repeat_last_task && self.tasks.len() == 1;
            if !keep {
                self.tasks.pop_front();
                debug!("task complete, {} remaining", self.tasks.len());
                if self.tasks.is_empty() {
                    // Hand the vehicle back to manual piloting.
                    self.pose.borrow_mut().set_inertia_damping(true);
                    self.release_overrides();
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Zeroes every force override and releases every attitude override.
    /// Useful to hand the vehicle back to manual control quickly; does not
    /// change the inertia-damping state.
    pub fn release_overrides(&mut self) {
        for thruster in &self.thrusters {
            thruster.borrow_mut().set_force(0.0);
        }
        for gyro in &self.gyros {
            gyro.borrow_mut().release();
        }
    }

    fn snapshot(&self, dt: f64) -> TickContext {
        let pose = self.pose.borrow();
        let thrust_axes = self
            .thrusters
            .iter()
            .filter(|t| t.borrow().is_working())
            .map(|t| {
                let t = t.borrow();
                ThrustAxis {
                    direction: t.thrust_direction(),
                    max_force: t.max_force(),
                }
            })
            .collect();
        TickContext {
            frame: pose.frame(),
            linear_velocity: pose.linear_velocity(),
            angular_velocity: pose.angular_velocity(),
            mass: pose.mass(),
            dt,
            thrust_axes,
        }
    }

    /// Remaps the requested rates from the task's facing axes into each
    /// attitude actuator's own frame. A zero request still commands every
    /// actuator, actively holding rotation at zero.
    fn apply_rotation(&self, facing: &Facing, rates: &AngularRates) {
        if rates.is_zero() {
            for gyro in &self.gyros {
                gyro.borrow_mut().apply(AttitudeCommand::default());
            }
            return;
        }
        let world =
            rates.pitch * facing.left() + rates.yaw * facing.up + rates.roll * facing.forward;
        for gyro in &self.gyros {
            let mut gyro = gyro.borrow_mut();
            if !gyro.is_working() {
                continue;
            }
            let local = gyro.frame().to_local(&world);
            gyro.apply(AttitudeCommand {
                pitch: local.y,
                yaw: local.z,
                roll: local.x,
            });
        }
    }

    /// Distributes the force needed to reach the requested velocity within
    /// one tick across the actuators able to push that way.
    fn apply_thrust(&self, ctx: &TickContext, target: &Vector3<f64>) {
        let delta_v = target - ctx.linear_velocity;
        let magnitude = delta_v.norm();
        if magnitude < DELTA_V_DEADBAND {
            for thruster in &self.thrusters {
                thruster.borrow_mut().set_force(0.0);
            }
            return;
        }

        let mut direction = delta_v / magnitude;
        // One tick to converge: stops the vehicle oscillating around the
        // target velocity without dragging out the response.
        let mut required = ctx.mass * magnitude / ctx.dt;

        let gravity = match self.gravity {
            GravityMode::None => Vector3::zeros(),
            GravityMode::Natural => self.pose.borrow().natural_gravity(),
            GravityMode::Artificial => self.pose.borrow().artificial_gravity(),
            GravityMode::Total => self.pose.borrow().total_gravity(),
        };
        if gravity != Vector3::zeros() {
            let compensated = direction * required - gravity * ctx.mass;
            required = compensated.norm();
            if required > 0.0 {
                direction = compensated / required;
            }
        }

        let mut weights = Vec::with_capacity(self.thrusters.len());
        let mut total = 0.0;
        for thruster in &self.thrusters {
            let thruster = thruster.borrow();
            let weight = if thruster.is_working() {
                let projection = thruster.thrust_direction().dot(&direction);
                if projection > 0.0 {
                    projection * thruster.max_force()
                } else {
                    0.0
                }
            } else {
                0.0
            };
            total += weight;
            weights.push(weight);
        }
        for (thruster, weight) in self.thrusters.iter().zip(weights) {
            let force = if total > 0.0 { required * weight / total } else { 0.0 };
            thruster.borrow_mut().set_force(force);
        }
    }
}
