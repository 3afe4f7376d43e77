use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use nalgebra::Vector3;

use crate::device::RangingSensor;
use crate::error::PilotError;
use crate::frame::Facing;
use crate::orientation::AngularRates;
use crate::pilot::TickContext;

use super::{braking_speed, split_direction, Maneuver, Strategy, TaskParams};

/// Scan lookahead never drops below this, m. Short lookaheads waste sensor
/// charge re-scanning terrain the vehicle has already cleared.
const MIN_SCAN_DISTANCE: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Open-loop cruise along the forward axis, scanning ahead.
    Cruising,
    /// An obstacle was found; braking onto the clearance point before it.
    Stopping { stop_point: Vector3<f64> },
}

/// Flies along the vehicle's own forward axis at full speed until a ranging
/// scan finds something in the way, then stops short of it by the configured
/// clearance. The scan lookahead is sized so a fresh detection always leaves
/// room to brake. With nothing ahead the task never completes; mission code
/// is expected to bound it.
pub struct FlyForwardStrategy {
    pub params: TaskParams,
    /// Gap to leave between the vehicle and the obstacle surface, m.
    clearance: f64,
    sensors: Vec<Rc<RefCell<dyn RangingSensor>>>,
    phase: Phase,
}

impl FlyForwardStrategy {
    pub fn new(clearance: f64, sensors: Vec<Rc<RefCell<dyn RangingSensor>>>) -> Self {
        Self {
            params: TaskParams::without_goal(),
            clearance,
            sensors,
            phase: Phase::Cruising,
        }
    }

    /// Whether the sensor can be pointed down the given axis at all.
    fn covers(sensor: &dyn RangingSensor, forward: &Vector3<f64>) -> bool {
        sensor.is_working()
            && sensor.frame().forward().dot(forward) > sensor.cone_limit().cos()
    }

    fn approach(&self, ctx: &TickContext, stop_point: Vector3<f64>) -> Maneuver {
        let facing = self.params.facing(ctx);
        let (direction, distance) = split_direction(stop_point - facing.position);
        if distance <= self.params.position_epsilon {
            Maneuver {
                linear: Vector3::zeros(),
                angular: AngularRates::ZERO,
                done: true,
            }
        } else {
            Maneuver {
                linear: direction * braking_speed(ctx, &direction, distance, &self.params),
                angular: AngularRates::ZERO,
                done: false,
            }
        }
    }
}

impl Strategy for FlyForwardStrategy {
    fn facing(&self, ctx: &TickContext) -> Facing {
        self.params.facing(ctx)
    }

    fn update(&mut self, ctx: &TickContext) -> Result<Maneuver, PilotError> {
        if let Phase::Stopping { stop_point } = self.phase {
            return Ok(self.approach(ctx, stop_point));
        }
        let facing = self.params.facing(ctx);
        let forward = facing.forward;

        // Bank charge on every sensor that can cover the flight axis.
        let mut total_rate = 0.0;
        for sensor in &self.sensors {
            let mut sensor = sensor.borrow_mut();
            if Self::covers(&*sensor, &forward) {
                sensor.start_charging();
                total_rate += sensor.charge_rate();
            }
        }
        if total_rate <= 0.0 {
            return Err(PilotError::CannotScan);
        }
        let decel = ctx.max_acceleration_for(&-forward);
        if decel <= 0.0 {
            return Err(PilotError::CannotBrake);
        }

        // Worst-case speed by the time the next scan can fire: current speed
        // plus one tick of full acceleration.
        let accel = ctx.max_acceleration_for(&forward);
        let speed = ctx.linear_velocity.norm() + accel * ctx.dt;
        let headroom = total_rate - speed;
        let charge_time = if headroom > 0.0 {
            (speed * speed / (2.0 * decel * headroom)).max(ctx.dt)
        } else {
            ctx.dt
        };
        let scan_distance = (charge_time * total_rate).max(MIN_SCAN_DISTANCE);

        // First sensor able to resolve gets the shot this tick.
        for sensor in &self.sensors {
            let mut sensor = sensor.borrow_mut();
            if !Self::covers(&*sensor, &forward) {
                continue;
            }
            let probe = sensor.frame().position + forward * scan_distance;
            if !sensor.can_scan(probe) {
                continue;
            }
            if let Some(contact) = sensor.scan(probe) {
                let surface = contact.hit_point.unwrap_or(contact.position);
                let stop_point = surface - forward * self.clearance;
                debug!(
                    "fly-forward: obstacle '{}' at {:.1} m, stopping",
                    contact.name,
                    (surface - facing.position).norm()
                );
                self.phase = Phase::Stopping { stop_point };
                return Ok(self.approach(ctx, stop_point));
            }
            break;
        }
        Ok(Maneuver {
            linear: forward * self.params.max_linear_speed,
            angular: AngularRates::ZERO,
            done: false,
        })
    }

    fn name(&self) -> &str {
        "fly-forward"
    }
}
