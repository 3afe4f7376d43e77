use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Orientation solver: rate command + misalignment metric
// ---------------------------------------------------------------------------

/// Rate request around a task's facing axes. The controller turns this into
/// per-actuator channel overrides; strategies only ever fill it from
/// [`rotate_to_match`] or leave it zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngularRates {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl AngularRates {
    pub const ZERO: AngularRates = AngularRates {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0 && self.roll == 0.0
    }
}

fn bias(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Computes the rate command that brings `forward` onto `target`, and the
/// divergence scalar in [0, 2]: 0 = aligned, 2 = exactly reversed.
///
/// All four vectors are unit vectors in the same reference frame. A zero
/// `target_up` leaves roll unconstrained; otherwise an analogous roll
/// correction aligns `up` with `target_up` and the divergence is the worse of
/// the two misalignments.
///
/// Past 90° of misalignment the yaw/roll cross terms shrink again and vanish
/// at 180°, a stable stall point; a unit nudge on the affected channel keeps
/// the turn moving through it. Convergence speed near that singularity is a
/// tunable, not a contract.
pub fn rotate_to_match(
    target: &Vector3<f64>,
    target_up: &Vector3<f64>,
    forward: &Vector3<f64>,
    up: &Vector3<f64>,
) -> (AngularRates, f64) {
    let left = up.cross(forward);
    let diff = forward.dot(target);
    let shift = forward - target;
    let mut rates = AngularRates {
        pitch: up.dot(&shift),
        yaw: left.dot(&shift),
        roll: 0.0,
    };
    if diff < 0.0 {
        rates.yaw += bias(rates.yaw);
    }
    let mut divergence = 1.0 - diff;
    if *target_up != Vector3::zeros() {
        let up_diff = up.dot(target_up);
        let up_shift = up - target_up;
        rates.roll = left.dot(&up_shift);
        if up_diff < 0.0 {
            rates.roll += bias(rates.roll);
        }
        divergence = divergence.max(1.0 - up_diff);
    }
    (rates, divergence)
}
