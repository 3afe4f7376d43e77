use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Body axes and world-space frames
// ---------------------------------------------------------------------------

/// One of the six body-relative axes of a vehicle or device.
///
/// Body convention: forward = +X, left = +Y, up = +Z (right-handed, so
/// `up × forward = left`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis6 {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Axis6 {
    /// The opposite axis.
    pub fn flipped(self) -> Self {
        match self {
            Axis6::Forward => Axis6::Backward,
            Axis6::Backward => Axis6::Forward,
            Axis6::Left => Axis6::Right,
            Axis6::Right => Axis6::Left,
            Axis6::Up => Axis6::Down,
            Axis6::Down => Axis6::Up,
        }
    }

    /// Unit vector for this axis in body space.
    pub fn body_vector(self) -> Vector3<f64> {
        match self {
            Axis6::Forward => Vector3::x(),
            Axis6::Backward => -Vector3::x(),
            Axis6::Left => Vector3::y(),
            Axis6::Right => -Vector3::y(),
            Axis6::Up => Vector3::z(),
            Axis6::Down => -Vector3::z(),
        }
    }

    /// A forward/up pair is usable only if the two axes are orthogonal.
    pub fn is_valid_pair(forward: Axis6, up: Axis6) -> bool {
        forward.body_vector().dot(&up.body_vector()) == 0.0
    }
}

// ---------------------------------------------------------------------------
// Frame: world-space pose of the vehicle or one of its devices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub position: Vector3<f64>,
    /// Body→world rotation.
    pub rotation: UnitQuaternion<f64>,
}

impl Frame {
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// World direction of a body axis.
    pub fn axis(&self, axis: Axis6) -> Vector3<f64> {
        self.rotation * axis.body_vector()
    }

    pub fn forward(&self) -> Vector3<f64> {
        self.axis(Axis6::Forward)
    }

    pub fn up(&self) -> Vector3<f64> {
        self.axis(Axis6::Up)
    }

    pub fn left(&self) -> Vector3<f64> {
        self.axis(Axis6::Left)
    }

    /// World vector expressed in this frame's body axes.
    pub fn to_local(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(v)
    }

    /// Facing with a remapped choice of forward/up axes.
    pub fn facing(&self, forward: Axis6, up: Axis6) -> Facing {
        Facing {
            position: self.position,
            forward: self.axis(forward),
            up: self.axis(up),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Facing: the point and axes one guidance task steers by
// ---------------------------------------------------------------------------

/// Position plus the world forward/up directions that define "the vehicle's
/// facing" for a task. Produced from a [`Frame`] and an axis selection.
#[derive(Debug, Clone, Copy)]
pub struct Facing {
    pub position: Vector3<f64>,
    pub forward: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Facing {
    pub fn left(&self) -> Vector3<f64> {
        self.up.cross(&self.forward)
    }
}
