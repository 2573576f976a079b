use glam::DVec2;

/// Errors from vector and quad geometry.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("cannot normalize a zero-length vector")]
    ZeroLength,
    #[error("degenerate quad: {0}")]
    DegenerateQuad(&'static str),
}

/// 2D vector operations not covered by `glam`.
pub trait VectorExt: Sized {
    /// Unit vector in the same direction. Fails on zero (or non-finite)
    /// length instead of producing `NaN`.
    fn unit(self) -> Result<Self, GeometryError>;

    /// Perpendicular rotated a quarter turn clockwise (y-up).
    fn rotated_right(self) -> Self;

    /// Perpendicular rotated a quarter turn counter-clockwise (y-up).
    fn rotated_left(self) -> Self;
}

impl VectorExt for DVec2 {
    fn unit(self) -> Result<Self, GeometryError> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Err(GeometryError::ZeroLength);
        }
        Ok(self / len)
    }

    fn rotated_right(self) -> Self {
        -self.perp()
    }

    fn rotated_left(self) -> Self {
        self.perp()
    }
}

/// A point in pixel space. Not necessarily integral.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(pub DVec2);

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }
}

/// A normalized texture coordinate, origin top-left. Ordinarily within
/// [0,1]² but may stray slightly outside at quad edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Uv(pub DVec2);

impl Uv {
    pub fn new(u: f64, v: f64) -> Self {
        Self(DVec2::new(u, v))
    }

    pub fn u(self) -> f64 {
        self.0.x
    }

    pub fn v(self) -> f64 {
        self.0.y
    }

    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.0.x) && (0.0..=1.0).contains(&self.0.y)
    }

    pub fn clamped(self) -> Self {
        Self(self.0.clamp(DVec2::ZERO, DVec2::ONE))
    }
}

/// A coordinate kind a [`crate::Quad`] can be made of.
pub trait Coord: Copy {
    fn vec(self) -> DVec2;
    fn from_vec(v: DVec2) -> Self;
}

impl Coord for Point {
    fn vec(self) -> DVec2 {
        self.0
    }

    fn from_vec(v: DVec2) -> Self {
        Self(v)
    }
}

impl Coord for Uv {
    fn vec(self) -> DVec2 {
        self.0
    }

    fn from_vec(v: DVec2) -> Self {
        Self(v)
    }
}
