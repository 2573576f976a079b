use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::error::SceneError;

/// A game-space axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn component(self, v: DVec3) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// One side of a block. A plane element faces the viewer (+z) before
/// rotation; each face's rotation turns it outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::North,
        Face::South,
        Face::East,
        Face::West,
        Face::Up,
        Face::Down,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Face::North => "north",
            Face::South => "south",
            Face::East => "east",
            Face::West => "west",
            Face::Up => "up",
            Face::Down => "down",
        }
    }

    /// `(rotateX, rotateY)` in degrees.
    pub const fn rotation(self) -> (i32, i32) {
        match self {
            Face::North => (0, 180),
            Face::South => (0, 0),
            Face::East => (0, 90),
            Face::West => (0, -90),
            Face::Up => (90, 0),
            Face::Down => (-90, 0),
        }
    }

    /// In-plane axes as (width, height).
    pub const fn axes(self) -> (Axis, Axis) {
        match self {
            Face::North | Face::South => (Axis::X, Axis::Y),
            Face::East | Face::West => (Axis::Z, Axis::Y),
            Face::Up | Face::Down => (Axis::X, Axis::Z),
        }
    }

    /// Outward unit normal in game coordinates (y-up).
    pub fn normal(self) -> DVec3 {
        match self {
            Face::North => DVec3::NEG_Z,
            Face::South => DVec3::Z,
            Face::East => DVec3::X,
            Face::West => DVec3::NEG_X,
            Face::Up => DVec3::Y,
            Face::Down => DVec3::NEG_Y,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Face {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SceneError::UnknownFace(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for face in Face::ALL {
            assert_eq!(face.to_string().parse::<Face>().unwrap(), face);
        }
        assert_eq!("UP".parse::<Face>().unwrap(), Face::Up);
        assert!("top".parse::<Face>().is_err());
    }

    #[test]
    fn axes_are_perpendicular_to_normal() {
        for face in Face::ALL {
            let (w, h) = face.axes();
            assert_ne!(w, h);
            assert_eq!(w.component(face.normal()), 0.0);
            assert_eq!(h.component(face.normal()), 0.0);
        }
    }

    #[test]
    fn rotations_are_quarter_turns() {
        for face in Face::ALL {
            let (x, y) = face.rotation();
            assert!([0, 90, -90, 180].contains(&x));
            assert!([0, 90, -90, 180].contains(&y));
        }
    }
}
