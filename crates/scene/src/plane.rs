use std::str::FromStr;

use glam::DVec3;

use crate::error::SceneError;
use crate::face::Face;

/// Axis-aligned box in game coordinates (y-up). Corners are normalized so
/// `from <= to` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub from: DVec3,
    pub to: DVec3,
}

impl BoundingBox {
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// A full block in model units, 0..16 on every axis.
    pub fn full_block() -> Self {
        Self::new(DVec3::ZERO, DVec3::splat(16.0))
    }

    pub fn size(&self) -> DVec3 {
        self.to - self.from
    }

    pub fn center(&self) -> DVec3 {
        (self.from + self.to) * 0.5
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::full_block()
    }
}

/// Parse `x,y,z`.
pub fn parse_vec3(s: &str) -> Result<DVec3, SceneError> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| SceneError::InvalidVector(s.to_string()))?;
    match parts.as_slice() {
        [x, y, z] if parts.iter().all(|v| v.is_finite()) => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(SceneError::InvalidVector(s.to_string())),
    }
}

impl FromStr for BoundingBox {
    type Err = SceneError;

    /// `x,y,z:x,y,z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| SceneError::InvalidVector(s.to_string()))?;
        Ok(Self::new(parse_vec3(a)?, parse_vec3(b)?))
    }
}

/// One face of a box as a flat, positioned, rotated plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePlane {
    pub face: Face,
    pub width: f64,
    pub height: f64,
    /// Plane centre in game coordinates.
    pub center: DVec3,
}

impl FacePlane {
    pub fn new(face: Face, bounds: &BoundingBox) -> Self {
        let size = bounds.size();
        let (w_axis, h_axis) = face.axes();
        Self {
            face,
            width: w_axis.component(size),
            height: h_axis.component(size),
            center: bounds.center() + face.normal() * size * 0.5,
        }
    }

    /// Centre in host coordinates (y-down).
    pub fn host_position(&self) -> DVec3 {
        DVec3::new(self.center.x, -self.center.y, self.center.z)
    }

    pub fn transform(&self) -> String {
        let p = self.host_position();
        let (rx, ry) = self.face.rotation();
        format!(
            "translate(-50%, -50%) translate3d({}px, {}px, {}px) rotateX({rx}deg) rotateY({ry}deg)",
            num(p.x),
            num(p.y),
            num(p.z),
        )
    }

    /// Inline style for the plane node.
    pub fn style(&self, background: &str) -> String {
        format!(
            "width: {}px; height: {}px; transform: {}; background-image: url(\"{}\"); background-size: 100% 100%",
            num(self.width),
            num(self.height),
            self.transform(),
            background.replace('"', "%22"),
        )
    }
}

/// Short CSS number: at most four decimals, no negative zero.
fn num(v: f64) -> f64 {
    let r = (v * 10_000.0).round() / 10_000.0;
    if r == 0.0 { 0.0 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_box() {
        let b: BoundingBox = "16,8,16:0,0,0".parse().unwrap();
        assert_eq!(b.from, DVec3::ZERO);
        assert_eq!(b.to, DVec3::new(16.0, 8.0, 16.0));
        assert!("1,2:3,4,5".parse::<BoundingBox>().is_err());
        assert!("1,2,nan:3,4,5".parse::<BoundingBox>().is_err());
        assert!("1,2,3".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn slab_faces_sized_from_in_plane_extents() {
        let slab = BoundingBox::new(DVec3::ZERO, DVec3::new(16.0, 8.0, 16.0));
        let up = FacePlane::new(Face::Up, &slab);
        assert_eq!((up.width, up.height), (16.0, 16.0));
        assert_eq!(up.center, DVec3::new(8.0, 8.0, 8.0));

        let east = FacePlane::new(Face::East, &slab);
        assert_eq!((east.width, east.height), (16.0, 8.0));
        assert_eq!(east.center, DVec3::new(16.0, 4.0, 8.0));
    }

    #[test]
    fn host_y_is_negated_game_y() {
        let b = BoundingBox::new(DVec3::new(0.0, 2.0, 0.0), DVec3::new(4.0, 6.0, 4.0));
        for face in Face::ALL {
            let plane = FacePlane::new(face, &b);
            assert_eq!(plane.host_position().y, -plane.center.y);
            let expected = format!("{}px,", num(-plane.center.y));
            assert!(
                plane.transform().contains(&expected),
                "{face}: {}",
                plane.transform()
            );
        }
    }

    #[test]
    fn transform_string() {
        let plane = FacePlane::new(Face::North, &BoundingBox::full_block());
        assert_eq!(
            plane.transform(),
            "translate(-50%, -50%) translate3d(8px, -8px, 0px) rotateX(0deg) rotateY(180deg)"
        );
        let style = plane.style("tex/stone.png");
        assert!(style.starts_with("width: 16px; height: 16px; transform: translate("));
        assert!(style.contains("url(\"tex/stone.png\")"));
    }

    #[test]
    fn no_negative_zero() {
        assert_eq!(format!("{}", num(-0.0)), "0");
        assert_eq!(format!("{}", num(0.1 + 0.2)), "0.3");
    }
}
