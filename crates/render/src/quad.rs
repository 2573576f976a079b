use glam::DVec2;

use crate::vector::{Coord, GeometryError, Uv, VectorExt};

/// Distance sums at or below this are treated as a collapsed quad.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Four corners of one coordinate kind. Shape is not validated; projection
/// results are only meaningful for convex quads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad<T> {
    pub top_left: T,
    pub top_right: T,
    pub bottom_left: T,
    pub bottom_right: T,
}

impl<T: Coord> Quad<T> {
    pub fn new(top_left: T, top_right: T, bottom_left: T, bottom_right: T) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Corners in perimeter order: top-left, top-right, bottom-right, bottom-left.
    pub fn perimeter(&self) -> [T; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn map<U: Coord>(&self, f: impl Fn(T) -> U) -> Quad<U> {
        Quad {
            top_left: f(self.top_left),
            top_right: f(self.top_right),
            bottom_left: f(self.bottom_left),
            bottom_right: f(self.bottom_right),
        }
    }
}

impl Quad<Uv> {
    /// The whole texture: (0,0) top-left to (1,1) bottom-right.
    pub fn unit() -> Self {
        Self::new(
            Uv::new(0.0, 0.0),
            Uv::new(1.0, 0.0),
            Uv::new(0.0, 1.0),
            Uv::new(1.0, 1.0),
        )
    }
}

/// Inverse bilinear projection onto one quad.
///
/// For a query point, the perpendicular distances to opposite edges give
/// `u = d_left / (d_left + d_right)` and `v = 1 - d_bottom / (d_bottom + d_top)`.
/// Edge normals are computed once here and reused for every query.
#[derive(Debug, Clone, Copy)]
pub struct QuadProjector {
    bottom_left: DVec2,
    top_right: DVec2,
    bottom_right: DVec2,
    top_left: DVec2,
    n_left: DVec2,
    n_bottom: DVec2,
    n_right: DVec2,
    n_top: DVec2,
}

impl QuadProjector {
    pub fn new(quad: &Quad<Uv>) -> Result<Self, GeometryError> {
        let tl = quad.top_left.vec();
        let tr = quad.top_right.vec();
        let bl = quad.bottom_left.vec();
        let br = quad.bottom_right.vec();

        let edge = |v: DVec2, name: &'static str| {
            v.unit().map_err(|_| GeometryError::DegenerateQuad(name))
        };
        Ok(Self {
            bottom_left: bl,
            top_right: tr,
            bottom_right: br,
            top_left: tl,
            n_left: edge(tl - bl, "left edge has zero length")?.rotated_right(),
            n_bottom: edge(br - bl, "bottom edge has zero length")?.rotated_left(),
            n_right: edge(tr - br, "right edge has zero length")?.rotated_left(),
            n_top: edge(tr - tl, "top edge has zero length")?.rotated_right(),
        })
    }

    /// Texture UV of `coord`, both in the same UV space as the quad.
    pub fn project(&self, coord: Uv) -> Result<Uv, GeometryError> {
        let p = coord.vec();
        let du0 = (p - self.bottom_left).dot(self.n_left).abs();
        let du1 = (p - self.top_right).dot(self.n_right).abs();
        let dv0 = (p - self.bottom_right).dot(self.n_bottom).abs();
        let dv1 = (p - self.top_left).dot(self.n_top).abs();

        let du = du0 + du1;
        let dv = dv0 + dv1;
        if du <= DEGENERATE_EPSILON || dv <= DEGENERATE_EPSILON {
            return Err(GeometryError::DegenerateQuad("quad collapsed to a line"));
        }
        Ok(Uv::new(du0 / du, 1.0 - dv0 / dv))
    }
}

/// One-shot projection. Prefer [`QuadProjector`] when projecting many points
/// against the same quad.
pub fn uv_projection(quad: &Quad<Uv>, coord: Uv) -> Result<Uv, GeometryError> {
    QuadProjector::new(quad)?.project(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_uv_eq(a: Uv, b: Uv) {
        assert!(
            (a.0 - b.0).length() < 1e-9,
            "expected {b:?}, got {a:?}"
        );
    }

    fn grid() -> impl Iterator<Item = Uv> {
        (1..10).flat_map(|i| (1..10).map(move |j| Uv::new(i as f64 / 10.0, j as f64 / 10.0)))
    }

    #[test]
    fn unit_square_is_identity() {
        let projector = QuadProjector::new(&Quad::unit()).unwrap();
        for p in grid() {
            assert_uv_eq(projector.project(p).unwrap(), p);
        }
    }

    #[test]
    fn scale_and_translate_invariance() {
        let original = Quad::unit();
        let transform = |uv: Uv| Uv(uv.0 * 0.4 + DVec2::new(0.25, 0.1));
        let moved = original.map(transform);
        for p in grid() {
            let a = uv_projection(&original, p).unwrap();
            let b = uv_projection(&moved, transform(p)).unwrap();
            assert_uv_eq(a, b);
        }
    }

    #[test]
    fn non_uniform_scale_of_rectangle_is_invariant() {
        let rect = Quad::new(
            Uv::new(0.2, 0.3),
            Uv::new(0.8, 0.3),
            Uv::new(0.2, 0.5),
            Uv::new(0.8, 0.5),
        );
        let projector = QuadProjector::new(&rect).unwrap();
        assert_uv_eq(projector.project(Uv::new(0.5, 0.4)).unwrap(), Uv::new(0.5, 0.5));
        assert_uv_eq(projector.project(Uv::new(0.35, 0.45)).unwrap(), Uv::new(0.25, 0.75));
    }

    #[test]
    fn parallelogram_corners_map_to_texture_corners() {
        // Left face of an isometric cube.
        let quad = Quad::new(
            Uv::new(0.0, 0.25),
            Uv::new(0.5, 0.5),
            Uv::new(0.0, 0.75),
            Uv::new(0.5, 1.0),
        );
        let projector = QuadProjector::new(&quad).unwrap();
        assert_uv_eq(projector.project(Uv::new(0.25, 0.625)).unwrap(), Uv::new(0.5, 0.5));
        assert_uv_eq(projector.project(quad.top_left).unwrap(), Uv::new(0.0, 0.0));
        assert_uv_eq(projector.project(quad.bottom_right).unwrap(), Uv::new(1.0, 1.0));
    }

    #[test]
    fn zero_length_edge_is_degenerate() {
        let quad = Quad::new(
            Uv::new(0.0, 0.0),
            Uv::new(0.0, 0.0),
            Uv::new(0.0, 1.0),
            Uv::new(1.0, 1.0),
        );
        assert!(matches!(
            QuadProjector::new(&quad),
            Err(GeometryError::DegenerateQuad(_))
        ));
    }

    #[test]
    fn collapsed_quad_is_degenerate_not_nan() {
        // Every corner on the line y = 0.5.
        let quad = Quad::new(
            Uv::new(0.0, 0.5),
            Uv::new(1.0, 0.5),
            Uv::new(0.2, 0.5),
            Uv::new(0.8, 0.5),
        );
        let projector = QuadProjector::new(&quad).unwrap();
        assert!(matches!(
            projector.project(Uv::new(0.5, 0.5)),
            Err(GeometryError::DegenerateQuad(_))
        ));
    }
}
