//! CSS 3D block renderer: each block face becomes a flat node positioned and
//! rotated by a CSS transform, so the host engine does the projection.
//!
//! # Invariants
//! - Game coordinates are y-up; every emitted translation uses `host_y = -game_y`.
//! - A face node is created the first time its face gets a texture, then reused.
//! - A face shows the placeholder until its texture is confirmed to exist.
//! - A probe result is applied only if no newer texture was assigned since.

mod element;
mod error;
mod face;
mod plane;
mod probe;

pub use element::{
    BlockElement, BlockProps, FaceStyle, MISSING_TEXTURE, ProbeTicket, RenderInstruction, tickets,
};
pub use error::SceneError;
pub use face::{Axis, Face};
pub use plane::{BoundingBox, FacePlane, parse_vec3};
pub use probe::{HttpTextureProbe, ProbeCache, TextureProbe, resolve_tickets};

pub fn crate_info() -> &'static str {
    "mcstats-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
