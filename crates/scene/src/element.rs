use std::collections::BTreeMap;

use crate::face::Face;
use crate::plane::{BoundingBox, FacePlane};

/// Shown while a texture is being probed, and for any texture that does
/// not exist.
pub const MISSING_TEXTURE: &str = "textures/misc/missing.png";

/// Desired state of a block element.
///
/// Faces absent from `textures` keep whatever they had. A face mapped to
/// `None` has no texture and shows the placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockProps {
    pub bounds: BoundingBox,
    pub textures: BTreeMap<Face, Option<String>>,
}

impl BlockProps {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            textures: BTreeMap::new(),
        }
    }

    pub fn texture(mut self, face: Face, url: impl Into<String>) -> Self {
        self.textures.insert(face, Some(url.into()));
        self
    }

    pub fn no_texture(mut self, face: Face) -> Self {
        self.textures.insert(face, None);
        self
    }
}

/// Pending existence check for one texture assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    pub face: Face,
    pub generation: u64,
    pub url: String,
}

/// What a face node should look like right now.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceStyle {
    pub plane: FacePlane,
    pub texture: String,
}

impl FaceStyle {
    pub fn face(&self) -> Face {
        self.plane.face
    }

    pub fn css(&self) -> String {
        self.plane.style(&self.texture)
    }
}

/// A change for the host document to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    CreateFace(FaceStyle),
    UpdateFace(FaceStyle),
    Probe(ProbeTicket),
}

#[derive(Debug)]
struct FaceNode {
    plane: FacePlane,
    /// Texture currently displayed.
    shown: String,
    /// Last assigned texture, before probing.
    requested: Option<String>,
    generation: u64,
}

impl FaceNode {
    fn style(&self) -> FaceStyle {
        FaceStyle {
            plane: self.plane,
            texture: self.shown.clone(),
        }
    }
}

/// A block drawn as up to six CSS planes. Face nodes are created the first
/// time a face gets a texture and reused afterwards.
#[derive(Debug)]
pub struct BlockElement {
    bounds: BoundingBox,
    faces: BTreeMap<Face, FaceNode>,
    placeholder: String,
    nodes_created: usize,
}

impl Default for BlockElement {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockElement {
    pub fn new() -> Self {
        Self::with_placeholder(MISSING_TEXTURE)
    }

    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            bounds: BoundingBox::default(),
            faces: BTreeMap::new(),
            placeholder: placeholder.into(),
            nodes_created: 0,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Number of face nodes ever instantiated.
    pub fn nodes_created(&self) -> usize {
        self.nodes_created
    }

    pub fn face_style(&self, face: Face) -> Option<FaceStyle> {
        self.faces.get(&face).map(FaceNode::style)
    }

    /// Styles of every instantiated face, in face order.
    pub fn styles(&self) -> impl Iterator<Item = FaceStyle> + '_ {
        self.faces.values().map(FaceNode::style)
    }

    /// Apply `props` and return the changes to make. Unchanged props yield
    /// no instructions.
    pub fn update(&mut self, props: &BlockProps) -> Vec<RenderInstruction> {
        let mut out = Vec::new();

        let moved = props.bounds != self.bounds;
        if moved {
            self.bounds = props.bounds;
            for (face, node) in &mut self.faces {
                node.plane = FacePlane::new(*face, &self.bounds);
                if !props.textures.contains_key(face) {
                    out.push(RenderInstruction::UpdateFace(node.style()));
                }
            }
        }

        for (face, url) in &props.textures {
            self.set_texture(*face, url.as_deref(), moved, &mut out);
        }
        out
    }

    fn set_texture(
        &mut self,
        face: Face,
        url: Option<&str>,
        moved: bool,
        out: &mut Vec<RenderInstruction>,
    ) {
        let bounds = self.bounds;
        let created = !self.faces.contains_key(&face);
        let node = self.faces.entry(face).or_insert_with(|| FaceNode {
            plane: FacePlane::new(face, &bounds),
            shown: self.placeholder.clone(),
            requested: None,
            generation: 0,
        });

        if !created && node.requested.as_deref() == url {
            if moved {
                out.push(RenderInstruction::UpdateFace(node.style()));
            }
            return;
        }

        node.generation += 1;
        node.requested = url.map(str::to_string);
        node.shown = self.placeholder.clone();
        let style = node.style();

        if created {
            self.nodes_created += 1;
            tracing::debug!(%face, "face node created");
            out.push(RenderInstruction::CreateFace(style));
        } else {
            out.push(RenderInstruction::UpdateFace(style));
        }

        if let Some(url) = url {
            out.push(RenderInstruction::Probe(ProbeTicket {
                face,
                generation: node.generation,
                url: url.to_string(),
            }));
        }
    }

    /// Apply the outcome of a probe. Returns the update to make, or `None`
    /// when the ticket is stale or the texture is missing.
    pub fn resolve_probe(&mut self, ticket: &ProbeTicket, exists: bool) -> Option<RenderInstruction> {
        let node = self.faces.get_mut(&ticket.face)?;
        if node.generation != ticket.generation {
            tracing::trace!(face = %ticket.face, ticket = ticket.generation, current = node.generation, "stale probe ignored");
            return None;
        }
        if !exists {
            tracing::debug!(face = %ticket.face, url = %ticket.url, "texture missing, keeping placeholder");
            return None;
        }
        node.shown = ticket.url.clone();
        Some(RenderInstruction::UpdateFace(node.style()))
    }
}

/// The probe tickets among `instructions`.
pub fn tickets(instructions: &[RenderInstruction]) -> Vec<ProbeTicket> {
    instructions
        .iter()
        .filter_map(|i| match i {
            RenderInstruction::Probe(ticket) => Some(ticket.clone()),
            _ => None,
        })
        .collect()
}
