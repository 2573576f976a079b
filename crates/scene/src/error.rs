/// Errors from building scene inputs. Missing textures are not errors; they
/// fall back to the placeholder.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown face: {0:?}")]
    UnknownFace(String),
    #[error("invalid vector {0:?}, expected x,y,z")]
    InvalidVector(String),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}
