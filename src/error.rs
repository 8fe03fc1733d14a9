use thiserror::Error;

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while loading or rendering a scene script
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("script contains VARY, but FRAMES is not the first command")]
    VaryWithoutFrames,

    #[error("pop on an origin stack holding only the identity")]
    StackUnderflow,
}
