//! Error taxonomy for the editor
//!
//! Editor operations return [`Result`]; the UI layer logs failures and keeps
//! running. GPU and window bootstrap use `anyhow` instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::scene::mesh::DrawMode;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown {what} kind '{name}'")]
    UnknownKind { what: &'static str, name: String },

    #[error("material '{material}' is not available in {mode:?} draw mode")]
    MaterialUnavailable { material: &'static str, mode: DrawMode },

    #[error("unknown parameter '{key}'")]
    UnknownParam { key: String },

    #[error("parameter '{key}' expects a {expected} value")]
    ParamType { key: String, expected: &'static str },

    #[error("the draw mode cannot change while an animation is playing")]
    AnimationPlaying,

    #[error("'{0}' is not an image file")]
    UnsupportedFile(PathBuf),

    #[error("failed to decode image '{path}': {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
