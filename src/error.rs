//! Errors raised at the loading boundary
//!
//! The simulation itself never fails; only reading external level and
//! tuning data can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level map has no tiles")]
    EmptyMap,

    #[error("entity {id} has a non-positive box ({width}x{height})")]
    InvalidEntity { id: u32, width: f32, height: f32 },
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
