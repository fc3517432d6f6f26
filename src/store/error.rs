use crate::types::variable::Variable;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No stored model for {variable} at '{path}'")]
    ModelNotFound { variable: Variable, path: PathBuf },

    #[error("Failed to determine model store directory")]
    DirResolution,

    #[error("Failed to create model store directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write model file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to delete model file '{0}'")]
    Delete(PathBuf, #[source] std::io::Error),

    #[error("Failed to read model file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode {0} model")]
    Encode(Variable, #[source] Box<bincode::error::EncodeError>),

    #[error("Failed to decode model file '{0}'")]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Model for {found} cannot be stored or loaded as {expected}")]
    VariableMismatch { expected: Variable, found: Variable },
}
