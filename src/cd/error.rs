use crate::cd::cue::error::CueError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("Source folder does not exist: {0}")]
    FolderNotFound(PathBuf),

    #[error("Cd image {0} does not exist")]
    ImageNotFound(PathBuf),

    #[error("No image group could be built for {0}")]
    NoGroupForImage(PathBuf),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),
}

pub type CdResult<T> = Result<T, CdError>;
