use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Malformed FILE entry on line {line}: {content}")]
    MalformedFileEntry { line: usize, content: String },

    #[error("Malformed TRACK entry on line {line}: {content}")]
    MalformedTrackEntry { line: usize, content: String },

    #[error("TRACK entry on line {line} appears before any FILE entry")]
    TrackWithoutFile { line: usize },

    #[error("No file with a data track is referenced in the CUE sheet {0}")]
    NoDataTrack(PathBuf),
}

pub type CueResult<T> = Result<T, CueError>;
