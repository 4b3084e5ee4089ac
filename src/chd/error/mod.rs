use crate::cd::cue::error::CueError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChdError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("Unknown file format for conversion: {0}")]
    UnknownFileFormat(PathBuf),

    #[error("Cd data file in {0} is not correct. Run the verify command with --fix to repair it")]
    InvalidBinReference(PathBuf),

    #[error("Could not launch {tool}: {source}")]
    ToolLaunchFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

pub type ChdResult<T> = Result<T, ChdError>;
