use crate::chd::DiscConverter;
use crate::chd::error::{ChdError, ChdResult};
use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BINTOOLS_DIR: &str = "bintools";

/// Runs the MAME `chdman` and `ccd2cue` executables.
#[derive(Debug, Clone)]
pub struct ChdmanTools {
    chdman: PathBuf,
    ccd2cue: PathBuf,
}

impl ChdmanTools {
    pub fn new(chdman: PathBuf, ccd2cue: PathBuf) -> Self {
        Self { chdman, ccd2cue }
    }

    /// Explicit paths win, then the `bintools` folder next to the executable, then `PATH`.
    pub fn resolve(chdman: Option<PathBuf>, ccd2cue: Option<PathBuf>) -> Self {
        Self::new(
            chdman.unwrap_or_else(|| bundled_tool("chdman")),
            ccd2cue.unwrap_or_else(|| bundled_tool("ccd2cue")),
        )
    }

    async fn run<I, S>(tool: &Path, args: I) -> ChdResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let tool_name = tool.display().to_string();
        let mut command = Command::new(tool);
        command.args(args);

        debug!("Running {command:?}");

        let output = command
            .output()
            .await
            .map_err(|source| ChdError::ToolLaunchFailed {
                tool: tool_name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ChdError::ToolFailed {
                tool: tool_name,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl DiscConverter for ChdmanTools {
    async fn create_cd(&self, input: &Path, output: &Path) -> ChdResult<()> {
        Self::run(
            &self.chdman,
            [
                OsStr::new("createcd"),
                OsStr::new("-i"),
                input.as_os_str(),
                OsStr::new("-o"),
                output.as_os_str(),
            ],
        )
        .await
    }

    async fn ccd_to_cue(&self, ccd: &Path, cue: &Path, image_name: &str) -> ChdResult<()> {
        Self::run(
            &self.ccd2cue,
            [
                OsStr::new("--input"),
                ccd.as_os_str(),
                OsStr::new("--output"),
                cue.as_os_str(),
                OsStr::new("--image"),
                OsStr::new(image_name),
            ],
        )
        .await
    }
}

fn bundled_tool(name: &str) -> PathBuf {
    let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BINTOOLS_DIR).join(&file_name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}
