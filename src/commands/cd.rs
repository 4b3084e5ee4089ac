use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Commands for loose CD images (cue, bin, iso, ccd, img)
#[derive(Subcommand, Debug)]
pub enum CdCommands {
    #[command(alias = "cd2chd")]
    ToChd(ToChdCommand),
    #[command(alias = "verify-cd-layouts")]
    Verify(VerifyCommand),
}

/// Where the cd images are taken from
#[derive(Args, Debug, Clone, Eq, PartialEq)]
#[group(required = true, multiple = false)]
pub struct CdSource {
    /// Folder where the cd images are processed in batch
    #[arg(long, value_name = "SOURCE_FOLDER")]
    pub source_folder: Option<PathBuf>,

    /// Single cd image (iso, bin, cue, img, ccd) to process
    #[arg(long, value_name = "CD_IMAGE")]
    pub cd_image: Option<PathBuf>,
}

/// Groups the cd images of a folder, or a single one, and converts every healthy game to CHD.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(
    long_about = "Groups the cd images of a folder, or a single one, and converts every healthy game to CHD\n\nNote: games with problems are skipped, run the verify command with --fix first"
)]
pub struct ToChdCommand {
    #[command(flatten)]
    pub source: CdSource,

    /// Folder the CHD files are written to
    #[arg(long, value_name = "OUTPUT_FOLDER")]
    pub output_folder: PathBuf,

    /// Convert again even if the CHD file already exists
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,

    /// Delete the original cd images after a successful conversion
    #[arg(long, default_value_t = false)]
    pub delete_original: bool,

    /// Path to the chdman executable
    #[arg(long, value_name = "CHDMAN", env = "CHDMAN_PATH")]
    pub chdman: Option<PathBuf>,

    /// Path to the ccd2cue executable, used for CloneCD images
    #[arg(long, value_name = "CCD2CUE", env = "CCD2CUE_PATH")]
    pub ccd2cue: Option<PathBuf>,
}

/// Checks all cd layout files (cue, ccd) for errors.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct VerifyCommand {
    #[command(flatten)]
    pub source: CdSource,

    /// Fix the problems that can be fixed
    #[arg(long, default_value_t = false)]
    pub fix: bool,

    /// Print one tab separated line per game on stdout: state, name, diagnosis
    #[arg(long, default_value_t = false)]
    pub porcelain: bool,
}
