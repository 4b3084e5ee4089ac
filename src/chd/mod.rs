use crate::cd::cue::CueParser;
use crate::cd::format::ImageFormat;
use crate::cd::pick::BestPick;
use crate::chd::error::{ChdError, ChdResult};
use crate::util::temp_sibling;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod chdman;
pub mod error;

/// Anything smaller is treated as a leftover from an aborted conversion.
const MIN_EXPORTED_SIZE: u64 = 1_000_000;

/// The external tools a pick is handed to.
#[allow(async_fn_in_trait)]
pub trait DiscConverter {
    /// Writes the CHD for `input` (a cue sheet or raw image) to `output`.
    async fn create_cd(&self, input: &Path, output: &Path) -> ChdResult<()>;

    /// Converts a CloneCD sheet to a cue sheet referencing `image_name`.
    async fn ccd_to_cue(&self, ccd: &Path, cue: &Path, image_name: &str) -> ChdResult<()>;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConversionPlan {
    CueSheet(PathBuf),
    CloneCd(PathBuf),
    RawImage(PathBuf),
}

impl ConversionPlan {
    pub fn for_pick(pick: &BestPick) -> ChdResult<Self> {
        let file = pick.file_for_conversion().to_path_buf();

        match ImageFormat::from_path(&file) {
            Some(ImageFormat::Cue) => Ok(ConversionPlan::CueSheet(file)),
            Some(ImageFormat::Ccd) => Ok(ConversionPlan::CloneCd(file)),
            Some(ImageFormat::Iso | ImageFormat::Bin | ImageFormat::Img) => {
                Ok(ConversionPlan::RawImage(file))
            }
            Some(ImageFormat::Sub) | None => Err(ChdError::UnknownFileFormat(file)),
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            ConversionPlan::CueSheet(path)
            | ConversionPlan::CloneCd(path)
            | ConversionPlan::RawImage(path) => path,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConvertOutcome {
    /// `generated` holds the files written next to the source on the way, such
    /// as the cue sheet produced from a CloneCD sheet.
    Converted { chd: PathBuf, generated: Vec<PathBuf> },
    ExportedBefore(PathBuf),
}

pub fn chd_output_path(output_folder: &Path, source: &Path) -> PathBuf {
    let mut file_name = source
        .file_stem()
        .unwrap_or(source.as_os_str())
        .to_os_string();
    file_name.push(".chd");

    output_folder.join(file_name)
}

pub async fn was_exported_before(chd_path: &Path) -> ChdResult<bool> {
    match fs::metadata(chd_path).await {
        Ok(metadata) => Ok(metadata.is_file() && metadata.len() > MIN_EXPORTED_SIZE),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Converts one pick into `<output_folder>/<stem>.chd`.
///
/// An existing CHD of plausible size is kept unless `force` is set. The CHD is
/// written under a temporary name first, so a failed run leaves a previous
/// output untouched.
pub async fn convert_pick<C: DiscConverter>(
    converter: &C,
    pick: &BestPick,
    output_folder: &Path,
    force: bool,
) -> ChdResult<ConvertOutcome> {
    let plan = ConversionPlan::for_pick(pick)?;
    let output_path = chd_output_path(output_folder, plan.source());

    if !force && was_exported_before(&output_path).await? {
        return Ok(ConvertOutcome::ExportedBefore(output_path));
    }

    fs::create_dir_all(output_folder).await?;

    let temp_path = temp_sibling(&output_path);
    if fs::try_exists(&temp_path).await? {
        debug!("Removing stale output {temp_path:?}");
        fs::remove_file(&temp_path).await?;
    }

    let generated = match run_plan(converter, &plan, &temp_path).await {
        Ok(generated) => generated,
        Err(err) => {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err);
        }
    };

    fs::rename(&temp_path, &output_path).await?;

    Ok(ConvertOutcome::Converted {
        chd: output_path,
        generated,
    })
}

async fn run_plan<C: DiscConverter>(
    converter: &C,
    plan: &ConversionPlan,
    output: &Path,
) -> ChdResult<Vec<PathBuf>> {
    match plan {
        ConversionPlan::CueSheet(cue) => {
            convert_cue(converter, cue, output).await?;
            Ok(Vec::new())
        }
        ConversionPlan::CloneCd(ccd) => {
            let cue = ccd.with_extension(ImageFormat::Cue.extension());
            let image_name = ccd
                .with_extension(ImageFormat::Img.extension())
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            info!("Converting {ccd:?} to {cue:?}...");
            converter.ccd_to_cue(ccd, &cue, &image_name).await?;

            convert_cue(converter, &cue, output).await?;
            Ok(vec![cue])
        }
        ConversionPlan::RawImage(image) => {
            converter.create_cd(image, output).await?;
            Ok(Vec::new())
        }
    }
}

async fn convert_cue<C: DiscConverter>(converter: &C, cue: &Path, output: &Path) -> ChdResult<()> {
    debug!("Verifying cue file {cue:?}");

    let document = CueParser::new(cue).parse().await?;
    if !document.data_file_exists().await? {
        return Err(ChdError::InvalidBinReference(cue.to_path_buf()));
    }

    converter.create_cd(cue, output).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call and writes a CHD large enough to count as exported.
    #[derive(Default)]
    struct RecordingConverter {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingConverter {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DiscConverter for RecordingConverter {
        async fn create_cd(&self, input: &Path, output: &Path) -> ChdResult<()> {
            self.calls.lock().unwrap().push(format!(
                "createcd {} {}",
                input.file_name().unwrap().to_string_lossy(),
                output.file_name().unwrap().to_string_lossy()
            ));

            if self.fail {
                return Err(ChdError::UnknownFileFormat(input.to_path_buf()));
            }

            fs::write(output, vec![0u8; MIN_EXPORTED_SIZE as usize + 1]).await?;
            Ok(())
        }

        async fn ccd_to_cue(&self, ccd: &Path, cue: &Path, image_name: &str) -> ChdResult<()> {
            self.calls.lock().unwrap().push(format!(
                "ccd2cue {} {}",
                ccd.file_name().unwrap().to_string_lossy(),
                image_name
            ));

            fs::write(
                cue,
                format!("FILE \"{image_name}\" BINARY\n  TRACK 01 MODE1/2352\n"),
            )
            .await?;
            Ok(())
        }
    }

    fn pick(layout: Option<PathBuf>, data_file: PathBuf) -> BestPick {
        BestPick {
            layout_file: layout,
            data_file,
        }
    }

    #[test]
    fn plan_dispatches_on_the_best_file() {
        let cue = pick(Some("/r/A.cue".into()), "/r/A.bin".into());
        assert_eq!(
            ConversionPlan::for_pick(&cue).unwrap(),
            ConversionPlan::CueSheet("/r/A.cue".into())
        );

        let ccd = pick(Some("/r/B.ccd".into()), "/r/B.img".into());
        assert_eq!(
            ConversionPlan::for_pick(&ccd).unwrap(),
            ConversionPlan::CloneCd("/r/B.ccd".into())
        );

        for image in ["/r/C.iso", "/r/C.bin", "/r/C.IMG"] {
            let raw = pick(None, image.into());
            assert_eq!(
                ConversionPlan::for_pick(&raw).unwrap(),
                ConversionPlan::RawImage(image.into())
            );
        }

        let sub = pick(None, "/r/D.sub".into());
        assert!(matches!(
            ConversionPlan::for_pick(&sub),
            Err(ChdError::UnknownFileFormat(_))
        ));
    }

    #[test]
    fn output_keeps_dots_in_the_stem() {
        assert_eq!(
            chd_output_path(Path::new("/out"), Path::new("/r/Game v1.1.cue")),
            PathBuf::from("/out/Game v1.1.chd")
        );
    }

    #[tokio::test]
    async fn cue_pick_is_verified_then_converted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("Game.cue"), "FILE \"Game.bin\" BINARY\n  TRACK 01 MODE2/2352\n")
            .await
            .unwrap();
        fs::write(dir.path().join("Game.bin"), b"").await.unwrap();

        let converter = RecordingConverter::default();
        let pick = pick(Some(dir.path().join("Game.cue")), dir.path().join("Game.bin"));

        let outcome = convert_pick(&converter, &pick, &out, false).await.unwrap();

        assert_eq!(
            outcome,
            ConvertOutcome::Converted {
                chd: out.join("Game.chd"),
                generated: Vec::new()
            }
        );
        assert_eq!(converter.calls(), vec!["createcd Game.cue .Game.chd.tmp"]);
        assert!(!out.join(".Game.chd.tmp").exists());
    }

    #[tokio::test]
    async fn cue_with_a_missing_bin_is_not_converted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Bad.cue"), "FILE \"Missing.bin\" BINARY\n  TRACK 01 MODE1/2352\n")
            .await
            .unwrap();

        let converter = RecordingConverter::default();
        let pick = pick(Some(dir.path().join("Bad.cue")), dir.path().join("Bad.bin"));

        let err = convert_pick(&converter, &pick, dir.path(), false).await.unwrap_err();

        assert!(matches!(err, ChdError::InvalidBinReference(_)));
        assert!(converter.calls().is_empty());
    }

    #[tokio::test]
    async fn clone_cd_goes_through_ccd2cue() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Clone.ccd"), "[CloneCD]\n").await.unwrap();
        fs::write(dir.path().join("Clone.img"), b"").await.unwrap();

        let converter = RecordingConverter::default();
        let pick = pick(Some(dir.path().join("Clone.ccd")), dir.path().join("Clone.img"));

        let outcome = convert_pick(&converter, &pick, dir.path(), false).await.unwrap();

        assert_eq!(
            outcome,
            ConvertOutcome::Converted {
                chd: dir.path().join("Clone.chd"),
                generated: vec![dir.path().join("Clone.cue")]
            }
        );
        assert_eq!(
            converter.calls(),
            vec!["ccd2cue Clone.ccd Clone.img", "createcd Clone.cue .Clone.chd.tmp"]
        );
    }

    #[tokio::test]
    async fn previous_export_is_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let chd = dir.path().join("Disc.chd");
        fs::write(&chd, vec![0u8; MIN_EXPORTED_SIZE as usize + 1]).await.unwrap();

        let converter = RecordingConverter::default();
        let pick = pick(None, dir.path().join("Disc.iso"));

        let outcome = convert_pick(&converter, &pick, dir.path(), false).await.unwrap();
        assert_eq!(outcome, ConvertOutcome::ExportedBefore(chd.clone()));
        assert!(converter.calls().is_empty());

        let outcome = convert_pick(&converter, &pick, dir.path(), true).await.unwrap();
        assert_eq!(
            outcome,
            ConvertOutcome::Converted {
                chd,
                generated: Vec::new()
            }
        );
        assert_eq!(converter.calls(), vec!["createcd Disc.iso .Disc.chd.tmp"]);
    }

    #[tokio::test]
    async fn truncated_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let chd = dir.path().join("Disc.chd");
        fs::write(&chd, b"partial").await.unwrap();

        assert!(!was_exported_before(&chd).await.unwrap());

        let converter = RecordingConverter::default();
        let pick = pick(None, dir.path().join("Disc.iso"));
        let outcome = convert_pick(&converter, &pick, dir.path(), false).await.unwrap();

        assert_eq!(
            outcome,
            ConvertOutcome::Converted {
                chd: chd.clone(),
                generated: Vec::new()
            }
        );
        assert!(fs::metadata(&chd).await.unwrap().len() > MIN_EXPORTED_SIZE);
    }

    #[tokio::test]
    async fn converter_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let converter = RecordingConverter {
            fail: true,
            ..Default::default()
        };
        let pick = pick(None, dir.path().join("Disc.bin"));

        assert!(convert_pick(&converter, &pick, dir.path(), false).await.is_err());
    }

    #[tokio::test]
    async fn failed_forced_run_keeps_the_previous_chd() {
        let dir = tempfile::tempdir().unwrap();
        let chd = dir.path().join("Disc.chd");
        fs::write(&chd, vec![1u8; MIN_EXPORTED_SIZE as usize + 1]).await.unwrap();

        let converter = RecordingConverter {
            fail: true,
            ..Default::default()
        };
        let pick = pick(None, dir.path().join("Disc.iso"));

        assert!(convert_pick(&converter, &pick, dir.path(), true).await.is_err());

        assert_eq!(
            fs::metadata(&chd).await.unwrap().len(),
            MIN_EXPORTED_SIZE + 1
        );
        assert!(!dir.path().join(".Disc.chd.tmp").exists());
    }
}
