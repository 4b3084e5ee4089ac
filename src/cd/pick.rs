use crate::cd::cue::CueParser;
use crate::cd::error::CdResult;
use crate::cd::format::ImageFormat;
use crate::cd::group::GameGroup;
use log::debug;
use std::path::{Path, PathBuf};

/// The file, or layout and data pair, handed to the converter for one group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BestPick {
    pub layout_file: Option<PathBuf>,
    pub data_file: PathBuf,
}

impl BestPick {
    /// Layouts carry the track information, so they are preferred over the raw image.
    pub fn file_for_conversion(&self) -> &Path {
        self.layout_file.as_deref().unwrap_or(&self.data_file)
    }
}

/// Picks what to convert for `group`, `None` when no safe choice exists.
///
/// A single data image needs no layout to disambiguate it. Several data images
/// require a cue sheet naming the authoritative one. The returned layout is
/// always the best quality layout of the group, whichever cue sheet was read.
pub async fn pick_best(group: &GameGroup) -> CdResult<Option<BestPick>> {
    let data_images: Vec<&Path> = group.data_images().collect();
    let layout_file = group.best_layout().map(Path::to_path_buf);
    let name = group.display_name();

    let data_file = match data_images.as_slice() {
        [] => {
            debug!("No data image in group {name}");
            return Ok(None);
        }
        [single] => single.to_path_buf(),
        multiple => {
            if layout_file.is_none() {
                debug!("More than one data image in group {name} and no layout to choose from");
                return Ok(None);
            }

            match referenced_data_image(group, multiple).await? {
                Some(data_file) => data_file,
                None => {
                    debug!("No data image of group {name} is referenced by its layout");
                    return Ok(None);
                }
            }
        }
    };

    debug!("Picked {data_file:?} with layout {layout_file:?} for {name}");

    Ok(Some(BestPick {
        layout_file,
        data_file,
    }))
}

async fn referenced_data_image(
    group: &GameGroup,
    data_images: &[&Path],
) -> CdResult<Option<PathBuf>> {
    let cue = group
        .best_layout()
        .filter(|layout| ImageFormat::from_path(layout) == Some(ImageFormat::Cue));

    // clone cd sheets are not parsed, fall back to the first track
    let Some(cue) = cue else {
        return Ok(group.data_track().map(Path::to_path_buf));
    };

    let document = CueParser::new(cue).parse().await?;
    let referenced = document.folder().join(&document.first_data_file()?.filename);

    Ok(data_images
        .iter()
        .find(|data_image| **data_image == referenced)
        .map(|data_image| data_image.to_path_buf()))
}
