use crate::cd::cue::{CueParser, write_cue_for_data_file};
use crate::cd::error::CdResult;
use crate::cd::format::ImageFormat;
use crate::cd::group::GameGroup;
use crate::cd::health::GroupState;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FixOutcome {
    /// The cue sheet now points at `data_file`.
    Repointed { layout: PathBuf, data_file: PathBuf },
    /// A cue sheet was generated for a lone data image.
    Generated { layout: PathBuf },
    /// Only cue sheets can be rewritten.
    LayoutNotFixable(PathBuf),
    Unrecoverable,
    NothingToFix,
}

/// Repairs `group` in place according to its `state`.
pub async fn fix_group(group: &GameGroup, state: GroupState) -> CdResult<FixOutcome> {
    match state {
        GroupState::Ok => Ok(FixOutcome::NothingToFix),
        GroupState::Empty
        | GroupState::NoDataTrack
        | GroupState::TooManyImageFormats
        | GroupState::NonAsciiName => Ok(FixOutcome::Unrecoverable),
        GroupState::InvalidBinReference => repoint_cue(group).await,
        GroupState::NoLayoutTrack => generate_cue(group).await,
    }
}

async fn repoint_cue(group: &GameGroup) -> CdResult<FixOutcome> {
    let (Some(layout), Some(data_file)) = (group.best_layout(), group.data_track()) else {
        return Ok(FixOutcome::Unrecoverable);
    };

    if ImageFormat::from_path(layout) != Some(ImageFormat::Cue) {
        return Ok(FixOutcome::LayoutNotFixable(layout.to_path_buf()));
    }

    let data_file_name = file_name(data_file);

    let mut document = CueParser::new(layout).parse().await?;
    document.rename_data_file(&data_file_name).await?;

    Ok(FixOutcome::Repointed {
        layout: layout.to_path_buf(),
        data_file: data_file.to_path_buf(),
    })
}

async fn generate_cue(group: &GameGroup) -> CdResult<FixOutcome> {
    let (Some(representative), Some(data_file)) = (group.representative(), group.data_track())
    else {
        return Ok(FixOutcome::Unrecoverable);
    };

    let layout = representative.with_extension(ImageFormat::Cue.extension());

    debug!("Generating {layout:?} for {data_file:?}");

    write_cue_for_data_file(&layout, data_file).await?;

    Ok(FixOutcome::Generated { layout })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
