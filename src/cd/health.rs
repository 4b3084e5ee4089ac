use crate::cd::cue::CueParser;
use crate::cd::error::CdResult;
use crate::cd::format::ImageFormat;
use crate::cd::group::GameGroup;
use std::collections::HashSet;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GroupState {
    Ok,
    Empty,
    NoDataTrack,
    NoLayoutTrack,
    TooManyImageFormats,
    InvalidBinReference,
    NonAsciiName,
}

impl GroupState {
    pub fn is_ok(self) -> bool {
        self == GroupState::Ok
    }

    /// Human readable explanation of what is wrong with a group called `name`.
    pub fn diagnosis(self, name: &str) -> String {
        match self {
            GroupState::Ok => format!("{name} is OK"),
            GroupState::Empty => {
                "An empty group has been generated. Check why, this must not happen.".to_string()
            }
            GroupState::NoDataTrack => {
                format!("{name} needs a data file to be converted. Did you forget to copy it?")
            }
            GroupState::NoLayoutTrack => format!(
                "{name} needs a layout file to be converted. Use the verify command with --fix to generate one."
            ),
            GroupState::TooManyImageFormats => {
                format!("There can't be more than 1 image format for each game. {name}")
            }
            GroupState::InvalidBinReference => format!(
                "{name} has a layout file but the data file it points to is missing. Use the verify command with --fix to repair it."
            ),
            GroupState::NonAsciiName => format!(
                "{name} contains non ASCII chars that are not supported by chdman. Please rename it."
            ),
        }
    }
}

impl Display for GroupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GroupState::Ok => "ok",
            GroupState::Empty => "empty",
            GroupState::NoDataTrack => "no-data-track",
            GroupState::NoLayoutTrack => "no-layout-track",
            GroupState::TooManyImageFormats => "too-many-image-formats",
            GroupState::InvalidBinReference => "invalid-bin-reference",
            GroupState::NonAsciiName => "non-ascii-name",
        };

        write!(f, "{name}")
    }
}

/// Classifies a group, the first failing check in declaration order wins.
///
/// Only the cue sheet data reference touches the filesystem, a cue sheet that
/// cannot be read is an error rather than a state.
pub async fn classify_group(group: &GameGroup) -> CdResult<GroupState> {
    if group.is_empty() {
        return Ok(GroupState::Empty);
    }

    let data_formats: HashSet<ImageFormat> = group
        .data_images()
        .filter_map(ImageFormat::from_path)
        .collect();

    if data_formats.is_empty() {
        return Ok(GroupState::NoDataTrack);
    }

    let Some(layout) = group.best_layout() else {
        return Ok(GroupState::NoLayoutTrack);
    };

    if data_formats.len() > 1 {
        return Ok(GroupState::TooManyImageFormats);
    }

    if !group.display_name().is_ascii() {
        return Ok(GroupState::NonAsciiName);
    }

    if ImageFormat::from_path(layout) == Some(ImageFormat::Cue) {
        let document = CueParser::new(layout).parse().await?;

        if !document.data_file_exists().await? {
            return Ok(GroupState::InvalidBinReference);
        }
    }

    Ok(GroupState::Ok)
}
