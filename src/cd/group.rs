use crate::cd::error::{CdError, CdResult};
use crate::cd::format::{is_data_image, is_layout, is_valid_extension, quality_score};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files believed to belong to one disc. Data images come first, then layouts.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct GameGroup {
    files: Vec<PathBuf>,
}

impl GameGroup {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|file| file == path)
    }

    pub fn representative(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// File name of the representative, used in every report line.
    pub fn display_name(&self) -> String {
        self.representative()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn data_images(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .map(PathBuf::as_path)
            .filter(|file| is_data_image(file))
    }

    pub fn layouts(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .map(PathBuf::as_path)
            .filter(|file| is_layout(file))
    }

    /// Highest quality layout, the first one wins a tie.
    pub fn best_layout(&self) -> Option<&Path> {
        let mut best: Option<(&Path, u8)> = None;

        for layout in self.layouts() {
            let Ok(quality) = quality_score(layout) else {
                continue;
            };

            if best.is_none_or(|(_, best_quality)| quality > best_quality) {
                best = Some((layout, quality));
            }
        }

        best.map(|(layout, _)| layout)
    }

    /// Usually the first track is the data track.
    pub fn data_track(&self) -> Option<&Path> {
        self.data_images().min()
    }
}

/// Groups the cd image files of `folder`, optionally only those whose name starts with `partial_name`.
pub async fn scan_image_groups(
    folder: &Path,
    partial_name: Option<&str>,
) -> CdResult<Vec<GameGroup>> {
    let is_dir = fs::metadata(folder)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);

    if !is_dir {
        return Err(CdError::FolderNotFound(folder.to_path_buf()));
    }

    let folder = std::path::absolute(folder)?;
    let mut dir = fs::read_dir(&folder).await?;

    let mut data_images = Vec::new();
    let mut layouts = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if let Some(prefix) = partial_name {
            if !file_name.starts_with(prefix) {
                continue;
            }
        }

        let path = entry.path();

        if !is_valid_extension(&path) {
            debug!("Ignoring {file_name}");
        } else if is_data_image(&path) {
            data_images.push(path);
        } else if is_layout(&path) {
            layouts.push(path);
        }
    }

    let groups = build_groups(data_images, layouts);

    debug!("Built {} groups from {:?}", groups.len(), folder);

    Ok(groups)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Correlates data images to layout files sharing their base name.
///
/// Layouts are clustered by exact stem, so `Game.cue` and `Game.ccd` end up
/// together. Each cluster claims the unclaimed data images whose file name starts
/// with its stem. Longer stems claim first, which keeps `Game 2 (Track 1).bin`
/// away from a `Game.cue` sitting in the same folder. Leftover data images become
/// singleton groups. The result does not depend on the input order.
pub fn build_groups(mut data_images: Vec<PathBuf>, mut layouts: Vec<PathBuf>) -> Vec<GameGroup> {
    data_images.sort();
    layouts.sort();

    let mut clusters: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for layout in layouts {
        clusters.entry(file_stem(&layout)).or_default().push(layout);
    }

    let mut stems: Vec<&String> = clusters.keys().collect();
    stems.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut claimed = vec![false; data_images.len()];
    let mut groups = Vec::with_capacity(clusters.len());

    for stem in stems {
        let mut files: Vec<PathBuf> = Vec::new();

        for (index, data_image) in data_images.iter().enumerate() {
            if !claimed[index] && file_name(data_image).starts_with(stem.as_str()) {
                claimed[index] = true;
                files.push(data_image.clone());
            }
        }

        files.extend(clusters[stem].iter().cloned());
        groups.push(GameGroup::new(files));
    }

    groups.extend(
        data_images
            .into_iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(data_image, _)| GameGroup::new(vec![data_image])),
    );

    groups.sort_by(|a, b| a.representative().cmp(&b.representative()));

    groups
}
