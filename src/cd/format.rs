use crate::cd::error::{CdError, CdResult};
use std::path::Path;

/// Every extension the grouping scan knows about.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    Iso,
    Bin,
    Img,
    Cue,
    Ccd,
    Sub,
}

/// What a file is used for inside a game group.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FileRole {
    DataImage,
    LayoutDescriptor,
    Ancillary,
    Invalid,
}

impl ImageFormat {
    /// Accepts the extension with or without its leading dot, in any case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);

        match ext.to_ascii_lowercase().as_str() {
            "iso" => Some(ImageFormat::Iso),
            "bin" => Some(ImageFormat::Bin),
            "img" => Some(ImageFormat::Img),
            "cue" => Some(ImageFormat::Cue),
            "ccd" => Some(ImageFormat::Ccd),
            "sub" => Some(ImageFormat::Sub),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn role(self) -> FileRole {
        match self {
            ImageFormat::Iso | ImageFormat::Bin | ImageFormat::Img => FileRole::DataImage,
            ImageFormat::Cue | ImageFormat::Ccd => FileRole::LayoutDescriptor,
            ImageFormat::Sub => FileRole::Ancillary,
        }
    }

    /// Tie-breaker between files of the same role, higher wins.
    pub fn quality(self) -> u8 {
        match self {
            ImageFormat::Cue => 100,
            ImageFormat::Bin | ImageFormat::Iso => 70,
            ImageFormat::Ccd => 40,
            ImageFormat::Img => 30,
            ImageFormat::Sub => 0,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Iso => "iso",
            ImageFormat::Bin => "bin",
            ImageFormat::Img => "img",
            ImageFormat::Cue => "cue",
            ImageFormat::Ccd => "ccd",
            ImageFormat::Sub => "sub",
        }
    }
}

pub fn classify_extension(ext: &str) -> FileRole {
    ImageFormat::from_extension(ext)
        .map(ImageFormat::role)
        .unwrap_or(FileRole::Invalid)
}

fn classify_path(path: &Path) -> FileRole {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(classify_extension)
        .unwrap_or(FileRole::Invalid)
}

pub fn is_data_image(path: &Path) -> bool {
    classify_path(path) == FileRole::DataImage
}

pub fn is_layout(path: &Path) -> bool {
    classify_path(path) == FileRole::LayoutDescriptor
}

pub fn is_valid_extension(path: &Path) -> bool {
    classify_path(path) != FileRole::Invalid
}

pub fn quality_score(path: &Path) -> CdResult<u8> {
    ImageFormat::from_path(path)
        .map(ImageFormat::quality)
        .ok_or_else(|| {
            CdError::UnsupportedExtension(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ALL: [&str; 6] = ["iso", "bin", "img", "cue", "ccd", "sub"];

    #[test]
    fn classify_extension_is_case_insensitive() {
        assert_eq!(classify_extension("BIN"), FileRole::DataImage);
        assert_eq!(classify_extension(".Cue"), FileRole::LayoutDescriptor);
        assert_eq!(classify_extension("sUb"), FileRole::Ancillary);
        assert_eq!(classify_extension("CcD"), classify_extension("ccd"));
    }

    #[test]
    fn unknown_extensions_are_invalid() {
        assert_eq!(classify_extension("chd"), FileRole::Invalid);
        assert_eq!(classify_extension(""), FileRole::Invalid);
        assert_eq!(classify_extension("bin.bak"), FileRole::Invalid);
        assert!(!is_valid_extension(Path::new("readme.txt")));
        assert!(!is_valid_extension(Path::new("no_extension")));
    }

    #[test]
    fn data_images_and_layouts_do_not_overlap() {
        for ext in ALL {
            let path = PathBuf::from(format!("Game.{ext}"));
            assert!(is_valid_extension(&path), "{ext} should be valid");
            assert!(
                !(is_data_image(&path) && is_layout(&path)),
                "{ext} classified as both"
            );
        }

        assert!(is_data_image(Path::new("a.iso")));
        assert!(is_data_image(Path::new("a.img")));
        assert!(is_layout(Path::new("a.ccd")));
        assert!(!is_layout(Path::new("a.sub")));
        assert!(!is_data_image(Path::new("a.sub")));
    }

    #[test]
    fn quality_score_follows_the_fixed_table() {
        assert_eq!(quality_score(Path::new("a.cue")).unwrap(), 100);
        assert_eq!(quality_score(Path::new("a.BIN")).unwrap(), 70);
        assert_eq!(quality_score(Path::new("a.iso")).unwrap(), 70);
        assert_eq!(quality_score(Path::new("a.ccd")).unwrap(), 40);
        assert_eq!(quality_score(Path::new("a.img")).unwrap(), 30);
        assert_eq!(quality_score(Path::new("a.sub")).unwrap(), 0);
    }

    #[test]
    fn quality_score_rejects_unknown_extensions() {
        let err = quality_score(Path::new("a.zip")).unwrap_err();
        assert!(matches!(err, CdError::UnsupportedExtension(ext) if ext == "zip"));
    }
}
