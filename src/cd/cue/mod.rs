use crate::cd::cue::error::{CueError, CueResult};
use crate::cd::cue::models::{CueFile, CueSheet, FileType, Track, TrackType};
use crate::util::temp_sibling;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;

lazy_static! {
    static ref FILE_ENTRY: Regex = Regex::new(r#"^FILE\s+"(.*)"\s+(\S+)\s*$"#).unwrap();
    static ref TRACK_ENTRY: Regex = Regex::new(r"^TRACK\s+(\d+)\s+(\S+)").unwrap();
}

pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> CueResult<CueDocument> {
        debug!("Parsing CUE file: {:?}", self.cue_path);

        let text = tokio::fs::read_to_string(&self.cue_path).await?;
        let sheet = parse_cue_sheet(&text)?;

        for file in &sheet.files {
            let tracks: Vec<u32> = file.tracks.iter().map(|track| track.number).collect();
            debug!("{} ({:?}): tracks {tracks:?}", file.filename, file.file_type);
        }

        Ok(CueDocument {
            path: self.cue_path.clone(),
            text,
            sheet,
        })
    }
}

/// Parses the FILE and TRACK statements of a cue sheet, every other line is ignored.
pub fn parse_cue_sheet(text: &str) -> CueResult<CueSheet> {
    let mut cue_sheet = CueSheet::default();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim_start_matches('\u{feff}').trim();

        if line.starts_with("FILE") {
            let captures =
                FILE_ENTRY
                    .captures(line)
                    .ok_or_else(|| CueError::MalformedFileEntry {
                        line: line_number,
                        content: line.to_string(),
                    })?;

            cue_sheet.files.push(CueFile {
                filename: captures[1].to_string(),
                file_type: FileType::parse(&captures[2]),
                tracks: Vec::new(),
            });
        } else if line.starts_with("TRACK") {
            let malformed = || CueError::MalformedTrackEntry {
                line: line_number,
                content: line.to_string(),
            };

            let captures = TRACK_ENTRY.captures(line).ok_or_else(malformed)?;
            let number = captures[1].parse::<u32>().map_err(|_| malformed())?;

            let file = cue_sheet
                .files
                .last_mut()
                .ok_or(CueError::TrackWithoutFile { line: line_number })?;

            file.tracks.push(Track {
                number,
                track_type: TrackType::parse(&captures[2]),
            });
        }
    }

    Ok(cue_sheet)
}

/// Minimal cue sheet for a lone data image: one file, one MODE2/2352 track.
pub fn synthesize_for_data_file(data_file_name: &str) -> String {
    format!("FILE \"{data_file_name}\" BINARY\r\n  TRACK 01 MODE2/2352\r\n    INDEX 01 00:00:00\r\n")
}

/// Writes a synthesized cue sheet for `data_file` to `cue_path`.
pub async fn write_cue_for_data_file(cue_path: &Path, data_file: &Path) -> CueResult<()> {
    let data_file_name = data_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    write_atomically(cue_path, &synthesize_for_data_file(&data_file_name)).await
}

async fn write_atomically(path: &Path, contents: &str) -> CueResult<()> {
    let temp_path = temp_sibling(path);

    tokio::fs::write(&temp_path, contents).await?;

    if let Err(err) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(err.into());
    }

    Ok(())
}

/// A parsed cue sheet together with the text and location it was read from.
#[derive(Debug, Clone)]
pub struct CueDocument {
    path: PathBuf,
    text: String,
    sheet: CueSheet,
}

impl CueDocument {
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    pub fn first_data_file(&self) -> CueResult<&CueFile> {
        self.sheet
            .first_data_file()
            .ok_or_else(|| CueError::NoDataTrack(self.path.clone()))
    }

    pub async fn exists_in_folder(&self, folder: &Path) -> CueResult<bool> {
        let data_file = folder.join(&self.first_data_file()?.filename);

        Ok(tokio::fs::try_exists(&data_file).await?)
    }

    /// Same as [`Self::exists_in_folder`] for the folder holding the cue sheet.
    pub async fn data_file_exists(&self) -> CueResult<bool> {
        self.exists_in_folder(self.folder()).await
    }

    /// Points the data track at `new_name`, rewriting the cue sheet on disk.
    pub async fn rename_data_file(&mut self, new_name: &str) -> CueResult<()> {
        let old_name = self.first_data_file()?.filename.clone();

        if old_name == new_name {
            return Ok(());
        }

        let rewritten = self
            .text
            .replace(&format!("\"{old_name}\""), &format!("\"{new_name}\""));

        write_atomically(&self.path, &rewritten).await?;

        debug!("Rewrote {:?}: {old_name} -> {new_name}", self.path);

        self.text = rewritten;
        self.sheet.rename_first_data_file(new_name);

        Ok(())
    }
}
