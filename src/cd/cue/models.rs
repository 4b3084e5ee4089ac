// src/cd/cue/models
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CueSheet {
    pub files: Vec<CueFile>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CueFile {
    pub filename: String,
    pub file_type: FileType,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Track {
    pub number: u32,
    pub track_type: TrackType,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
    Other(String),
}

impl TrackType {
    pub fn parse(type_str: &str) -> Self {
        match type_str {
            "AUDIO" => TrackType::Audio,
            "CDG" => TrackType::CdG,
            "MODE1/2048" => TrackType::Mode1_2048,
            "MODE1/2352" => TrackType::Mode1_2352,
            "MODE2/2336" => TrackType::Mode2_2336,
            "MODE2/2352" => TrackType::Mode2_2352,
            "CDI/2336" => TrackType::CdI2336,
            "CDI/2352" => TrackType::CdI2352,
            other => TrackType::Other(other.to_string()),
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, TrackType::Audio)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FileType {
    Binary,
    Motorola,
    Aiff,
    Wave,
    Mp3,
    Other(String),
}

impl FileType {
    pub fn parse(type_str: &str) -> Self {
        match type_str {
            "BINARY" => FileType::Binary,
            "MOTOROLA" => FileType::Motorola,
            "AIFF" => FileType::Aiff,
            "WAVE" => FileType::Wave,
            "MP3" => FileType::Mp3,
            other => FileType::Other(other.to_string()),
        }
    }
}

impl CueSheet {
    /// First referenced file that carries at least one non-audio track.
    pub fn first_data_file(&self) -> Option<&CueFile> {
        self.files
            .iter()
            .find(|file| file.tracks.iter().any(|track| !track.track_type.is_audio()))
    }

    fn first_data_file_mut(&mut self) -> Option<&mut CueFile> {
        self.files
            .iter_mut()
            .find(|file| file.tracks.iter().any(|track| !track.track_type.is_audio()))
    }

    pub(crate) fn rename_first_data_file(&mut self, new_name: &str) -> Option<String> {
        let file = self.first_data_file_mut()?;
        Some(std::mem::replace(&mut file.filename, new_name.to_string()))
    }
}
