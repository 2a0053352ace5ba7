use std::path::PathBuf;
use std::time::Duration;

/// One audio file found by the scanner.
///
/// `id` is the absolute path rendered as a string; it is what queue and
/// MPRIS identity checks compare, so two records for the same file always
/// match even when their metadata differs between scans.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: String,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    /// Preferred over `artist` for album grouping when present.
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u8>,
    /// Embedded cover art as a `data:` URL.
    pub picture: Option<String>,
    pub display: String,
}

impl Track {
    pub fn same_file(&self, other: &Track) -> bool {
        self.id == other.id
    }
}

/// Build the one-line display string used by the track list.
pub fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}
