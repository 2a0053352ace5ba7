use std::path::Path;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lofty::prelude::*;
use lofty::picture::Picture;
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, make_display};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn picture_data_url(pic: &Picture) -> String {
    let mime = pic
        .mime_type()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    format!("data:{};base64,{}", mime, BASE64.encode(pic.data()))
}

/// Scan `dir` for audio files and return one [`Track`] per readable file.
///
/// Files whose container/metadata cannot be parsed at all are dropped from
/// the result; a scan never fails as a whole. Callers must not assume the
/// result count matches the file count.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let tagged = match lofty::read_from_path(path) {
                Ok(t) => t,
                Err(e) => {
                    // Per-file failures never fail the scan; the file is skipped.
                    log::debug!("skipping {}: {e}", path.display());
                    continue;
                }
            };

            let mut title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();
            let mut artist: Option<String> = None;
            let mut album_artist: Option<String> = None;
            let mut album: Option<String> = None;
            let mut picture: Option<String> = None;

            let props = tagged.properties();
            let duration: Option<Duration> = Some(props.duration());
            let sample_rate = props.sample_rate();
            let bit_depth = props.bit_depth();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        title = v.to_string();
                    }
                }
                if let Some(v) = tag.get_string(ItemKey::TrackArtist) {
                    let v = v.trim();
                    if !v.is_empty() {
                        artist = Some(v.to_string());
                    }
                }
                if let Some(v) = tag.get_string(ItemKey::AlbumArtist) {
                    let v = v.trim();
                    if !v.is_empty() {
                        album_artist = Some(v.to_string());
                    }
                }
                if let Some(v) = tag.get_string(ItemKey::AlbumTitle) {
                    let v = v.trim();
                    if !v.is_empty() {
                        album = Some(v.to_string());
                    }
                }
                if let Some(pic) = tag.pictures().first() {
                    picture = Some(picture_data_url(pic));
                }
            }

            let display = make_display(&title, artist.as_deref());

            tracks.push(Track {
                id: path.to_string_lossy().into_owned(),
                path: path.to_path_buf(),
                title,
                artist,
                album_artist,
                album,
                duration,
                sample_rate,
                bit_depth,
                picture,
                display,
            });
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    tracks
}
