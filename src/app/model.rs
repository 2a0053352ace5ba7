//! Application model types: `App`, `View` and `PlaybackState`.

use crate::audio::{PlaybackHandle, QueueHandle};
use crate::library::{Catalog, Track};
use crate::streaming::StreamingClient;

/// The playback state of the application.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Which library view the list shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Tracks,
    Albums,
    Artists,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Tracks => "tracks",
            View::Albums => "albums",
            View::Artists => "artists",
        }
    }
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub catalog: Catalog,
    pub view: View,
    /// Index into the current view's base list (tracks/albums/artists).
    pub selected: usize,
    pub playback: PlaybackState,
    pub playback_handle: Option<PlaybackHandle>,
    pub queue_handle: Option<QueueHandle>,

    pub follow_playback: bool,

    pub filter_mode: bool,
    pub filter_query: String,

    /// Open-folder prompt buffer; `Some` while the prompt is showing.
    pub prompt: Option<String>,

    pub current_dir: Option<String>,
    pub metadata_window: bool,
    pub queue_window: bool,

    pub streaming: StreamingClient,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        let catalog = Catalog::build(&tracks);
        Self {
            tracks,
            catalog,
            view: View::Tracks,
            selected: 0,
            playback: PlaybackState::Stopped,
            playback_handle: None,
            queue_handle: None,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
            prompt: None,
            current_dir: None,
            metadata_window: false,
            queue_window: false,
            streaming: StreamingClient::default(),
        }
    }

    /// Replace the library wholesale (open-folder or rescan).
    pub fn set_library(&mut self, tracks: Vec<Track>) {
        self.catalog = Catalog::build(&tracks);
        self.tracks = tracks;
        self.selected = 0;
        self.filter_query.clear();
        self.filter_mode = false;
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Attach the shared queue snapshot handle.
    pub fn set_queue_handle(&mut self, h: QueueHandle) {
        self.queue_handle = Some(h);
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Number of entries in the current view's base list.
    pub fn base_len(&self) -> usize {
        match self.view {
            View::Tracks => self.tracks.len(),
            View::Albums => self.catalog.albums.len(),
            View::Artists => self.catalog.artists.len(),
        }
    }

    /// The list label for base index `i` in the current view.
    pub fn label_for(&self, i: usize) -> String {
        match self.view {
            View::Tracks => self
                .tracks
                .get(i)
                .map(|t| t.display.clone())
                .unwrap_or_default(),
            View::Albums => self
                .catalog
                .albums
                .get(i)
                .map(|a| format!("{} - {} ({})", a.artist, a.title, a.track_ids.len()))
                .unwrap_or_default(),
            View::Artists => self
                .catalog
                .artists
                .get(i)
                .map(|a| {
                    format!(
                        "{} ({} albums, {} tracks)",
                        a.name,
                        a.album_count,
                        a.track_ids.len()
                    )
                })
                .unwrap_or_default(),
        }
    }

    /// Base indices visible under the current filter, in list order.
    pub fn display_rows(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        let base = 0..self.base_len();
        if query.is_empty() {
            base.collect()
        } else {
            base.filter(|&i| Self::fuzzy_match_positions(&self.label_for(i), query).is_some())
                .collect()
        }
    }

    /// Cycle Tracks -> Albums -> Artists -> Tracks.
    pub fn cycle_view(&mut self) {
        self.view = match self.view {
            View::Tracks => View::Albums,
            View::Albums => View::Artists,
            View::Artists => View::Tracks,
        };
        self.selected = 0;
        self.ensure_selected_visible();
    }

    /// Selected track in the Tracks view.
    pub fn selected_track(&self) -> Option<&Track> {
        match self.view {
            View::Tracks => self.tracks.get(self.selected),
            _ => None,
        }
    }

    /// Resolve the selected row to the track list it stands for: the track
    /// itself, the album's tracks or the artist's tracks. Slots are
    /// `Option` because catalog indices can dangle across a rescan; the
    /// queue compacts them.
    pub fn selected_row_tracks(&self) -> Vec<Option<Track>> {
        match self.view {
            View::Tracks => vec![self.tracks.get(self.selected).cloned()],
            View::Albums => self
                .catalog
                .albums
                .get(self.selected)
                .map(|a| {
                    a.track_ids
                        .iter()
                        .map(|&i| self.tracks.get(i).cloned())
                        .collect()
                })
                .unwrap_or_default(),
            View::Artists => self
                .catalog
                .artists
                .get(self.selected)
                .map(|a| {
                    a.track_ids
                        .iter()
                        .map(|&i| self.tracks.get(i).cloned())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Move the selection to the track with the given id, if visible in
    /// the Tracks view. Used by follow-playback.
    pub fn select_track_by_id(&mut self, id: &str) -> bool {
        if self.view != View::Tracks {
            return false;
        }
        if let Some(i) = self.tracks.iter().position(|t| t.id == id) {
            if self.display_rows().contains(&i) {
                self.selected = i;
                return true;
            }
        }
        false
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn toggle_queue_window(&mut self) {
        self.queue_window = !self.queue_window;
    }

    // Fuzzy/subsequence match: return the character positions (by char
    // index) in `label` that match the query, or None if not matched.
    pub fn fuzzy_match_positions(label: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut label_iter = label.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match label_iter.next() {
                    Some((li, lc)) if lc.to_ascii_lowercase() == qc_low => {
                        positions.push(li);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode: enable filtering and adjust cursor behavior.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    /// Exit filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible row.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_rows();
        if display.is_empty() {
            self.selected = 0;
            return;
        }
        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible row, wrapping at the end.
    pub fn next(&mut self) {
        let display = self.display_rows();
        if display.is_empty() {
            return;
        }
        let pos = display.iter().position(|&i| i == self.selected);
        self.selected = match pos {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible row, wrapping at the start.
    pub fn prev(&mut self) {
        let display = self.display_rows();
        if display.is_empty() {
            return;
        }
        let pos = display.iter().position(|&i| i == self.selected);
        self.selected = match pos {
            Some(0) | None => display[display.len() - 1],
            Some(p) => display[p - 1],
        };
    }
}
