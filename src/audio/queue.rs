//! The flat playback queue: an ordered track list plus a cursor.

use crate::library::Track;

/// Ordered queue and cursor. The cursor is `None` until a queue is
/// installed and only ever points at a valid index afterwards.
///
/// Entries arrive as `Option<Track>` because callers build lists from
/// fallible catalog lookups; dangling slots are compacted out here.
#[derive(Clone, Debug, Default)]
pub struct TrackQueue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl TrackQueue {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.tracks.get(c))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Replace the queue wholesale and reset the cursor to the head.
    /// Returns `false` (and changes nothing) when nothing playable remains
    /// after compaction.
    pub fn replace(&mut self, list: Vec<Option<Track>>) -> bool {
        let compact: Vec<Track> = list.into_iter().flatten().collect();
        if compact.is_empty() {
            return false;
        }
        self.tracks = compact;
        self.cursor = Some(0);
        true
    }

    /// Append without touching the cursor or current playback.
    pub fn append(&mut self, list: Vec<Option<Track>>) -> usize {
        let before = self.tracks.len();
        self.tracks.extend(list.into_iter().flatten());
        self.tracks.len() - before
    }

    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t.same_file(track))
    }

    /// Move the cursor to `index` if it is valid.
    pub fn select(&mut self, index: usize) -> Option<&Track> {
        if index < self.tracks.len() {
            self.cursor = Some(index);
            self.tracks.get(index)
        } else {
            None
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.tracks.len())
    }

    /// Advance to the next track, if there is one.
    pub fn advance(&mut self) -> Option<&Track> {
        match self.cursor {
            Some(c) if c + 1 < self.tracks.len() => {
                self.cursor = Some(c + 1);
                self.tracks.get(c + 1)
            }
            _ => None,
        }
    }

    /// Step back to the previous track. At the head this returns `None`;
    /// the caller restarts the current track instead of wrapping.
    pub fn retreat(&mut self) -> Option<&Track> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.tracks.get(c - 1)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn t(name: &str) -> Track {
        Track {
            id: format!("/m/{name}"),
            path: PathBuf::from(format!("/m/{name}")),
            title: name.to_string(),
            artist: None,
            album_artist: None,
            album: None,
            duration: None,
            sample_rate: None,
            bit_depth: None,
            picture: None,
            display: name.to_string(),
        }
    }

    #[test]
    fn replace_compacts_missing_entries_and_resets_cursor() {
        let mut q = TrackQueue::default();
        assert!(q.replace(vec![None, Some(t("x")), None]));
        assert_eq!(q.len(), 1);
        assert_eq!(q.cursor(), Some(0));
        assert_eq!(q.current().unwrap().title, "x");
    }

    #[test]
    fn replace_with_nothing_playable_is_a_noop() {
        let mut q = TrackQueue::default();
        q.replace(vec![Some(t("a"))]);
        assert!(!q.replace(vec![None, None]));
        assert_eq!(q.len(), 1);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn append_keeps_cursor_in_place() {
        let mut q = TrackQueue::default();
        q.replace(vec![Some(t("a"))]);
        let added = q.append(vec![Some(t("b")), None, Some(t("c"))]);
        assert_eq!(added, 2);
        assert_eq!(q.len(), 3);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn advance_and_retreat_stay_in_bounds() {
        let mut q = TrackQueue::default();
        q.replace(vec![Some(t("a")), Some(t("b"))]);

        assert!(q.has_next());
        assert_eq!(q.advance().unwrap().title, "b");
        assert!(!q.has_next());
        assert!(q.advance().is_none());
        assert_eq!(q.cursor(), Some(1));

        assert_eq!(q.retreat().unwrap().title, "a");
        assert!(q.retreat().is_none());
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn position_of_matches_by_file_identity() {
        let mut q = TrackQueue::default();
        q.replace(vec![Some(t("a")), Some(t("b"))]);

        let mut other = t("b");
        other.title = "renamed".to_string();
        assert_eq!(q.position_of(&other), Some(1));
        assert_eq!(q.position_of(&t("zzz")), None);
    }
}
