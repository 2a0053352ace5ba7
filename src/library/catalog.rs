use std::collections::HashMap;

use super::model::Track;

/// Case/punctuation-insensitive key used to group albums and artists
/// despite inconsistent tagging.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// First name in a raw artist string, cut at the usual collaboration
/// markers ("feat.", "ft.", "&", ",", " x ", "/").
pub fn primary_artist(raw: &str) -> String {
    let base = raw.trim();
    let lower = base.to_lowercase();
    let mut cut = base.len();
    for marker in ["feat.", "ft.", ",", "&", " x ", "/"] {
        if let Some(i) = lower.find(marker) {
            cut = cut.min(i);
        }
    }
    let head = base.get(..cut).map(str::trim).unwrap_or("");
    if head.is_empty() {
        base.to_string()
    } else {
        head.to_string()
    }
}

/// Artist used for grouping a track: the primary name from the album
/// artist when tagged, otherwise from the track artist.
pub fn primary_artist_for(track: &Track) -> String {
    let raw = track
        .album_artist
        .as_deref()
        .or(track.artist.as_deref())
        .unwrap_or("");
    let name = primary_artist(raw);
    if name.is_empty() {
        "Unknown Artist".to_string()
    } else {
        name
    }
}

#[derive(Clone, Debug)]
pub struct Album {
    pub title: String,
    pub artist: String,
    pub album_key: String,
    pub artist_key: String,
    pub cover: Option<String>,
    /// Indices into the scanned track list, in scan order.
    pub track_ids: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct Artist {
    pub name: String,
    pub key: String,
    pub cover: Option<String>,
    pub album_count: usize,
    pub track_ids: Vec<usize>,
}

/// Album/artist views derived from one scan result.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
}

impl Catalog {
    pub fn build(tracks: &[Track]) -> Self {
        let mut albums: HashMap<String, Album> = HashMap::new();
        let mut artists: HashMap<String, (Artist, HashMap<String, ()>)> = HashMap::new();

        for (i, t) in tracks.iter().enumerate() {
            let album_title = t.album.clone().unwrap_or_else(|| "Unknown Album".to_string());
            let artist_name = primary_artist_for(t);
            let album_key = normalize(&album_title);
            let artist_key = normalize(&artist_name);

            let entry = albums
                .entry(format!("{album_key}__{artist_key}"))
                .or_insert_with(|| Album {
                    title: album_title.clone(),
                    artist: artist_name.clone(),
                    album_key: album_key.clone(),
                    artist_key: artist_key.clone(),
                    cover: None,
                    track_ids: Vec::new(),
                });
            if entry.cover.is_none() {
                entry.cover = t.picture.clone();
            }
            entry.track_ids.push(i);

            let (artist, seen_albums) =
                artists.entry(artist_key.clone()).or_insert_with(|| {
                    (
                        Artist {
                            name: artist_name.clone(),
                            key: artist_key.clone(),
                            cover: None,
                            album_count: 0,
                            track_ids: Vec::new(),
                        },
                        HashMap::new(),
                    )
                });
            if artist.cover.is_none() {
                artist.cover = t.picture.clone();
            }
            seen_albums.entry(album_key).or_insert(());
            artist.track_ids.push(i);
        }

        let mut albums: Vec<Album> = albums.into_values().collect();
        albums.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

        let mut artists: Vec<Artist> = artists
            .into_values()
            .map(|(mut a, seen)| {
                a.album_count = seen.len();
                a
            })
            .collect();
        artists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Self { albums, artists }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn t(title: &str, artist: Option<&str>, album_artist: Option<&str>, album: Option<&str>) -> Track {
        Track {
            id: format!("/music/{title}.flac"),
            path: PathBuf::from(format!("/music/{title}.flac")),
            title: title.to_string(),
            artist: artist.map(str::to_string),
            album_artist: album_artist.map(str::to_string),
            album: album.map(str::to_string),
            duration: None,
            sample_rate: None,
            bit_depth: None,
            picture: None,
            display: title.to_string(),
        }
    }

    #[test]
    fn normalize_folds_case_and_punctuation() {
        assert_eq!(normalize("Some-Album: Deluxe!"), "some album deluxe");
        assert_eq!(normalize("  spaced   out  "), "spaced out");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn primary_artist_cuts_at_collaboration_markers() {
        assert_eq!(primary_artist("Alpha feat. Beta"), "Alpha");
        assert_eq!(primary_artist("Alpha Ft. Beta"), "Alpha");
        assert_eq!(primary_artist("Alpha & Beta"), "Alpha");
        assert_eq!(primary_artist("Alpha, Beta, Gamma"), "Alpha");
        assert_eq!(primary_artist("Alpha x Beta"), "Alpha");
        assert_eq!(primary_artist("Alpha/Beta"), "Alpha");
        assert_eq!(primary_artist("  Alpha  "), "Alpha");
        // A marker with nothing before it keeps the raw string.
        assert_eq!(primary_artist("& Friends"), "& Friends");
    }

    #[test]
    fn albums_group_by_title_and_primary_album_artist() {
        let tracks = vec![
            t("one", Some("Alpha feat. Beta"), None, Some("First")),
            t("two", Some("Alpha"), None, Some("first")),
            t("three", Some("Gamma"), None, Some("First")),
            t("four", Some("Alpha"), None, None),
        ];
        let catalog = Catalog::build(&tracks);

        assert_eq!(catalog.albums.len(), 3);
        let first_by_alpha = catalog
            .albums
            .iter()
            .find(|a| a.artist_key == "alpha" && a.album_key == "first")
            .unwrap();
        // Differently-cased album names and feat-credits land in one group.
        assert_eq!(first_by_alpha.track_ids, vec![0, 1]);

        let unknown = catalog
            .albums
            .iter()
            .find(|a| a.title == "Unknown Album")
            .unwrap();
        assert_eq!(unknown.track_ids, vec![3]);
    }

    #[test]
    fn artists_prefer_album_artist_and_count_albums() {
        let tracks = vec![
            t("one", Some("Alpha feat. Beta"), Some("Alpha"), Some("First")),
            t("two", Some("Beta"), Some("Alpha"), Some("Second")),
            t("three", Some("Beta"), None, Some("Third")),
        ];
        let catalog = Catalog::build(&tracks);

        assert_eq!(catalog.artists.len(), 2);
        let alpha = catalog.artists.iter().find(|a| a.key == "alpha").unwrap();
        assert_eq!(alpha.track_ids, vec![0, 1]);
        assert_eq!(alpha.album_count, 2);
        let beta = catalog.artists.iter().find(|a| a.key == "beta").unwrap();
        assert_eq!(beta.track_ids, vec![2]);
    }
}
