use super::*;
use crate::library::Track;
use std::path::PathBuf;

fn t(title: &str, artist: Option<&str>, album: Option<&str>) -> Track {
    Track {
        id: format!("/m/{title}"),
        path: PathBuf::from(format!("/m/{title}")),
        title: title.into(),
        artist: artist.map(str::to_string),
        album_artist: None,
        album: album.map(str::to_string),
        duration: None,
        sample_rate: None,
        bit_depth: None,
        picture: None,
        display: title.into(),
    }
}

fn library() -> Vec<Track> {
    vec![
        t("Alpha", Some("Ann"), Some("One")),
        t("Beta", Some("Ann"), Some("One")),
        t("Gamma", Some("Bob"), Some("Two")),
        t("Delta", Some("Bob"), Some("Three")),
    ]
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert!(App::fuzzy_match_positions(title, "hw").is_some());
    assert!(App::fuzzy_match_positions(title, "ello").is_some());
    assert!(App::fuzzy_match_positions(title, "xyz").is_none());
}

#[test]
fn display_rows_uses_fuzzy_not_substring_only() {
    let tracks = vec![
        t("Metallica - Blackened", None, None),
        t("Black Sabbath - Paranoid", None, None),
    ];
    let mut app = App::new(tracks);
    app.filter_query = "mtbk".into();
    assert_eq!(app.display_rows(), vec![0]);
}

#[test]
fn display_rows_respects_filter_per_view() {
    let mut app = App::new(library());

    app.filter_query = "ta".into(); // Beta, Gamma(? g-a-m-m-a has no t), Delta
    let rows = app.display_rows();
    assert_eq!(rows, vec![1, 3]);

    // Albums view filters on "Artist - Album (n)" labels.
    app.clear_filter();
    app.cycle_view();
    assert_eq!(app.view, View::Albums);
    assert_eq!(app.base_len(), 3);
    app.filter_query = "bob".into();
    let album_rows = app.display_rows();
    assert!(!album_rows.is_empty());
    for i in album_rows {
        assert!(app.label_for(i).starts_with("Bob"));
    }
}

#[test]
fn cycle_view_wraps_and_resets_selection() {
    let mut app = App::new(library());
    app.selected = 2;

    app.cycle_view();
    assert_eq!(app.view, View::Albums);
    assert_eq!(app.selected, 0);
    app.cycle_view();
    assert_eq!(app.view, View::Artists);
    app.cycle_view();
    assert_eq!(app.view, View::Tracks);
}

#[test]
fn selected_row_tracks_resolves_albums_to_their_tracks() {
    let mut app = App::new(library());
    app.cycle_view();

    let one = app
        .catalog
        .albums
        .iter()
        .position(|a| a.title == "One")
        .unwrap();
    app.selected = one;

    let list = app.selected_row_tracks();
    let titles: Vec<&str> = list
        .iter()
        .flatten()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);
}

#[test]
fn selected_row_tracks_in_tracks_view_is_the_selection() {
    let mut app = App::new(library());
    app.selected = 2;
    let list = app.selected_row_tracks();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].as_ref().unwrap().title, "Gamma");
}

#[test]
fn select_track_by_id_only_applies_in_tracks_view() {
    let mut app = App::new(library());
    assert!(app.select_track_by_id("/m/Gamma"));
    assert_eq!(app.selected, 2);

    app.cycle_view();
    assert!(!app.select_track_by_id("/m/Alpha"));

    app.cycle_view();
    app.cycle_view();
    // Filtered out: not selectable.
    app.filter_query = "zzz".into();
    assert!(!app.select_track_by_id("/m/Alpha"));
}

#[test]
fn next_prev_wrap_within_visible_rows() {
    let mut app = App::new(library());
    app.filter_query = "ta".into(); // Beta(1), Delta(3)
    app.selected = 1;

    app.next();
    assert_eq!(app.selected, 3);
    app.next();
    assert_eq!(app.selected, 1);
    app.prev();
    assert_eq!(app.selected, 3);
}

#[test]
fn filter_editing_keeps_selection_visible() {
    let mut app = App::new(library());
    app.selected = 0; // Alpha

    app.enter_filter_mode();
    app.push_filter_char('t');
    app.push_filter_char('a');
    // Alpha no longer visible: selection snaps to the first match.
    assert_eq!(app.selected, 1);

    app.clear_filter();
    assert!(!app.filter_mode);
    assert!(app.filter_query.is_empty());
}

#[test]
fn set_library_rebuilds_catalog_and_resets_state() {
    let mut app = App::new(library());
    app.selected = 3;
    app.filter_query = "ta".into();

    app.set_library(vec![t("Omega", Some("Zed"), Some("Z"))]);
    assert_eq!(app.tracks.len(), 1);
    assert_eq!(app.catalog.albums.len(), 1);
    assert_eq!(app.selected, 0);
    assert!(app.filter_query.is_empty());
}
