//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::audio::{PlaybackInfo, QueueSnapshot};
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("tab".to_string(), "tracks/albums/artists".to_string());
    map.insert("enter".to_string(), "play selection".to_string());
    map.insert("a".to_string(), "add to queue".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "jump to %".to_string());
    map.insert("/".to_string(), "filter".to_string());
    map.insert("o".to_string(), "open folder".to_string());
    map.insert("R".to_string(), "rescan".to_string());
    map.insert("u".to_string(), "queue".to_string());
    map.insert("K".to_string(), "metadata".to_string());
    map.insert("S".to_string(), "streaming".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "enter", "a", "space/p", "h/l", "H/L", "0-9", "u", "K", "/", "o", "R", "S",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(app: &App, playback: &PlaybackInfo) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" VIEW: {}", app.view.title()));

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    if let Some(prompt) = &app.prompt {
        parts.push(format!("OPEN: {prompt}_"));
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    match &playback.track {
        Some(track) => {
            let time = match playback.duration {
                Some(total) => format!(
                    "{} / {}",
                    format_mmss(playback.position),
                    format_mmss(total)
                ),
                None => format_mmss(playback.position),
            };
            parts.push(format!("Song: {} [{}]", track.display, time));
            parts.push(if playback.playing { "Playing" } else { "Paused" }.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    if let Some(err) = &playback.error {
        parts.push(format!("ERROR: {err}"));
    }

    if app.streaming.logged_in() {
        parts.push("Streaming: logged-in".to_string());
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    parts.join(" • ")
}

fn hires_line(track: &crate::library::Track) -> String {
    let rate = track
        .sample_rate
        .map(|r| format!("{:.1} kHz", f64::from(r) / 1000.0))
        .unwrap_or_else(|| "-".to_string());
    let depth = track
        .bit_depth
        .map(|b| format!("{b}-bit"))
        .unwrap_or_else(|| "-".to_string());
    format!("{rate} / {depth}")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" fermata ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let playback = app
        .playback_handle
        .as_ref()
        .and_then(|h| h.lock().ok().map(|info| info.clone()))
        .unwrap_or_default();

    let status_par = Paragraph::new(status_text(app, &playback))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        let q = app.filter_query.trim();

        // Center the selected item when possible by creating a visible window.
        // Important: only build ListItems for the visible window (avoid
        // allocating the entire list).
        let total = display.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let label = app.label_for(i);
                if q.is_empty() {
                    ListItem::new(label)
                } else if let Some(positions) = App::fuzzy_match_positions(&label, q) {
                    // Uppercase the matched characters so the hit is visible.
                    let mut rendered = String::new();
                    let mut pos_iter = positions.into_iter();
                    let mut next_pos = pos_iter.next();

                    for (ci, ch) in label.chars().enumerate() {
                        if next_pos == Some(ci) {
                            for up in ch.to_uppercase() {
                                rendered.push(up);
                            }
                            next_pos = pos_iter.next();
                        } else {
                            rendered.push(ch);
                        }
                    }
                    ListItem::new(rendered)
                } else {
                    ListItem::new(label)
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", app.view.title())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay queue popup (keeps list visible under it)
    if app.queue_window {
        let list_area = chunks[2];
        let popup_area = centered_rect_sized(60, 14, list_area);
        frame.render_widget(Clear, popup_area);

        let snapshot = app
            .queue_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|q| q.clone()))
            .unwrap_or_else(QueueSnapshot::default);

        let lines: Vec<ListItem> = if snapshot.tracks.is_empty() {
            vec![ListItem::new("queue is empty")]
        } else {
            snapshot
                .tracks
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let marker = if snapshot.cursor == Some(i) { ">" } else { " " };
                    ListItem::new(format!("{marker} {:2}. {}", i + 1, t.display))
                })
                .collect()
        };

        let queue_list = List::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" queue (u closes) "),
        );
        frame.render_widget(queue_list, popup_area);
    }

    // Overlay metadata popup
    if app.metadata_window {
        let list_area = chunks[2];
        let popup_area = centered_rect_sized(72, 10, list_area);
        frame.render_widget(Clear, popup_area);

        let track = app.selected_track();
        let meta = if let Some(track) = track {
            let dur = track
                .duration
                .map(format_mmss)
                .unwrap_or_else(|| "-".to_string());
            format!(
                "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nQuality: {}\nCover: {}\nPath: {}",
                track.title,
                track.artist.as_deref().unwrap_or("-"),
                track.album.as_deref().unwrap_or("-"),
                dur,
                hires_line(track),
                if track.picture.is_some() {
                    "embedded"
                } else {
                    "none"
                },
                track.path.display()
            )
        } else {
            "No track selected".to_string()
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
