use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PlaybackState, View};
use crate::audio::{AudioPlayer, PlayerCmd};
use crate::config;
use crate::library;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::state::{self, PersistedState};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known playing track id as emitted to MPRIS.
    pub last_mpris_track: Option<String>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
    /// Last-known playing track id, for follow-playback reselection.
    pub last_seen_track: Option<String>,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            pending_gg: false,
            last_mpris_track: None,
            last_mpris_playback: app.playback,
            last_seen_track: None,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the audio
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Sync playback state from the audio thread; optionally follow
        // now-playing. Clone the Arc handle to avoid borrowing `app`
        // immutably across mutations.
        let mut playing_id: Option<String> = None;
        if let Some(handle) = app.playback_handle.as_ref().cloned() {
            if let Ok(info) = handle.lock() {
                let track_id = info.track.as_ref().map(|t| t.id.clone());
                let is_playing = info.playing;
                let has_track = info.track.is_some();
                drop(info);

                playing_id = track_id;
                app.playback = match (has_track, is_playing) {
                    (false, _) => PlaybackState::Stopped,
                    (true, true) => PlaybackState::Playing,
                    (true, false) => PlaybackState::Paused,
                };
            }
        }

        if playing_id != state.last_seen_track {
            if let Some(id) = playing_id.clone() {
                if app.follow_playback && !app.filter_mode && app.prompt.is_none() {
                    app.select_track_by_id(&id);
                }
            }
            state.last_seen_track = playing_id.clone();
        }

        // Keep MPRIS in sync even when playback changes come from
        // XF86/media keys or auto-advance.
        if playing_id != state.last_mpris_track || app.playback != state.last_mpris_playback {
            update_mpris(mpris, app);
            state.last_mpris_track = playing_id;
            state.last_mpris_playback = app.playback;
        }

        let display = app.display_rows();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, audio_player, mpris)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, mpris, control_tx, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(
    cmd: ControlCmd,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        ControlCmd::Quit => {
            audio_player.quit();
            return Ok(true);
        }
        ControlCmd::Play => {
            let _ = audio_player.send(PlayerCmd::Play);
            if app.playback == PlaybackState::Paused {
                app.playback = PlaybackState::Playing;
            }
            update_mpris(mpris, app);
        }
        ControlCmd::Pause => {
            let _ = audio_player.send(PlayerCmd::Pause);
            if app.playback == PlaybackState::Playing {
                app.playback = PlaybackState::Paused;
            }
            update_mpris(mpris, app);
        }
        ControlCmd::PlayPause => {
            let _ = audio_player.send(PlayerCmd::TogglePause);
            app.playback = match app.playback {
                PlaybackState::Playing => PlaybackState::Paused,
                PlaybackState::Paused => PlaybackState::Playing,
                PlaybackState::Stopped => PlaybackState::Stopped,
            };
            update_mpris(mpris, app);
        }
        ControlCmd::Stop => {
            let _ = audio_player.send(PlayerCmd::Stop);
            update_mpris(mpris, app);
        }
        ControlCmd::Next => {
            let _ = audio_player.send(PlayerCmd::Next);
            update_mpris(mpris, app);
        }
        ControlCmd::Prev => {
            let _ = audio_player.send(PlayerCmd::Prev);
            update_mpris(mpris, app);
        }
        ControlCmd::SeekBy(secs) => {
            let _ = audio_player.send(PlayerCmd::SeekBy(secs));
        }
    }

    Ok(false)
}

/// Play whatever the selection stands for: a single track (reusing its
/// queue slot) or a whole album/artist as a fresh queue.
fn play_selection(app: &mut App, audio_player: &AudioPlayer) {
    match app.view {
        View::Tracks => {
            if let Some(track) = app.selected_track().cloned() {
                let _ = audio_player.send(PlayerCmd::PlayTrack(track));
                app.playback = PlaybackState::Playing;
            }
        }
        View::Albums | View::Artists => {
            let list = app.selected_row_tracks();
            if !list.is_empty() {
                let _ = audio_player.send(PlayerCmd::SetQueueAndPlay(list));
                app.playback = PlaybackState::Playing;
            }
        }
    }
}

fn open_folder(app: &mut App, settings: &config::Settings, dir: String) {
    let tracks = library::scan(Path::new(&dir), &settings.library);
    log::debug!("scanned {}: {} tracks", dir, tracks.len());
    app.set_library(tracks);
    app.set_current_dir(dir.clone());

    if let Err(e) = state::save(&PersistedState {
        music_folder: Some(dir),
    }) {
        log::warn!("could not persist music folder: {e}");
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    // Open-folder prompt swallows all input until closed.
    if app.prompt.is_some() {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => {
                app.prompt = None;
            }
            KeyCode::Backspace => {
                if let Some(p) = app.prompt.as_mut() {
                    p.pop();
                }
            }
            KeyCode::Enter => {
                let dir = app.prompt.take().unwrap_or_default();
                let dir = dir.trim().to_string();
                if !dir.is_empty() {
                    open_folder(app, settings, dir);
                }
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    if let Some(p) = app.prompt.as_mut() {
                        p.push(c);
                    }
                }
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => {
                app.clear_filter();
            }
            KeyCode::Backspace => {
                app.pop_filter_char();
            }
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.follow_playback_off();
                app.next();
            }
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.follow_playback_off();
                app.prev();
            }
            KeyCode::Down => {
                app.follow_playback_off();
                app.next();
            }
            KeyCode::Up => {
                app.follow_playback_off();
                app.prev();
            }
            KeyCode::Enter => {
                // If there are no visible results, do nothing.
                if app.display_rows().is_empty() {
                    return Ok(false);
                }
                app.exit_filter_mode();
                app.follow_playback_on();
                play_selection(app, audio_player);
                update_mpris(mpris, app);
            }
            KeyCode::Char(c) => {
                // Keep it simple: filter on printable characters.
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            audio_player.quit();
            return Ok(true);
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Tab => {
            state.pending_gg = false;
            app.cycle_view();
        }
        KeyCode::Char('o') => {
            state.pending_gg = false;
            app.prompt = Some(app.current_dir.clone().unwrap_or_default());
        }
        KeyCode::Char('R') => {
            state.pending_gg = false;
            if let Some(dir) = app.current_dir.clone() {
                let tracks = library::scan(Path::new(&dir), &settings.library);
                log::debug!("rescanned {}: {} tracks", dir, tracks.len());
                app.set_library(tracks);
            }
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let display = app.display_rows();
                if let Some(&first) = display.first() {
                    app.selected = first;
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            let display = app.display_rows();
            if let Some(&last) = display.last() {
                app.selected = last;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if app.has_tracks() {
                app.follow_playback_on();
                play_selection(app, audio_player);
                update_mpris(mpris, app);
            }
        }
        KeyCode::Char('a') => {
            state.pending_gg = false;
            let list = app.selected_row_tracks();
            if !list.is_empty() {
                let _ = audio_player.send(PlayerCmd::AddToQueue(list));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            // Behave like MPRIS PlayPause.
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::SeekBy(settings.controls.scrub_seconds as i64));
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::SeekBy(-(settings.controls.scrub_seconds as i64)));
        }
        KeyCode::Char(c @ '0'..='9') => {
            state.pending_gg = false;
            let tenth = c.to_digit(10).unwrap_or(0);
            let _ = audio_player.send(PlayerCmd::SeekRatio(f64::from(tenth) / 10.0));
        }
        KeyCode::Char('u') => {
            state.pending_gg = false;
            app.toggle_queue_window();
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.toggle_metadata_window();
        }
        KeyCode::Char('S') => {
            state.pending_gg = false;
            let ack = app.streaming.toggle();
            log::debug!("streaming session: {ack}");
        }
        _ => {}
    }

    Ok(false)
}
