use std::env;
use std::path::Path;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::library::scan;
use crate::mpris::ControlCmd;
use crate::runtime::state::PersistedState;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;
mod state;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let persisted = state::load();
    let resolved = startup::resolve_music_folder(env::args().nth(1), &persisted);

    let mut app = App::new(Vec::new());
    app.follow_playback = settings.ui.follow_playback;

    match resolved {
        Some((dir, newly_picked)) => {
            let tracks = scan(Path::new(&dir), &settings.library);
            app.set_library(tracks);
            app.set_current_dir(dir.clone());
            if newly_picked {
                if let Err(e) = state::save(&PersistedState {
                    music_folder: Some(dir),
                }) {
                    log::warn!("could not persist music folder: {e}");
                }
            }
        }
        None => {
            // First run: start with the open-folder prompt showing.
            app.prompt = Some(String::new());
        }
    }

    let audio_player = AudioPlayer::new();
    app.set_playback_handle(audio_player.playback_handle());
    app.set_queue_handle(audio_player.queue_handle());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = {
        let mut state = event_loop::EventLoopState::new(&app);
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &audio_player,
            &mpris,
            &control_tx,
            &control_rx,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
