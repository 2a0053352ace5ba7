use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use super::clock::MonotonicClock;
use super::engine::Engine;
use super::output::RodioOutput;
use super::types::{PlaybackHandle, PlayerCmd, QueueHandle};

/// Poll cadence for position updates and end-of-track detection while no
/// commands arrive.
const TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_audio_thread(
    rx: Receiver<PlayerCmd>,
    playback: PlaybackHandle,
    queue: QueueHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut engine = Engine::new(RodioOutput::new(), MonotonicClock::new());
        let mut published_revision: Option<u64> = None;

        loop {
            let quit = match rx.recv_timeout(TICK) {
                Ok(PlayerCmd::Quit) => {
                    engine.stop();
                    true
                }
                Ok(cmd) => {
                    apply(&mut engine, cmd);
                    false
                }
                Err(RecvTimeoutError::Timeout) => false,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            engine.tick();
            publish(&engine, &playback, &queue, &mut published_revision);

            if quit {
                break;
            }
        }
    })
}

fn apply(engine: &mut Engine<RodioOutput, MonotonicClock>, cmd: PlayerCmd) {
    match cmd {
        PlayerCmd::SetQueueAndPlay(list) => engine.set_queue_and_play(list),
        PlayerCmd::AddToQueue(list) => engine.add_to_queue(list),
        PlayerCmd::PlayTrack(track) => engine.play_track(track),
        PlayerCmd::Play => engine.play(),
        PlayerCmd::Pause => engine.pause(),
        PlayerCmd::TogglePause => engine.toggle_pause(),
        PlayerCmd::Stop => engine.stop(),
        PlayerCmd::Next => engine.next(),
        PlayerCmd::Prev => engine.previous(),
        PlayerCmd::SeekBy(secs) => engine.seek_by(secs),
        PlayerCmd::SeekRatio(ratio) => engine.seek_ratio(ratio),
        PlayerCmd::Quit => {}
    }
}

fn publish(
    engine: &Engine<RodioOutput, MonotonicClock>,
    playback: &PlaybackHandle,
    queue: &QueueHandle,
    published_revision: &mut Option<u64>,
) {
    if let Ok(mut info) = playback.lock() {
        info.track = engine.current_track().cloned();
        info.playing = engine.is_playing();
        info.position = engine.position();
        info.duration = engine.duration();
        info.error = engine.last_error().map(str::to_string);
    }

    // Queue snapshots can be big (whole track records); only republish
    // when something actually changed.
    if *published_revision != Some(engine.queue_revision()) {
        if let Ok(mut q) = queue.lock() {
            q.tracks = engine.queue().tracks().to_vec();
            q.cursor = engine.queue().cursor();
        }
        *published_revision = Some(engine.queue_revision());
    }
}
