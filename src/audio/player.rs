use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::thread::spawn_audio_thread;
use super::types::{PlaybackHandle, PlaybackInfo, PlayerCmd, QueueHandle, QueueSnapshot};

/// UI-side handle to the audio thread: send commands, read the shared
/// playback/queue snapshots, join on quit.
pub struct AudioPlayer {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    queue: QueueHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
        let queue: QueueHandle = Arc::new(Mutex::new(QueueSnapshot::default()));

        let join = spawn_audio_thread(rx, playback.clone(), queue.clone());

        Self {
            tx,
            playback,
            queue,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn queue_handle(&self) -> QueueHandle {
        self.queue.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback, shut the audio thread down and wait for it.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}
