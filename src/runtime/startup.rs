use super::state::PersistedState;

/// Pick the folder to open at startup.
///
/// A command-line argument counts as an explicit pick (it gets persisted);
/// otherwise the remembered folder is reopened. `None` means first run
/// with no argument: start with an empty library and the open prompt.
pub fn resolve_music_folder(
    arg: Option<String>,
    persisted: &PersistedState,
) -> Option<(String, bool)> {
    if let Some(dir) = arg.filter(|d| !d.trim().is_empty()) {
        return Some((dir, true));
    }
    persisted.music_folder.clone().map(|dir| (dir, false))
}
