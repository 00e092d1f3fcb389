// Loads and saves song files. Called on startup, on save, and on quit.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::pipeline::song::Song;

const STEPKIT_DIR: &str = ".stepkit";
const SONG_FILE: &str = "song.json";
const FILE_VERSION: &str = "1.1";

// the on-disk shape: the song plus a format version
#[derive(Serialize)]
struct SongFile<'a> {
    #[serde(flatten)]
    song: &'a Song,
    version: &'static str,
}

// <project_dir>/.stepkit/song.json
pub fn default_song_path(project_dir: &Path) -> PathBuf {
    project_dir.join(STEPKIT_DIR).join(SONG_FILE)
}

pub fn load_song(path: &Path) -> anyhow::Result<Song> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading song {}", path.display()))?;
    let song: Song = serde_json::from_str(&data)
        .with_context(|| format!("parsing song {}", path.display()))?;
    Ok(song)
}

// Save the song to disk, making the parent directories if they don't exist already
pub fn save_song(path: &Path, song: &Song) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&SongFile { song, version: FILE_VERSION })?;
    std::fs::write(path, json).with_context(|| format!("writing song {}", path.display()))?;
    log::info!("saved song to {}", path.display());
    Ok(())
}
