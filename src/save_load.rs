// save_load.rs - Best-score persistence as a RON file in the user's data directory.

use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::driver::RunEnded;

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_save_data)
            .add_observer(on_run_ended);
    }
}

/// The player's persistent save data.
///
/// Only the best score survives between sessions. #[serde(default)] keeps old
/// or hand-edited files loadable when fields are added later: a missing field
/// gets its Default value instead of a parse error.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SaveData {
    #[serde(default)]
    pub high_score: u32,
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "i/o error: {e}"),
            StorageError::Parse(e) => write!(f, "corrupt save file: {e}"),
            StorageError::Serialize(e) => write!(f, "could not serialize save data: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Where the save file lives: the per-user data directory when the platform
/// has one, otherwise the working directory.
pub fn save_file_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("flappy-bevy").join("save.ron"),
        None => PathBuf::from("save.ron"),
    }
}

/// Reads SaveData from `path`. `Ok(None)` means there is simply no save yet.
pub fn read_save(path: &Path) -> Result<Option<SaveData>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(StorageError::Io)?;
    let data = ron::from_str::<SaveData>(&contents).map_err(StorageError::Parse)?;
    Ok(Some(data))
}

pub fn write_save(path: &Path, save_data: &SaveData) -> Result<(), StorageError> {
    // create_dir_all is like `mkdir -p`
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
    }
    let pretty = ron::ser::PrettyConfig::default();
    let serialized = ron::ser::to_string_pretty(save_data, pretty).map_err(StorageError::Serialize)?;
    std::fs::write(path, serialized).map_err(StorageError::Io)
}

/// Loads the save, logging instead of failing. A corrupt file counts as no
/// save at all so the game always starts.
pub fn load_or_default(path: &Path) -> SaveData {
    match read_save(path) {
        Ok(Some(data)) => {
            info!("Loaded save data from {:?}: {:?}", path, data);
            data
        }
        Ok(None) => {
            info!("No save file found at {:?}. Starting fresh.", path);
            SaveData::default()
        }
        Err(e) => {
            error!("Failed to load {:?}: {}. Using defaults.", path, e);
            SaveData::default()
        }
    }
}

/// Saves the current SaveData, logging any failure.
pub fn save_to_disk(save_data: &SaveData) {
    let path = save_file_path();
    match write_save(&path, save_data) {
        Ok(()) => info!("Best score saved to {:?}", path),
        Err(e) => error!("Failed to write {:?}: {}", path, e),
    }
}

/// Startup system: inserts SaveData as a resource before the session is built.
fn load_save_data(mut commands: Commands) {
    commands.insert_resource(load_or_default(&save_file_path()));
}

/// Persists a new best score the moment the run that set it ends.
fn on_run_ended(trigger: On<RunEnded>, mut save_data: ResMut<SaveData>) {
    let ended = trigger.event();
    if !ended.new_best || ended.best_score <= save_data.high_score {
        return;
    }
    save_data.high_score = ended.best_score;
    save_to_disk(&save_data);
}
