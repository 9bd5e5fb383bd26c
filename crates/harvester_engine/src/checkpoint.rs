use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use harvester_core::Checkpoint;
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("failed to read checkpoint {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint {path:?} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to encode checkpoint: {0}")]
    Encode(String),
    #[error("failed to write checkpoint: {0}")]
    Write(#[from] PersistError),
}

/// Durable "already searched" set. `save` always receives the complete set.
pub trait CheckpointStore: Send + Sync {
    /// Returns the persisted set, or an empty one when `reset` is set or
    /// nothing has been saved yet.
    fn load(&self, reset: bool) -> Result<Checkpoint, CheckpointError>;

    /// Overwrites the persisted set.
    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedCheckpoint {
    sought: Vec<String>,
}

/// Checkpoint kept in a RON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, reset: bool) -> Result<Checkpoint, CheckpointError> {
        if reset {
            engine_info!("Checkpoint reset requested; ignoring {:?}", self.path);
            return Ok(Checkpoint::new());
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_info!("No checkpoint at {:?}; starting empty", self.path);
                return Ok(Checkpoint::new());
            }
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state: PersistedCheckpoint =
            ron::from_str(&content).map_err(|err| CheckpointError::Corrupt {
                path: self.path.clone(),
                message: err.to_string(),
            })?;

        let checkpoint: Checkpoint = state.sought.into_iter().collect();
        engine_info!(
            "Loaded {} sought terms from {:?}",
            checkpoint.len(),
            self.path
        );
        Ok(checkpoint)
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let state = PersistedCheckpoint {
            sought: checkpoint.iter().map(ToOwned::to_owned).collect(),
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| CheckpointError::Encode(err.to_string()))?;

        let (writer, filename) = AtomicFileWriter::for_path(&self.path)?;
        writer.write(&filename, &content)?;
        engine_debug!(
            "Saved {} sought terms to {:?}",
            checkpoint.len(),
            self.path
        );
        Ok(())
    }
}
