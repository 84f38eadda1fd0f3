use gloo::storage::errors::StorageError as GlooStorageError;
use gloo::storage::{LocalStorage, Storage};
use memoria_core::{ScoreStore, StorageError};

use crate::utils::local_storage_available;

/// Best scores kept in `localStorage`, one plain number per difficulty key.
#[derive(Debug)]
pub(crate) struct LocalScoreStore {
    available: bool,
}

impl LocalScoreStore {
    pub(crate) fn new() -> Self {
        let available = local_storage_available();
        if !available {
            log::warn!("local storage unavailable, best scores will not be kept");
        }
        Self { available }
    }
}

impl ScoreStore for LocalScoreStore {
    fn load(&self, key: &str) -> Result<Option<u32>, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }

        match LocalStorage::get::<u32>(key) {
            Ok(best) => Ok(Some(best)),
            Err(GlooStorageError::KeyNotFound(_)) => Ok(None),
            Err(GlooStorageError::SerdeError(err)) => {
                log::debug!("{} holds an unreadable score: {}", key, err);
                Err(StorageError::Corrupt)
            }
            Err(err) => {
                log::debug!("reading {} failed: {:?}", key, err);
                Err(StorageError::Unavailable)
            }
        }
    }

    fn store(&mut self, key: &str, flip_attempts: u32) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }

        LocalStorage::set(key, flip_attempts).map_err(|err| {
            log::debug!("writing {} failed: {:?}", key, err);
            StorageError::Unavailable
        })
    }
}
