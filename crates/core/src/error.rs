use thiserror::Error;

use crate::model::{ConfigError, ItemError, PlaybackStateError, ProgressError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Playback(#[from] PlaybackStateError),
}
