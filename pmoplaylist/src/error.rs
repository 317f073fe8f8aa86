//! Types d'erreurs pour pmoplaylist

/// Erreurs de gestion de playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Playlist index out of range: {index} (playlist has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmoplaylist
pub type Result<T> = std::result::Result<T, Error>;
