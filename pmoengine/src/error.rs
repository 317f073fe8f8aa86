use thiserror::Error;

/// Erreurs du moteur de lecture
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Source error: {0}")]
    Source(#[from] pmosource::SourceError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
