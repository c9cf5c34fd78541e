//! Planet error types.

#[derive(Debug, thiserror::Error)]
pub enum PlanetError {
    #[error("invalid planet settings: {0}")]
    InvalidSettings(String),

    #[error("failed to spawn planet worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("planet worker thread panicked")]
    WorkerPanicked,

    #[error("failed to write diagnostics: {0}")]
    Diagnostics(#[source] std::io::Error),
}
