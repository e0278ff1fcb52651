/// How the backing file was interpreted when the store was opened.
///
/// A corrupt or unreadable file still yields a usable empty store, but the
/// status lets callers alert instead of silently proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Backing file parsed cleanly, with this many records.
    Loaded(usize),
    /// No backing file yet; a fresh store.
    Missing,
    /// Backing file existed but could not be read or parsed.
    Corrupt,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceRange(f64),

    #[error("import file missing required column: {0}")]
    MissingColumn(&'static str),
}
