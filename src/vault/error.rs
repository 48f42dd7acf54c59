#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("failed to read vault file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write vault file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load environment from {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("invalid vault key `{0}`")]
    InvalidKey(String),
    #[error("value for vault key `{0}` contains a carriage return or NUL")]
    InvalidValue(String),
}
