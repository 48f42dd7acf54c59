#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to create runtime path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("context `{0}` is already registered")]
    DuplicateContext(String),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
