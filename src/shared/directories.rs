use std::fs;
use std::path::PathBuf;

/// Lists the immediate sub-directories of a logical content folder
/// (`prompts`, `memory`, `knowledge`).
pub trait DirectoryEnumerator: Send + Sync {
    fn subdirectories(&self, folder: &str, exclude: Option<&str>) -> Vec<String>;
}

/// Enumerates folders below a content root on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDirectoryEnumerator {
    root: PathBuf,
}

impl FsDirectoryEnumerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DirectoryEnumerator for FsDirectoryEnumerator {
    fn subdirectories(&self, folder: &str, exclude: Option<&str>) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.root.join(folder)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .filter(|name| Some(name.as_str()) != exclude)
            .collect();
        names.sort();
        names
    }
}
