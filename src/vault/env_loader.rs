use super::VaultError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Reloads vault entries into environment state.
pub trait EnvLoader: Send + Sync {
    /// Entries in file order; later duplicates override earlier ones.
    fn load(&self, path: &Path) -> Result<Vec<(String, String)>, VaultError>;

    /// Called after every reload with the effective entries and the keys that
    /// disappeared from the file since the previous reload.
    fn publish(&self, _entries: &BTreeMap<String, String>, _removed: &[String]) {}
}

/// `.env` loader backed by `dotenvy`. With `export_to_process` set, entries
/// are also written to the process environment so child processes and
/// libraries that read `std::env` see them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotenvLoader {
    pub export_to_process: bool,
}

impl EnvLoader for DotenvLoader {
    fn load(&self, path: &Path) -> Result<Vec<(String, String)>, VaultError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(VaultError::Load {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                })
            }
        };
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        // One entry per physical line: a line dotenvy cannot parse drops only
        // itself and never swallows the entries after it.
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = format!("{line}\n");
            entries.extend(dotenvy::from_read_iter(line.as_bytes()).filter_map(Result::ok));
        }
        Ok(entries)
    }

    fn publish(&self, entries: &BTreeMap<String, String>, removed: &[String]) {
        if !self.export_to_process {
            return;
        }
        for key in removed {
            std::env::remove_var(key);
        }
        for (key, value) in entries {
            std::env::set_var(key, value);
        }
    }
}
