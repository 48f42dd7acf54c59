//! Text-backed store for sensitive settings.
//!
//! The vault file holds one `KEY=value` entry per line. It is kept apart from
//! the durable settings file, which only ever stores these fields blanked.

pub mod env_loader;
pub mod error;
pub mod keys;

pub use env_loader::{DotenvLoader, EnvLoader};
pub use error::VaultError;
pub use keys::{
    api_key_env, provider_for_api_key_env, KEY_AUTH_LOGIN, KEY_AUTH_PASSWORD, KEY_RFC_PASSWORD,
};

use crate::runtime::logging::append_log_line;
use crate::shared::fs_atomic::{atomic_write_file, read_optional};
use std::collections::BTreeMap;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Vault file content captured before a write, used to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSnapshot {
    content: Option<String>,
}

pub struct SecretVault {
    path: PathBuf,
    loader: Box<dyn EnvLoader>,
    entries: RwLock<BTreeMap<String, String>>,
    write_lock: Mutex<()>,
    log_path: Option<PathBuf>,
}

impl std::fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVault")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SecretVault {
    pub fn open(path: impl Into<PathBuf>, loader: Box<dyn EnvLoader>) -> Result<Self, VaultError> {
        let vault = Self {
            path: path.into(),
            loader,
            entries: RwLock::new(BTreeMap::new()),
            write_lock: Mutex::new(()),
            log_path: None,
        };
        vault.reload()?;
        Ok(vault)
    }

    /// Vault using the `dotenvy` loader without touching the process
    /// environment.
    pub fn with_dotenv(path: impl Into<PathBuf>) -> Result<Self, VaultError> {
        Self::open(path, Box::new(DotenvLoader::default()))
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value of `key`: the last vault load first, then the process
    /// environment.
    pub fn get(&self, key: &str) -> Option<String> {
        let from_vault = self
            .entries
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .get(key)
            .cloned();
        from_vault.or_else(|| std::env::var(key).ok())
    }

    /// Effective entries from the most recent load of the vault file.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Upserts `key`, or deletes it when `value` is empty.
    pub fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.apply(&[(key.to_string(), value.to_string())])
            .map(|_| ())
    }

    /// Applies every update in order with a single write of the vault file and
    /// returns the content it replaced.
    pub fn apply(&self, updates: &[(String, String)]) -> Result<VaultSnapshot, VaultError> {
        for (key, value) in updates {
            if !keys::validate_key(key) {
                return Err(VaultError::InvalidKey(key.clone()));
            }
            if value.contains(['\r', '\0']) {
                return Err(VaultError::InvalidValue(key.clone()));
            }
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|err| err.into_inner());
        let previous = read_optional(&self.path).map_err(|source| VaultError::Read {
            path: self.path.display().to_string(),
            source,
        })?;

        let mut lines: Vec<String> = previous
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect();
        for (key, value) in updates {
            upsert_line(&mut lines, key, value);
        }
        self.write_content(&render_lines(&lines))?;
        self.reload()?;
        if let Some(log_path) = &self.log_path {
            let keys: Vec<&str> = updates.iter().map(|(key, _)| key.as_str()).collect();
            append_log_line(
                log_path,
                "info",
                "vault.updated",
                &format!("path={} keys={}", self.path.display(), keys.join(",")),
            );
        }
        Ok(VaultSnapshot { content: previous })
    }

    /// Puts the vault file back to `snapshot` and reloads.
    pub fn restore(&self, snapshot: VaultSnapshot) -> Result<(), VaultError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|err| err.into_inner());
        match snapshot.content {
            Some(content) => self.write_content(&content)?,
            None => match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(VaultError::Write {
                        path: self.path.display().to_string(),
                        source,
                    })
                }
            },
        }
        self.reload()
    }

    /// Re-reads the vault file into the in-memory environment overlay.
    pub fn reload(&self) -> Result<(), VaultError> {
        let loaded = self.loader.load(&self.path)?;
        let mut next = BTreeMap::new();
        for (key, value) in loaded {
            next.insert(key, value);
        }

        let mut entries = self.entries.write().unwrap_or_else(|err| err.into_inner());
        let removed: Vec<String> = entries
            .keys()
            .filter(|key| !next.contains_key(*key))
            .cloned()
            .collect();
        self.loader.publish(&next, &removed);
        *entries = next;
        Ok(())
    }

    fn write_content(&self, content: &str) -> Result<(), VaultError> {
        let to_error = |source| VaultError::Write {
            path: self.path.display().to_string(),
            source,
        };
        atomic_write_file(&self.path, content.as_bytes()).map_err(to_error)?;
        restrict_permissions(&self.path).map_err(to_error)
    }
}

/// Rewrites or deletes every line assigning `key`; appends when none matched.
fn upsert_line(lines: &mut Vec<String>, key: &str, value: &str) {
    let mut found = false;
    lines.retain_mut(|line| {
        if line_key(line) != Some(key) {
            return true;
        }
        found = true;
        if value.is_empty() {
            return false;
        }
        *line = format!("{key}={}", encode_value(value));
        true
    });
    if !found && !value.is_empty() {
        lines.push(format!("{key}={}", encode_value(value)));
    }
}

/// Renders `value` so the dotenv parser reads it back unchanged on a single
/// physical line. Plain tokens stay bare; anything else is double-quoted with
/// `\`, `"`, `$` and newlines escaped.
fn encode_value(value: &str) -> String {
    let bare = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-.:/@+,=%".contains(c));
    if bare {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Key assigned on `line`, if it has the `KEY=` shape. Comment lines yield a
/// `#`-prefixed key and therefore never match a real key.
fn line_key(line: &str) -> Option<&str> {
    let (key, _) = line.trim_start().split_once('=')?;
    Some(key.trim_end())
}

fn render_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn vault_in(dir: &Path) -> SecretVault {
        SecretVault::with_dotenv(dir.join(".env")).expect("open vault")
    }

    #[test]
    fn first_upsert_creates_single_line_file() {
        let dir = tempdir().expect("tempdir");
        let vault = vault_in(dir.path());

        vault.set("AUTH_LOGIN", "alice").expect("set login");
        assert_eq!(
            fs::read_to_string(vault.path()).expect("read"),
            "AUTH_LOGIN=alice\n"
        );
        assert_eq!(vault.get("AUTH_LOGIN").as_deref(), Some("alice"));

        vault.set("AUTH_LOGIN", "").expect("delete login");
        assert_eq!(fs::read_to_string(vault.path()).expect("read"), "");
        assert!(!vault.entries().contains_key("AUTH_LOGIN"));
    }

    #[test]
    fn every_duplicate_line_is_rewritten_or_removed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        fs::write(&path, "A=1\nTOKEN=old\nB=2\n  TOKEN = older\n").expect("seed");
        let vault = SecretVault::with_dotenv(&path).expect("open vault");

        vault.set("TOKEN", "new").expect("rewrite");
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "A=1\nTOKEN=new\nB=2\nTOKEN=new\n"
        );

        vault.set("TOKEN", "").expect("delete");
        assert_eq!(fs::read_to_string(&path).expect("read"), "A=1\nB=2\n");
    }

    #[test]
    fn commented_keys_never_match() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        fs::write(&path, "#AUTH_PASSWORD=stale\n").expect("seed");
        let vault = SecretVault::with_dotenv(&path).expect("open vault");

        vault.set("AUTH_PASSWORD", "fresh").expect("set");
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "#AUTH_PASSWORD=stale\nAUTH_PASSWORD=fresh\n"
        );
        assert_eq!(vault.get("AUTH_PASSWORD").as_deref(), Some("fresh"));
    }

    #[test]
    fn restore_puts_back_previous_content() {
        let dir = tempdir().expect("tempdir");
        let vault = vault_in(dir.path());
        vault.set("RFC_PASSWORD", "one").expect("seed");

        let snapshot = vault
            .apply(&[
                ("RFC_PASSWORD".to_string(), "two".to_string()),
                ("API_KEY_GROQ".to_string(), "gsk".to_string()),
            ])
            .expect("apply");
        assert_eq!(vault.get("API_KEY_GROQ").as_deref(), Some("gsk"));

        vault.restore(snapshot).expect("restore");
        assert_eq!(
            fs::read_to_string(vault.path()).expect("read"),
            "RFC_PASSWORD=one\n"
        );
        assert_eq!(vault.get("RFC_PASSWORD").as_deref(), Some("one"));
        assert!(!vault.entries().contains_key("API_KEY_GROQ"));
    }

    #[test]
    fn restoring_a_missing_file_deletes_it() {
        let dir = tempdir().expect("tempdir");
        let vault = vault_in(dir.path());
        let snapshot = vault
            .apply(&[("AUTH_LOGIN".to_string(), "bob".to_string())])
            .expect("apply");
        vault.restore(snapshot).expect("restore");
        assert!(!vault.path().exists());
    }

    #[test]
    fn invalid_keys_are_rejected_before_touching_the_file() {
        let dir = tempdir().expect("tempdir");
        let vault = vault_in(dir.path());
        let err = vault.set("BAD KEY", "x").expect_err("invalid key");
        assert!(matches!(err, VaultError::InvalidKey(_)));
        assert!(!vault.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn vault_file_is_owner_only() {
        let dir = tempdir().expect("tempdir");
        let vault = vault_in(dir.path());
        vault.set("AUTH_LOGIN", "alice").expect("set");
        let mode = fs::metadata(vault.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
