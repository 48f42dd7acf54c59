use super::StatePaths;
use crate::shared::time::now_rfc3339;
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn append_runtime_log(paths: &StatePaths, level: &str, event: &str, message: &str) {
    append_log_line(&paths.runtime_log_path(), level, event, message);
}

/// Appends one JSON line to `path`. Logging never fails the caller.
pub fn append_log_line(path: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": now_rfc3339(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_one_json_object_per_line() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs/runtime.log");
        append_log_line(&path, "info", "settings.saved", "revision=1");
        append_log_line(&path, "warn", "settings.coercion_fallback", "keys=a");

        let raw = fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "settings.saved");
        assert_eq!(lines[1]["level"], "warn");
        assert!(lines[0]["timestamp"].as_str().is_some());
    }
}
