//! Environment snapshot — the sole input to config construction.
//!
//! [`EnvMap`] decouples "what the environment contains" from "how the
//! config reads it": dotenv values are merged into the map instead of being
//! injected into the process environment, and the loader only ever sees the
//! map. Tests build maps directly instead of mutating env vars.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::AppError;

/// Ordered key→value snapshot of the environment, plus merged dotenv files.
#[derive(Debug, Clone, Default)]
pub struct EnvMap {
    vars: BTreeMap<String, String>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but an empty string counts as unset.
    /// Matches the truthiness checks that gate behavior in the loader.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Merge an explicitly named dotenv file. Any failure — missing file,
    /// unreadable, malformed line — is fatal. Keys already present in the
    /// map win, so the process environment takes precedence over the file.
    pub fn merge_dotenv_file(&mut self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path)
            .map_err(|e| AppError::Dotenv(format!("cannot load {}: {e}", path.display())))?;
        for item in iter {
            let (key, value) = item
                .map_err(|e| AppError::Dotenv(format!("cannot parse {}: {e}", path.display())))?;
            self.vars.entry(key).or_insert(value);
        }
        Ok(())
    }

    /// Merge the dotenv file at the default `./.env` location, ignoring all
    /// failures — absence of the file is the normal case.
    pub fn merge_default_dotenv(&mut self) {
        if let Ok(iter) = dotenvy::dotenv_iter() {
            for (key, value) in iter.flatten() {
                self.vars.entry(key).or_insert(value);
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dotenv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn get_non_empty_treats_empty_as_unset() {
        let env: EnvMap = [("A", "1"), ("B", "")].into_iter().collect();
        assert_eq!(env.get("B"), Some(""));
        assert_eq!(env.get_non_empty("B"), None);
        assert_eq!(env.get_non_empty("A"), Some("1"));
    }

    #[test]
    fn merge_dotenv_file_adds_new_keys() {
        let f = write_dotenv("MICROPUB_HOST=example.com\nMICROPUB_GITHUB_USER=alice\n");
        let mut env = EnvMap::new();
        env.merge_dotenv_file(f.path()).unwrap();
        assert_eq!(env.get("MICROPUB_HOST"), Some("example.com"));
        assert_eq!(env.get("MICROPUB_GITHUB_USER"), Some("alice"));
    }

    #[test]
    fn existing_keys_win_over_dotenv() {
        let f = write_dotenv("MICROPUB_HOST=from-file\n");
        let mut env: EnvMap = [("MICROPUB_HOST", "from-process")].into_iter().collect();
        env.merge_dotenv_file(f.path()).unwrap();
        assert_eq!(env.get("MICROPUB_HOST"), Some("from-process"));
    }

    #[test]
    fn missing_explicit_file_is_fatal() {
        let mut env = EnvMap::new();
        let err = env
            .merge_dotenv_file("/nonexistent/path/.env")
            .unwrap_err();
        assert!(err.to_string().contains("dotenv error"));
    }

    #[test]
    fn default_dotenv_absence_is_silent() {
        // Running from a directory without a .env must not fail or insert anything
        // beyond what a present file would provide.
        let mut env = EnvMap::new();
        env.merge_default_dotenv();
    }
}
