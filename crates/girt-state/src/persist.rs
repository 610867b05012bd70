//! Whole-file JSON persistence.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StateError, StateResult};

/// Load a state file; a missing file yields the default value, a
/// present-but-malformed file is an error.
pub fn load_state<T>(path: &Path) -> StateResult<T>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes).map_err(|e| StateError::Malformed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Read a state file that is known to exist (caller has already
/// checked); unlike [`load_state`] this carries no `Default` bound.
pub fn read_state<T: DeserializeOwned>(path: &Path) -> StateResult<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| StateError::Malformed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Rewrite a state file whole.
pub fn store_state<T: Serialize>(path: &Path, state: &T) -> StateResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(|e| StateError::Malformed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidecar::RemotesState;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let state: RemotesState = load_state(&dir.path().join("remotes-codex.json")).unwrap();
        assert!(state.remotes.is_empty());
    }

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remotes-codex.json");
        let mut state = RemotesState::default();
        state.remotes.insert(
            "origin".into(),
            crate::sidecar::RemoteConfig {
                url: "https://example.com/repo.git".into(),
                fetch: "+refs/heads/*:refs/remotes/origin/*".into(),
            },
        );
        store_state(&path, &state).unwrap();
        let loaded: RemotesState = load_state(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn malformed_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remotes-codex.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();
        let err = load_state::<RemotesState>(&path).unwrap_err();
        assert!(matches!(err, StateError::Malformed { .. }));
    }

    #[test]
    fn non_json_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        std::fs::write(&path, b"not json at all").unwrap();
        assert!(load_state::<RemotesState>(&path).is_err());
    }
}
