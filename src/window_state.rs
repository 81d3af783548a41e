use crate::config::project_dirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::warn;

const STATE_FILE_NAME: &str = "window_state.toml";

/// Last known window position and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        WindowGeometry {
            x: 100,
            y: 100,
            width: 720,
            height: 560,
        }
    }
}

pub fn state_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join(STATE_FILE_NAME))
}

pub fn load_state(path: &Path) -> Option<WindowGeometry> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<WindowGeometry>(&contents) {
        Ok(state) if state.width > 0 && state.height > 0 => Some(state),
        Ok(state) => {
            warn!(?state, "ignoring window state with empty size");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to parse window state file");
            None
        }
    }
}

pub fn save_state(path: &Path, geometry: &WindowGeometry) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml = toml::to_string_pretty(geometry)
        .map_err(|err| io::Error::new(ErrorKind::Other, format!("toml serialization error: {err}")))?;

    fs::write(path, toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join(STATE_FILE_NAME);
        let geometry = WindowGeometry {
            x: 10,
            y: 20,
            width: 800,
            height: 600,
        };

        save_state(&path, &geometry).unwrap();
        assert_eq!(load_state(&path), Some(geometry));
    }

    #[test]
    fn test_invalid_state_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);

        fs::write(&path, "x = 1").unwrap();
        assert_eq!(load_state(&path), None);

        fs::write(&path, "x = 1\ny = 1\nwidth = 0\nheight = 0\n").unwrap();
        assert_eq!(load_state(&path), None);
    }
}
