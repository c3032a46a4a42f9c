use super::{State, StorageBackend};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILENAME: &str = "blog.json";

/// File persistence: the whole state as one pretty-printed JSON document.
///
/// Writes go to a temp file in the same directory followed by a rename,
/// so a crash mid-write leaves the previous document intact.
pub struct FsBackend {
    data_dir: PathBuf,
}

impl FsBackend {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILENAME)
    }
}

impl StorageBackend for FsBackend {
    fn load(&mut self) -> Result<State> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(State::default());
        }
        let content = fs::read_to_string(&path)?;
        let state: State = serde_json::from_str(&content)?;
        Ok(state)
    }

    fn persist(&mut self, state: &State) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        let path = self.state_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
