use crate::error::{BlogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_PAGE_SIZE: usize = 10;

/// Configuration for inkpad, stored next to the data file as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InkpadConfig {
    /// Page size the CLI uses when listing posts
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for InkpadConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl InkpadConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(BlogError::Io)?;
        let config: InkpadConfig =
            serde_json::from_str(&content).map_err(BlogError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(BlogError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(BlogError::Serialization)?;
        fs::write(config_path, content).map_err(BlogError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config() {
        assert_eq!(InkpadConfig::default().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn load_missing_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = InkpadConfig::load(dir.path().join("absent")).unwrap();
        assert_eq!(config, InkpadConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let config = InkpadConfig { page_size: 25 };
        config.save(dir.path()).unwrap();
        assert_eq!(InkpadConfig::load(dir.path()).unwrap(), config);
    }
}
