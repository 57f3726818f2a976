use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings for one dashboard data directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Root for catalog and document locators.
    pub data_dir: PathBuf,
    /// Catalog file name, relative to `data_dir`.
    pub catalog_file: String,
    pub fetch_timeout_ms: u64,
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("web/data"),
            catalog_file: "namelist_index.json".into(),
            fetch_timeout_ms: 10_000,
            log_level: "info".into(),
        }
    }
}

impl BoardConfig {
    /// Read a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The file at `path` if given, otherwise defaults, then command-line
    /// overrides.
    pub fn resolve(path: Option<&Path>, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = BoardConfig::default();
        assert_eq!(c.data_dir, PathBuf::from("web/data"));
        assert_eq!(c.catalog_file, "namelist_index.json");
        assert_eq!(c.fetch_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(c.catalog_path(), PathBuf::from("web/data/namelist_index.json"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, "data_dir = \"/srv/board\"\nfetch_timeout_ms = 0\n").unwrap();

        let c = BoardConfig::load(&path).unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/srv/board"));
        assert_eq!(c.catalog_file, "namelist_index.json");
        assert_eq!(c.log_level, "info");
        assert_eq!(c.fetch_timeout(), None);
    }

    #[test]
    fn command_line_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, "data_dir = \"/srv/board\"\nlog_level = \"warn\"\n").unwrap();

        let c = BoardConfig::resolve(Some(&path), Some("local".into())).unwrap();
        assert_eq!(c.data_dir, PathBuf::from("local"));
        assert_eq!(c.log_level, "warn");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, "fetch_timeout_ms = \"soon\"\n").unwrap();
        assert!(BoardConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(BoardConfig::resolve(Some(Path::new("/nonexistent/board.toml")), None).is_err());
    }
}
