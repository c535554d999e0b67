//! Load runtime configuration. Every section is optional.

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::filters::{Filter, DEFAULT_DATE_RANGE};
use crate::trades::DEFAULT_CYCLE_TIMEFRAME;
use crate::types::ALL;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StorageCfg {
    /// Directory holding the JSON collections; platform data dir when unset.
    pub dir: Option<PathBuf>,
}

impl StorageCfg {
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        let dirs = ProjectDirs::from("", "", "trading-journal")
            .context("no home directory to place journal data in")?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FiltersCfg {
    pub currency: String,
    pub impact: Vec<String>,
    pub date_range: String,
}

impl Default for FiltersCfg {
    fn default() -> Self {
        Self {
            currency: ALL.to_string(),
            impact: ["red", "orange", "yellow", "gray"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_range: DEFAULT_DATE_RANGE.to_string(),
        }
    }
}

impl FiltersCfg {
    pub fn to_filter(&self) -> Filter {
        let mut f = Filter::default();
        f.set_currency(&self.currency);
        f.select_all_impacts(self.impact.iter().cloned());
        f.set_date_range(&self.date_range);
        f
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImportCfg {
    pub default_cycle_timeframe: String,
}

impl Default for ImportCfg {
    fn default() -> Self {
        Self {
            default_cycle_timeframe: DEFAULT_CYCLE_TIMEFRAME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageCfg,
    pub filters: FiltersCfg,
    pub import: ImportCfg,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&s)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(dir.path().join("config.yaml")).unwrap();
        assert_eq!(cfg.filters.currency, "ALL");
        assert_eq!(cfg.filters.impact.len(), 4);
        assert_eq!(cfg.import.default_cycle_timeframe, "Weekly/Daily");
        assert!(cfg.storage.dir.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "storage:\n  dir: /tmp/journal\nfilters:\n  currency: USD\n  impact: [red]\n",
        )
        .unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.storage.data_dir().unwrap(), PathBuf::from("/tmp/journal"));
        assert_eq!(cfg.import.default_cycle_timeframe, "Weekly/Daily");

        let f = cfg.filters.to_filter();
        assert_eq!(f.currency, "USD");
        assert!(f.impact.contains("red"));
        assert_eq!(f.impact.len(), 1);
        assert_eq!(f.date_range, "current_week");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "filters: [not, a, map]\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
