use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::services::export_service::DEFAULT_REPORT_PREFIX;
use crate::core::services::summary_service::{RECENT_LIMIT, TOP_CATEGORY_LIMIT};
use crate::errors::LedgerError;

const CONFIG_FILE: &str = "ledger_core.json";
const TMP_SUFFIX: &str = "tmp";

/// User preferences that shape summaries and exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub recent_limit: usize,
    pub top_categories_limit: usize,
    pub export_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional export directory. Defaults to `~/Documents`.
    pub export_dir: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            recent_limit: RECENT_LIMIT,
            top_categories_limit: TOP_CATEGORY_LIMIT,
            export_prefix: DEFAULT_REPORT_PREFIX.into(),
            export_dir: None,
        }
    }
}

impl LedgerConfig {
    pub fn resolve_export_dir(&self) -> PathBuf {
        if let Some(path) = &self.export_dir {
            return path.clone();
        }
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Loads and saves [`LedgerConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<LedgerConfig, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(LedgerConfig::default())
        }
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), LedgerConfig::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "recent_limit": 10 }"#).unwrap();
        let config = ConfigManager::new(path).load().unwrap();
        assert_eq!(config.recent_limit, 10);
        assert_eq!(config.top_categories_limit, TOP_CATEGORY_LIMIT);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().join("nested")).unwrap();
        let config = LedgerConfig {
            export_prefix: "Monthly".into(),
            export_dir: Some(dir.path().join("out")),
            ..LedgerConfig::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }
}
