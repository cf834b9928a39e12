use crate::error::{ChargeSenseError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 保存先を上書きする環境変数
pub const STORE_ENV: &str = "CHARGESENSE_STORE";

/// デフォルトの履歴ファイル
pub const DEFAULT_STORE_PATH: &str = "data/marketing_analytics_ready.xlsx";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// マーケティング履歴（xlsx）の保存先
    pub store_path: PathBuf,
    /// JSON出力を整形するか
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            pretty: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ChargeSenseError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("chargesense").join("config.json"))
    }

    /// 実際に使う保存先（環境変数 → 設定ファイルの順）
    pub fn resolve_store_path(&self) -> PathBuf {
        match std::env::var(STORE_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.store_path.clone(),
        }
    }

    pub fn set_store_path(&mut self, path: PathBuf) -> Result<()> {
        self.store_path = path;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert!(config.pretty);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"pretty": false}"#).unwrap();
        assert!(!config.pretty);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    }
}
