use crate::config::types::{ClipSettings, Config, SETTINGS_FILE_NAME};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

impl Config {
    /// 讀取工作根目錄下的 settings.json，檔案不存在時使用預設值
    pub fn load(root: &Path) -> Result<Self> {
        let settings = Self::load_settings(&root.join(SETTINGS_FILE_NAME))?;
        Ok(Self::from_settings(root, settings))
    }

    fn load_settings(path: &Path) -> Result<ClipSettings> {
        if !path.exists() {
            return Ok(ClipSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        info!("已載入設定檔: {}", path.display());
        Ok(settings)
    }
}
