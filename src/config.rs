use anyhow::{anyhow, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
const CONFIG_FILE: &str = ".zenwatch.yml";
const GLOBAL_CONFIG_DIR: &str = ".config/zenwatch";
pub const DEFAULT_THRESHOLD: u32 = 15;
pub const DEFAULT_MARKDOWN_OUTPUT: &str = "reports/latest.md";
pub const DEFAULT_JSON_OUTPUT: &str = "reports/latest.json";
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub complexity_threshold: u32,
    pub badge: bool,
    pub output: Option<String>,
    pub complexity_command: Option<String>,
    pub source_extensions: Vec<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            complexity_threshold: DEFAULT_THRESHOLD,
            badge: true,
            output: None,
            complexity_command: None,
            source_extensions: vec![".go".to_string()],
        }
    }
}
impl Config {
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::read(&config_path)
        } else {
            // 嘗試載入全局配置
            if let Some(global_config) = Self::load_global()? {
                Ok(global_config)
            } else {
                Ok(Self::default())
            }
        }
    }
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_yaml::to_string(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }
    pub fn load_global() -> Result<Option<Self>> {
        match global_config_path() {
            Some(path) if path.exists() => Ok(Some(Self::read(&path)?)),
            _ => Ok(None),
        }
    }
    pub fn save_global(&self) -> Result<()> {
        let path = global_config_path().ok_or_else(|| anyhow!("無法找到使用者主目錄"))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| anyhow!("無法解析配置文件 {}：{}", path.display(), e))
    }
}
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(CONFIG_FILE))
}
pub fn configure_interactive(project_dir: &Path, global: bool) -> Result<()> {
    let theme = ColorfulTheme::default();
    let current_config = if global {
        Config::load_global()?.unwrap_or_default()
    } else {
        Config::load(project_dir)?
    };
    println!("\n🔧 ZenWatch 配置設定");
    println!("==================");
    if global {
        println!("正在設定全局配置\n");
    } else {
        println!("正在設定專案配置\n");
    }
    let complexity_threshold: u32 = Input::with_theme(&theme)
        .with_prompt("複雜度門檻")
        .default(current_config.complexity_threshold)
        .interact_text()?;
    let badge = Confirm::with_theme(&theme)
        .with_prompt("在報告中加入徽章？")
        .default(current_config.badge)
        .interact()?;
    let output: String = Input::with_theme(&theme)
        .with_prompt("報告輸出路徑")
        .default(
            current_config
                .output
                .clone()
                .unwrap_or_else(|| DEFAULT_MARKDOWN_OUTPUT.to_string()),
        )
        .interact_text()?;
    let complexity_command: String = Input::with_theme(&theme)
        .with_prompt("複雜度分析指令（留空則略過）")
        .with_initial_text(current_config.complexity_command.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let extensions: String = Input::with_theme(&theme)
        .with_prompt("分析的副檔名（以逗號分隔）")
        .with_initial_text(current_config.source_extensions.join(","))
        .allow_empty(true)
        .interact_text()?;
    let new_config = Config {
        complexity_threshold,
        badge,
        output: Some(output),
        complexity_command: Some(complexity_command.trim().to_string()).filter(|c| !c.is_empty()),
        source_extensions: parse_extensions(&extensions),
    };
    if global {
        new_config.save_global()?;
        info!("已更新全局配置");
    } else {
        new_config.save(project_dir)?;
        info!("已更新專案配置");
    }
    Ok(())
}
pub fn init_project(project_dir: &Path) -> Result<()> {
    // 檢查是否已經存在配置文件
    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(anyhow!("配置文件已存在：{}", config_path.display()));
    }
    let config = Config::default();
    config.save(project_dir)?;
    info!("已創建配置文件：{}", config_path.display());
    Ok(())
}
pub fn get_effective_config(project_dir: &Path) -> Result<Config> {
    Config::load(project_dir)
}
/// `"go, .RS"` -> `[".go", ".rs"]`
fn parse_extensions(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            let ext = ext.to_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{}", ext)
            }
        })
        .collect()
}
