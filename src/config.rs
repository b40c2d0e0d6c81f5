use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// モデル名 (e.g. "movenet_lightning")
    #[serde(default = "default_model_name")]
    pub name: String,
    /// 取得元ベースURL。未設定なら cache_dir 内の既存ファイルを使う
    #[serde(default)]
    pub base_url: Option<String>,
    /// ダウンロード先キャッシュディレクトリ
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// グラフ側の次元が動的な場合の入力一辺サイズ
    #[serde(default = "default_input_size")]
    pub input_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    #[serde(default = "default_window_title")]
    pub title: String,
    #[serde(default = "default_window_width")]
    pub width: usize,
    #[serde(default = "default_window_height")]
    pub height: usize,
}

fn default_model_name() -> String { "movenet_lightning".to_string() }
fn default_cache_dir() -> String { "models".to_string() }
fn default_input_size() -> usize { 192 }
fn default_window_title() -> String { "sugata".to_string() }
fn default_window_width() -> usize { 640 }
fn default_window_height() -> usize { 480 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            base_url: None,
            cache_dir: default_cache_dir(),
            input_size: default_input_size(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: None,
            height: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_window_title(),
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// ファイルが無い・壊れている場合はデフォルト設定で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
