// Tunables for the gallery core, loaded from a TOML file. Sections missing
// from an existing file are filled with defaults and written back so the
// file stays editable after upgrades.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;

const CONFIG_FILE_NAME: &str = "photowall.conf";

#[derive(Serialize, Deserialize, Clone)]
pub struct LoaderConfig {
    /// Rows of thumbnails disclosed per growth step; page size is
    /// columns * page_rows.
    pub page_rows: Option<usize>,
    /// Scroll distance from the bottom edge that counts as "near the end".
    pub near_end_px: Option<f32>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { page_rows: Some(2), near_end_px: Some(100.0) }
    }
}

impl LoaderConfig {
    pub fn page_rows(&self) -> usize {
        self.page_rows.unwrap_or(2).max(1)
    }

    pub fn near_end_px(&self) -> f32 {
        self.near_end_px.unwrap_or(100.0).max(0.0)
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ViewerConfig {
    pub min_zoom: Option<f32>,
    pub max_zoom: Option<f32>,
    pub zoom_step: Option<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { min_zoom: Some(1.0), max_zoom: Some(3.0), zoom_step: Some(0.5) }
    }
}

impl ViewerConfig {
    /// (min, max, step), sanitized so min <= max and step is positive.
    pub fn zoom_bounds(&self) -> (f32, f32, f32) {
        let min = self.min_zoom.unwrap_or(1.0).max(0.01);
        let max = self.max_zoom.unwrap_or(3.0).max(min);
        let step = self.zoom_step.unwrap_or(0.5).max(0.01);
        (min, max, step)
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct GeocodeConfig {
    /// Cached coordinate tiles before the cache is flushed.
    pub cache_capacity: Option<usize>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self { cache_capacity: Some(4096) }
    }
}

impl GeocodeConfig {
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity.unwrap_or(4096).max(1)
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub geocode: GeocodeConfig,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load from `path`, creating the file with defaults if it does not
    /// exist. Sections added since the file was written get their defaults
    /// written back.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            log::debug!("created config at {:?}", path);
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {:?}: {}", path, e)))?;

        let raw: toml::Value = toml::from_str(&content).unwrap_or(toml::Value::Integer(0));
        let missing = ["loader", "viewer", "geocode"].iter().any(|s| raw.get(s).is_none());
        if missing {
            config.save(path)?;
            log::debug!("wrote back missing config sections to {:?}", path);
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, toml_str)?;
        Ok(())
    }
}
