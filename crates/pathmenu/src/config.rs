use crate::menu::{
    DEFAULT_ANIMATION_DURATION, DEFAULT_MENU_END_ARC, Granularity, ItemAnimationType,
};
use crate::timing::TimingPreset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Menu settings as read from `config.toml` and `PATHMENU_*` variables.
///
/// Optional fields leave the control's current value alone when unset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Defaults to half the control's frame width.
    pub menu_radius: Option<f64>,
    pub menu_start_arc: f64,
    pub menu_end_arc: f64,
    pub scroll_start_arc: Option<f64>,
    pub scroll_end_arc: Option<f64>,
    pub scroll_whole_circle: Option<bool>,
    pub scroll_angle_granularity: Granularity,
    pub scroll_minimum_num: u32,
    pub item_animation_duration: f64,
    pub item_animation_type: ItemAnimationType,
    /// Applied after `item_animation_type`, so it overrides the linear
    /// timing that `rotate_linear` selects.
    pub timing_function: Option<TimingPreset>,
    pub draggable: bool,
    pub scrollable: bool,
    pub antialiasing: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            menu_radius: None,
            menu_start_arc: 0.0,
            menu_end_arc: DEFAULT_MENU_END_ARC,
            scroll_start_arc: None,
            scroll_end_arc: None,
            scroll_whole_circle: None,
            scroll_angle_granularity: Granularity::default(),
            scroll_minimum_num: 1,
            item_animation_duration: DEFAULT_ANIMATION_DURATION,
            item_animation_type: ItemAnimationType::default(),
            timing_function: None,
            draggable: false,
            scrollable: false,
            antialiasing: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "pathmenu", "pathmenu").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("PATHMENU").try_parsing(true)
}

pub fn load_config() -> Result<MenuConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Loads `path` if it exists, with `PATHMENU_*` variables layered on top.
pub fn load_config_from(path: &Path) -> Result<MenuConfig, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_config_from_str(toml: &str) -> Result<MenuConfig, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Like [`load_config`], but falls back to defaults on any error.
pub fn load_or_default() -> MenuConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            MenuConfig::default()
        }
    }
}

/// Writes the commented default file to `path` unless one is already there.
pub fn write_default_config_to(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(())
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    write_default_config_to(&path)?;
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
