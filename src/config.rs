// Configuration management
//
// Host settings persisted as TOML: surface size, render mode, optional frame
// cap, default image, screenshot location, and log level.

use crate::display::RenderMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE: &str = "rust8.toml";

/// Host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Program image settings
    pub image: ImageConfig,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Surface width in pixels
    pub width: u32,

    /// Surface height in pixels
    pub height: u32,

    /// How lit cells are painted
    pub render_mode: RenderMode,

    /// Optional frames-per-second cap; absent means uncapped
    pub frame_cap: Option<u32>,
}

/// Program image configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImageConfig {
    /// Base64 image file used when none is given on the command line
    pub path: Option<PathBuf>,
}

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "rust8=debug")
    pub level: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            width: 800,
            height: 400,
            render_mode: RenderMode::WindowGradient,
            frame_cap: None,
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        ScreenshotConfig {
            directory: PathBuf::from("screenshots"),
            include_timestamp: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl HostConfig {
    /// Load configuration from file, or the defaults if there is none
    ///
    /// A missing file yields the default configuration; the file is not
    /// created here. A file that exists but can't be read or parsed is an
    /// error and is left untouched.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust8::config::HostConfig;
    ///
    /// let config = HostConfig::load_or_default("rust8.toml").expect("Invalid configuration");
    /// ```
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        match Self::load(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            result => result,
        }
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, io::Error> {
        toml::from_str(contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}
