//! Editor configuration
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! The file is looked up at `$PRIMEDIT_CONFIG`, then `primedit.toml` in the
//! working directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EditorError, Result};

pub const CONFIG_ENV: &str = "PRIMEDIT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "primedit.toml";

/// Startup settings read from `primedit.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub ui: UiConfig,
    pub orbit: OrbitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "primedit".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

/// Camera values restored by the camera panel's reset action.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.6, 3.0],
        }
    }
}

/// Swapchain and shadow settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shadow_map_size: u32,
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_size: f32,
    pub panel_width: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            panel_width: 340.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

impl EditorConfig {
    /// Parses a configuration document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Config` when the document is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// An I/O failure becomes `EditorError::Io`; parse failures as in
    /// [`EditorConfig::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Loads the configuration file if one exists, falling back to defaults.
    ///
    /// A file that exists but fails to parse is an error; a missing file is not.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.is_file() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(&path)
        } else {
            log::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_camera() {
        let config = EditorConfig::default();
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.camera.position, [0.0, 0.6, 3.0]);
        assert_eq!(config.render.shadow_map_size, 2048);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EditorConfig::from_toml(
            r#"
            [window]
            width = 640

            [camera]
            fov = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera.fov, 50.0);
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let result = EditorConfig::from_toml("[window\nwidth = ");
        assert!(matches!(result, Err(EditorError::Config(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = EditorConfig::from_file(Path::new("/definitely/not/here.toml"));
        match result {
            Err(EditorError::Io { path, .. }) => assert!(path.ends_with("here.toml")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
