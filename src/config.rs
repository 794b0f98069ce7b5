//! Runtime settings, read from JSON with every field optional.

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

use crate::data_structures::camera::FallbackCamera;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PHONG_GLTF_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "phong-gltf.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Phong Reflection with Texture with glTF 2.0".to_string(),
            width: 500,
            height: 500,
        }
    }
}

/// Point light in world coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LightParams {
    pub position: [f32; 3],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 1.0],
            ambient: [1.0; 4],
            diffuse: [1.0; 4],
            specular: [1.0; 4],
        }
    }
}

/// Surface response shared by every mesh. The diffuse colour comes from the
/// base-color texture.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MaterialParams {
    pub ambient: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            ambient: [0.3, 0.0, 0.0, 1.0],
            specular: [1.0; 4],
            shininess: 60.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory the scene file name is resolved against.
    pub asset_dir: PathBuf,
    pub window: WindowSettings,
    pub clear_colour: [f64; 4],
    pub light: LightParams,
    pub material: MaterialParams,
    pub fallback_camera: FallbackCamera,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("BoxTextured"),
            window: WindowSettings::default(),
            clear_colour: [0.5, 0.5, 0.5, 1.0],
            light: LightParams::default(),
            material: MaterialParams::default(),
            fallback_camera: FallbackCamera::default(),
        }
    }
}

impl Config {
    pub fn from_json(value: &str) -> anyhow::Result<Self> {
        serde_json::from_str(value).context("Malformed config")
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("In config {}", path.display()))
    }

    /// Path from [`CONFIG_ENV`], or [`DEFAULT_CONFIG_PATH`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Resolves a scene file name against the asset directory.
    pub fn scene_path(&self, file_name: &str) -> PathBuf {
        self.asset_dir.join(file_name)
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_colour;
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            Config::from_json(r#"{ "light": { "position": [3.0, 2.0, 1.0] }, "asset_dir": "assets" }"#)
                .unwrap();
        assert_eq!(config.light.position, [3.0, 2.0, 1.0]);
        assert_eq!(config.light.diffuse, [1.0; 4]);
        assert_eq!(config.material.shininess, 60.0);
        assert_eq!(config.scene_path("Box.gltf"), PathBuf::from("assets/Box.gltf"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ \"window\": 5 }").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/phong-gltf.json").unwrap();
        assert_eq!(config.window.width, 500);
        assert_eq!(config.fallback_camera.fovy_degrees, 70.0);
    }
}
