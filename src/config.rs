//! CLI configuration.
//!
//! Handles loading, validating and merging `srcset-pick.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [viewport]
//! width = 1280        # Viewport width in CSS pixels
//! height = 800        # Viewport height in CSS pixels
//! pixel_ratio = 1.0   # Device pixel ratio
//!
//! [presets.mobile]
//! width = 390
//! height = 844
//! pixel_ratio = 3.0
//!
//! [output]
//! placeholder = "data:image/gif;base64,..."  # Printed when nothing matches
//! ```
//!
//! Presets are merged key by key, so a user file can add a preset or
//! override one field of a stock preset. Unknown keys are rejected to catch
//! typos early.

use crate::source::BLANK_IMAGE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "srcset-pick.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is not valid TOML: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config has an unknown key or a mistyped value: {0}")]
    Schema(#[from] toml::de::Error),
    #[error("Cannot encode stock config: {0}")]
    Stock(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Unknown viewport preset `{0}`")]
    UnknownPreset(String),
}

/// Configuration loaded from `srcset-pick.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickConfig {
    /// Viewport used when neither flags nor a preset say otherwise.
    pub viewport: ViewportConfig,
    /// Named viewports selectable with `--preset`.
    pub presets: BTreeMap<String, ViewportConfig>,
    pub output: OutputConfig,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            presets: stock_presets(),
            output: OutputConfig::default(),
        }
    }
}

fn stock_presets() -> BTreeMap<String, ViewportConfig> {
    [
        ("mobile", 390, 844, 3.0),
        ("tablet", 820, 1180, 2.0),
        ("desktop", 1920, 1080, 1.0),
    ]
    .into_iter()
    .map(|(name, width, height, pixel_ratio)| {
        (
            name.to_string(),
            ViewportConfig {
                width,
                height,
                pixel_ratio,
            },
        )
    })
    .collect()
}

impl PickConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate("viewport")?;
        for (name, preset) in &self.presets {
            preset.validate(&format!("presets.{name}"))?;
        }
        if self.output.placeholder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.placeholder must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The default viewport, or the named preset.
    pub fn viewport_for(&self, preset: Option<&str>) -> Result<&ViewportConfig, ConfigError> {
        match preset {
            None => Ok(&self.viewport),
            Some(name) => self
                .presets
                .get(name)
                .ok_or_else(|| ConfigError::UnknownPreset(name.to_string())),
        }
    }
}

/// Viewport dimensions and density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            pixel_ratio: 1.0,
        }
    }
}

impl ViewportConfig {
    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if !self.pixel_ratio.is_finite() || self.pixel_ratio < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{key}.pixel_ratio must be a non-negative number"
            )));
        }
        Ok(())
    }
}

/// What the CLI prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// URL printed by `select` when no candidate matches.
    pub placeholder: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            placeholder: BLANK_IMAGE.to_string(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Read `path` and lay it over the stock config.
///
/// A missing file is fine: every key has a stock value, so the command runs
/// without any config. A file that is present must parse, must use only
/// known keys and must pass [`PickConfig::validate`].
pub fn load_config(path: &Path) -> Result<PickConfig, ConfigError> {
    let mut layered = toml::Value::try_from(PickConfig::default())?;
    match fs::read_to_string(path) {
        Ok(content) => {
            let user: toml::Value = toml::from_str(&content).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            overlay(&mut layered, user);
            log::debug!("Loaded config from {}", path.display());
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using stock values", path.display());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    }
    let config: PickConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Lay `user` over `base` in place. Tables combine key by key, so a file can
/// change one field of a stock preset; any other value replaces the slot.
fn overlay(base: &mut toml::Value, user: toml::Value) {
    match (base, user) {
        (toml::Value::Table(base), toml::Value::Table(user)) => {
            for (key, value) in user {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Documented `srcset-pick.toml` printed by `gen-config`. Loading it back
/// yields [`PickConfig::default`].
pub fn stock_config_toml() -> &'static str {
    r##"# srcset-pick configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./srcset-pick.toml, or from the path given with
# --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Default viewport
# ---------------------------------------------------------------------------
# Used by `select` when no --width/--height/--pixel-ratio flags and no
# --preset are given.
[viewport]
width = 1280
height = 800
pixel_ratio = 1.0

# ---------------------------------------------------------------------------
# Viewport presets
# ---------------------------------------------------------------------------
# Pick one with `select --preset NAME`. Add as many as you like; explicit
# flags still override individual values.
[presets.desktop]
width = 1920
height = 1080
pixel_ratio = 1.0

[presets.mobile]
width = 390
height = 844
pixel_ratio = 3.0

[presets.tablet]
width = 820
height = 1180
pixel_ratio = 2.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Printed by `select` when no candidate matches (a 1x1 transparent GIF).
placeholder = "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw=="
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults and parsing
    // =========================================================================

    #[test]
    fn default_config_has_stock_presets() {
        let config = PickConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.presets["mobile"].pixel_ratio, 3.0);
        assert_eq!(config.output.placeholder, BLANK_IMAGE);
    }

    #[test]
    fn parse_partial_viewport() {
        let config: PickConfig = toml::from_str(
            r#"
[viewport]
width = 390
"#,
        )
        .unwrap();
        assert_eq!(config.viewport.width, 390);
        // Unspecified defaults preserved
        assert_eq!(config.viewport.height, 800);
        assert_eq!(config.viewport.pixel_ratio, 1.0);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<PickConfig, _> = toml::from_str(
            r#"
[viewport]
widht = 390
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // viewport_for
    // =========================================================================

    #[test]
    fn viewport_for_default_and_preset() {
        let config = PickConfig::default();
        assert_eq!(config.viewport_for(None).unwrap().width, 1280);
        assert_eq!(config.viewport_for(Some("tablet")).unwrap().width, 820);
    }

    #[test]
    fn viewport_for_unknown_preset() {
        let config = PickConfig::default();
        let err = config.viewport_for(Some("watch")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(ref name) if name == "watch"));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(PickConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_negative_pixel_ratio() {
        let mut config = PickConfig::default();
        config.viewport.pixel_ratio = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("viewport.pixel_ratio"));
    }

    #[test]
    fn validate_preset_pixel_ratio_names_preset() {
        let mut config = PickConfig::default();
        config.presets.get_mut("tablet").unwrap().pixel_ratio = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("presets.tablet"));
    }

    #[test]
    fn validate_empty_placeholder() {
        let mut config = PickConfig::default();
        config.output.placeholder = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, PickConfig::default());
    }

    #[test]
    fn load_config_merges_over_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[viewport]
pixel_ratio = 2.0

[presets.mobile]
width = 360

[presets.watch]
width = 198
height = 242
pixel_ratio = 2.0
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.pixel_ratio, 2.0);
        // Overridden field, other preset fields kept
        assert_eq!(config.presets["mobile"].width, 360);
        assert_eq!(config.presets["mobile"].height, 844);
        // Added preset alongside stock ones
        assert_eq!(config.presets["watch"].height, 242);
        assert!(config.presets.contains_key("desktop"));
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[viewport\nwidth = 1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn load_config_rejects_unknown_key_in_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[output]\nplacehoder = \"x.gif\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Schema(_))));
    }

    #[test]
    fn load_config_reports_unreadable_path() {
        // A directory exists but cannot be read as a file.
        let tmp = TempDir::new().unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[viewport]
pixel_ratio = -2.0
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn overlay_replaces_scalars_and_merges_tables() {
        let mut base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let user: toml::Value = toml::from_str("a = 5\nb = 3\n[t]\ny = 9\n").unwrap();
        overlay(&mut base, user);
        assert_eq!(base["a"].as_integer(), Some(5));
        assert_eq!(base["b"].as_integer(), Some(3));
        assert_eq!(base["t"]["x"].as_integer(), Some(1));
        assert_eq!(base["t"]["y"].as_integer(), Some(9));
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: PickConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, PickConfig::default());
    }

    #[test]
    fn stock_config_toml_loads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, stock_config_toml()).unwrap();
        assert_eq!(load_config(&path).unwrap(), PickConfig::default());
    }
}
