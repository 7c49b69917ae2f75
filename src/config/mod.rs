//! Configuration loading.
//!
//! The policy types live in [`tf_core::config`]; this module reads them from
//! TOML, validates them, and loads the optional per-movie crop map.

pub use tf_core::config::*;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tf_core::CropRect;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./trackforge.toml",
        "~/.config/trackforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!(path = %path.display(), "using config file");
            return load_config(path);
        }
    }

    prepare(Config::default())
}

/// Validate and normalize a configuration, whatever its origin.
///
/// Run again after command-line overrides are applied.
pub fn prepare(mut config: Config) -> Result<Config> {
    config.tracks = config.tracks.normalized();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Crop map
// ---------------------------------------------------------------------------

/// Per-movie crop windows keyed by main file stem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropMap(BTreeMap<String, CropRect>);

impl CropMap {
    /// Parse a TOML table of `stem = "w:h:x:y"` entries.
    pub fn parse(content: &str) -> Result<Self> {
        let map: BTreeMap<String, CropRect> =
            toml::from_str(content).context("Failed to parse crop map")?;
        Ok(Self(map))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read crop map: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("In crop map {:?}", path))
    }

    /// Crop window for the movie whose main file is `main_file`.
    pub fn get(&self, main_file: &Path) -> Option<CropRect> {
        let stem = main_file.file_stem()?.to_string_lossy();
        self.0.get(stem.as_ref()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_map_lookup_by_stem() {
        let map = CropMap::parse(
            r#"
            "Heat" = "1920:800:0:140"
            "The Thing" = "1904:1072:8:4"
            "#,
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(Path::new("/m/Heat.mkv")),
            Some(CropRect::new(1920, 800, 0, 140))
        );
        assert_eq!(map.get(Path::new("/m/Ronin.mkv")), None);
    }

    #[test]
    fn crop_map_rejects_bad_windows() {
        assert!(CropMap::parse(r#"Heat = "1920x800""#).is_err());
    }

    #[test]
    fn prepare_normalizes_languages() {
        let config: Config = toml::from_str(
            r#"
            [[tracks]]
            type = "video"
            languages = ["und"]

            [[tracks]]
            type = "audio"
            languages = ["deu"]
            "#,
        )
        .unwrap();
        let config = prepare(config).unwrap();
        assert_eq!(
            config.tracks.languages(tf_core::TrackType::Audio, false),
            Some(&["ger".to_string()][..])
        );
    }
}
