use fortuna::{AspectCatalog, AspectDefinition, SearchConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Relative locations tried when no explicit config path is given.
const DEFAULT_PATHS: [&str; 2] = ["configs/fortuna.toml", "../../configs/fortuna.toml"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FortunaSettings {
    pub search: SearchConfig,
    pub catalog: AspectCatalog,
}

#[derive(Debug, Clone, Deserialize)]
struct AspectToml {
    name: String,
    angle: f64,
    #[serde(default = "default_orb")]
    orb: f64,
}

fn default_orb() -> f64 {
    6.0
}

#[derive(Debug, Clone, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    search: Option<SearchConfig>,
    #[serde(default)]
    aspects: Option<Vec<AspectToml>>,
    /// Per-aspect orb overrides applied on top of the catalog
    #[serde(default)]
    orbs: Option<BTreeMap<String, f64>>,
}

/// Read `fortuna.toml` from `path`, or from the common relative locations.
pub fn read_config_text(path: Option<&Path>) -> anyhow::Result<String> {
    if let Some(path) = path {
        return fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Could not read config {}: {e}", path.display()));
    }
    for p in &DEFAULT_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            log::debug!("loaded config from {p}");
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load fortuna.toml from {:?}", DEFAULT_PATHS);
}

/// Parse settings; missing sections fall back to the built-in defaults.
pub fn parse_settings(text: &str) -> anyhow::Result<FortunaSettings> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse fortuna.toml: {e}"))?;
    let RootConfigToml { search, aspects, orbs } = root;

    let search = search.unwrap_or_default();
    search
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [search] section: {e}"))?;

    let mut catalog = match aspects {
        Some(list) if list.is_empty() => anyhow::bail!("[[aspects]] must list at least one aspect"),
        Some(list) => AspectCatalog::new(
            list.into_iter()
                .map(|a| AspectDefinition::new(a.name, a.angle, a.orb))
                .collect(),
        ),
        None => AspectCatalog::default(),
    };
    for (name, orb) in orbs.unwrap_or_default() {
        if !catalog.set_orb(&name, orb) {
            anyhow::bail!("[orbs] names unknown aspect `{name}`");
        }
    }

    Ok(FortunaSettings { search, catalog })
}

/// Load settings from `path` or the default locations. With no explicit path
/// and no config file present, the defaults are used.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<FortunaSettings> {
    match read_config_text(path) {
        Ok(text) => parse_settings(&text),
        Err(e) if path.is_none() => {
            log::info!("{e}; using default settings");
            Ok(FortunaSettings::default())
        }
        Err(e) => Err(e),
    }
}
