use anyhow::{Context, Result};
use serde::Deserialize;
use soundstage_audio::SoundControlConfig;
use std::{fs, path::Path};
use tracing::warn;

const DEFAULT_SCENE_PATH: &str = "config/scene.toml";

/// Declarative scene: an entity list plus a click script.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Entity names clicked in order when no `--click` is given.
    pub clicks: Vec<String>,
    /// Entities in declaration order. Parents must be declared before children.
    #[serde(rename = "entity")]
    pub entities: Vec<EntityConfig>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EntityConfig {
    pub name: String,
    pub parent: Option<String>,
    /// Attach a sound control pool to this entity.
    pub pool: bool,
    /// Sound control options as a table. Read leniently: a malformed value keeps
    /// its default instead of rejecting the scene.
    pub sound: Option<toml::Table>,
    /// Sound control options in markup attribute form (`"src: a.ogg; loop: true"`).
    pub sound_attr: Option<String>,
}

impl EntityConfig {
    /// Sound control options, preferring the table form over the attribute string.
    pub fn sound_config(&self) -> Option<SoundControlConfig> {
        if let Some(table) = &self.sound {
            return Some(SoundControlConfig::from_properties(
                table.iter().map(|(key, value)| (key, property_value(value))),
            ));
        }
        self.sound_attr
            .as_deref()
            .map(SoundControlConfig::from_attribute_str)
    }
}

fn property_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl SceneConfig {
    /// Load the scene from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_SCENE_PATH))
    }

    /// Load the scene from an explicit path, falling back to the demo scene on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err:#}. Using demo scene", path.display());
                    Self::demo()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Scene not found at {}. Using demo scene", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using demo scene", path.display());
                }
                Self::demo()
            }
        }
    }

    /// Parse a TOML scene.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid scene TOML")
    }

    /// Built-in scene: a pool of two speakers next to an unrelated prop.
    pub fn demo() -> Self {
        Self {
            clicks: vec!["band".into(), "drums".into()],
            entities: vec![
                EntityConfig {
                    name: "band".into(),
                    pool: true,
                    ..Default::default()
                },
                EntityConfig {
                    name: "drums".into(),
                    parent: Some("band".into()),
                    sound_attr: Some(
                        "src: audio/drums.ogg; refDistance: 20; rolloffFactor: 4; \
                         cone: true; coneInAngle: 60; coneOutAngle: 180; coneOutLevel: 0.2"
                            .into(),
                    ),
                    ..Default::default()
                },
                EntityConfig {
                    name: "bass".into(),
                    parent: Some("band".into()),
                    sound_attr: Some("src: audio/bass.ogg; loop: true".into()),
                    ..Default::default()
                },
                EntityConfig {
                    name: "stage-light".into(),
                    parent: Some("band".into()),
                    ..Default::default()
                },
            ],
        }
    }
}
