use anyhow::{bail, Result};
use soundstage_audio::{AudioHost, AudioLog, SoundControl, SoundControlPool, StubAudio};
use soundstage_ecs::{Entity, Scene};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::SceneConfig;

/// A scene built from config, with a log of every audio command.
pub struct LoadedScene {
    pub scene: Scene,
    pub log: AudioLog,
    pub entities: BTreeMap<String, Entity>,
}

impl LoadedScene {
    /// Click the entity named `name`. Returns the number of listeners invoked.
    pub fn click(&mut self, name: &str) -> Result<usize> {
        let Some(entity) = self.entities.get(name).copied() else {
            bail!("no entity named '{name}'");
        };
        Ok(self.scene.dispatch_click(entity))
    }
}

/// Spawn the configured entities, attach sound controls, then pools.
///
/// A sound control that fails to attach is logged and skipped; the rest of the
/// scene still loads.
pub fn build_scene(config: &SceneConfig) -> Result<LoadedScene> {
    let log = AudioLog::new();
    let mut scene = Scene::new();
    scene
        .world_mut()
        .insert_resource(AudioHost::new(StubAudio::with_log(log.clone())));

    let mut entities = BTreeMap::new();
    for entry in &config.entities {
        if entities.contains_key(&entry.name) {
            bail!("duplicate entity name '{}'", entry.name);
        }
        let entity = match &entry.parent {
            Some(parent) => {
                let Some(parent_entity) = entities.get(parent).copied() else {
                    bail!(
                        "entity '{}' references parent '{parent}' before it is declared",
                        entry.name
                    );
                };
                scene.spawn_child(parent_entity, entry.name.clone())?
            }
            None => scene.spawn(entry.name.clone()),
        };
        entities.insert(entry.name.clone(), entity);
    }

    // Controls first so pools see their members.
    for entry in &config.entities {
        let Some(sound) = entry.sound_config() else {
            continue;
        };
        let entity = entities[&entry.name];
        if let Err(err) = SoundControl::attach(&mut scene, entity, sound) {
            warn!(entity = %entry.name, %err, "sound control not attached");
        }
    }

    for entry in config.entities.iter().filter(|entry| entry.pool) {
        SoundControlPool::attach(&mut scene, entities[&entry.name])?;
    }

    info!(entities = entities.len(), "scene loaded");
    Ok(LoadedScene {
        scene,
        log,
        entities,
    })
}
