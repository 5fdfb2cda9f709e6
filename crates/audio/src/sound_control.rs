//! Click-triggered positional sound attached to a scene entity.

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use bevy_ecs::world::Mut;
use soundstage_core::{ConeAngles, Error, Result};
use soundstage_ecs::{ClickEvent, ListenerId, Scene};
use soundstage_render::ConeHelper;
use tracing::{debug, warn};

use crate::backend::{AudioHost, InstanceHandle, PositionalAudio, SourceHandle};
use crate::config::{SoundControlConfig, HELPER_DIVISIONS};

/// Positional sound bound to one entity.
///
/// Owns the cone helper; borrows the source from the [`AudioHost`].
#[derive(Component, Debug)]
pub struct SoundControl {
    config: SoundControlConfig,
    source: Option<SourceHandle>,
    anchor: Option<InstanceHandle>,
    helper: Option<ConeHelper>,
    listener: Option<ListenerId>,
}

impl SoundControl {
    /// Configure a source for `entity`, attach its cone helper and start
    /// listening for clicks.
    ///
    /// Re-attaching replaces the previous control on the entity.
    pub fn attach(scene: &mut Scene, entity: Entity, config: SoundControlConfig) -> Result<()> {
        if !scene.contains(entity) {
            return Err(Error::invalid(format!("unknown entity {entity:?}")));
        }
        let config = config.validated()?;
        let range = config.helper_range()?;

        let (source, anchor, helper) = {
            let mut host = scene
                .world_mut()
                .get_resource_mut::<AudioHost>()
                .ok_or(Error::MissingCapability("positional audio"))?;
            let audio = host.backend_mut();
            let source = audio.create_source(&config.source_settings())?;
            let anchor = audio.primary_instance(source);
            let helper =
                match build_helper(&config, range, audio.cone_angles(source), anchor) {
                    Ok(helper) => Some(helper),
                    Err(err) => {
                        warn!(?entity, %err, "cone helper unavailable, audio still attached");
                        None
                    }
                };
            (source, anchor, helper)
        };

        // Only replace an existing control once the new one is fully built.
        if scene.world().get::<SoundControl>(entity).is_some() {
            debug!(?entity, "replacing existing sound control");
            Self::detach(scene, entity);
        }

        let listener = scene.subscribe_click(entity, on_click);
        scene.world_mut().entity_mut(entity).insert(SoundControl {
            config,
            source: Some(source),
            anchor,
            helper,
            listener,
        });
        debug!(?entity, ?source, "sound control attached");
        Ok(())
    }

    /// Remove the control from `entity`, releasing its helper and listener.
    ///
    /// Returns the disposed control.
    pub fn detach(scene: &mut Scene, entity: Entity) -> Option<SoundControl> {
        let mut control = scene
            .world_mut()
            .get_entity_mut(entity)?
            .take::<SoundControl>()?;
        if let Some(listener) = control.listener.take() {
            scene.unsubscribe_click(entity, listener);
        }
        control.dispose();
        debug!(?entity, "sound control detached");
        Some(control)
    }

    /// Restart playback: `stop` then `play`. No-op without a source.
    pub fn play_sound(&self, audio: &mut dyn PositionalAudio) -> bool {
        let Some(source) = self.source else {
            return false;
        };
        audio.stop(source);
        audio.play(source);
        true
    }

    /// Stop playback. No-op without a source.
    pub fn stop_sound(&self, audio: &mut dyn PositionalAudio) -> bool {
        let Some(source) = self.source else {
            return false;
        };
        audio.stop(source);
        true
    }

    /// Rebuild the helper if the source's cone angles changed since the last build.
    pub fn sync_helper(&mut self, audio: &dyn PositionalAudio) -> bool {
        let (Some(source), Some(helper)) = (self.source, self.helper.as_mut()) else {
            return false;
        };
        let Some(angles) = audio.cone_angles(source) else {
            return false;
        };
        if helper.angles() == angles {
            return false;
        }
        helper.update(angles);
        true
    }

    /// Release the helper's geometry and materials.
    pub fn dispose(&mut self) {
        if let Some(helper) = self.helper.as_mut() {
            helper.dispose();
        }
    }

    /// Validated configuration.
    pub fn config(&self) -> &SoundControlConfig {
        &self.config
    }

    /// Source handle, if configured.
    pub fn source(&self) -> Option<SourceHandle> {
        self.source
    }

    /// Instance the helper is anchored to.
    pub fn anchor(&self) -> Option<InstanceHandle> {
        self.anchor
    }

    /// Cone helper, if it could be built.
    pub fn helper(&self) -> Option<&ConeHelper> {
        self.helper.as_ref()
    }
}

fn build_helper(
    config: &SoundControlConfig,
    range: f32,
    angles: Option<ConeAngles>,
    anchor: Option<InstanceHandle>,
) -> Result<ConeHelper> {
    anchor.ok_or(Error::MissingCapability("primary playable instance"))?;
    let angles = angles.ok_or(Error::MissingCapability("panner cone angles"))?;
    let (color_in, color_out) = config.helper_colors()?;
    ConeHelper::new(
        angles,
        range,
        HELPER_DIVISIONS,
        HELPER_DIVISIONS,
        color_in,
        color_out,
    )
}

fn on_click(scene: &mut Scene, event: &ClickEvent) {
    play_sound(scene, event.current_target);
}

/// Restart the sound on `entity`.
///
/// Returns whether commands were issued. A missing control, source or audio
/// host is not an error.
pub fn play_sound(scene: &mut Scene, entity: Entity) -> bool {
    with_control(scene, entity, |control, audio| control.play_sound(audio))
}

/// Stop the sound on `entity`. Same absorption rules as [`play_sound`].
pub fn stop_sound(scene: &mut Scene, entity: Entity) -> bool {
    with_control(scene, entity, |control, audio| control.stop_sound(audio))
}

/// Bring the helper on `entity` in line with the host's current cone angles.
pub fn sync_helper(scene: &mut Scene, entity: Entity) -> bool {
    let world = scene.world_mut();
    if !world.contains_resource::<AudioHost>() {
        return false;
    }
    world.resource_scope(|world, host: Mut<AudioHost>| {
        world
            .get_mut::<SoundControl>(entity)
            .map(|mut control| control.sync_helper(host.backend()))
            .unwrap_or(false)
    })
}

fn with_control(
    scene: &mut Scene,
    entity: Entity,
    command: impl FnOnce(&SoundControl, &mut dyn PositionalAudio) -> bool,
) -> bool {
    let world = scene.world_mut();
    if !world.contains_resource::<AudioHost>() {
        debug!(?entity, "no audio host, sound command skipped");
        return false;
    }
    world.resource_scope(|world, mut host: Mut<AudioHost>| match world.get::<SoundControl>(entity) {
        Some(control) => command(control, host.backend_mut()),
        None => {
            debug!(?entity, "no sound control on entity");
            false
        }
    })
}
