//! Container that plays all of its child sound controls on click.

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use soundstage_core::{Error, Result};
use soundstage_ecs::{ClickEvent, ListenerId, Scene};
use tracing::debug;

use crate::sound_control::{play_sound, SoundControl};

/// Group of sound controls triggered together.
///
/// Members are the direct children carrying a [`SoundControl`] at attach time,
/// in child order. Later hierarchy changes are not tracked.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SoundControlPool {
    members: Vec<Entity>,
    listener: Option<ListenerId>,
}

impl SoundControlPool {
    /// Snapshot the sound controls among `entity`'s children and listen for clicks.
    pub fn attach(scene: &mut Scene, entity: Entity) -> Result<()> {
        if !scene.contains(entity) {
            return Err(Error::invalid(format!("unknown entity {entity:?}")));
        }
        if scene.world().get::<SoundControlPool>(entity).is_some() {
            Self::detach(scene, entity);
        }

        let members: Vec<Entity> = scene
            .children(entity)
            .iter()
            .copied()
            .filter(|child| scene.world().get::<SoundControl>(*child).is_some())
            .collect();
        debug!(?entity, members = members.len(), "sound control pool attached");

        let listener = scene.subscribe_click(entity, on_click);
        scene
            .world_mut()
            .entity_mut(entity)
            .insert(SoundControlPool { members, listener });
        Ok(())
    }

    /// Remove the pool from `entity` and stop listening.
    pub fn detach(scene: &mut Scene, entity: Entity) -> Option<SoundControlPool> {
        let mut pool = scene
            .world_mut()
            .get_entity_mut(entity)?
            .take::<SoundControlPool>()?;
        if let Some(listener) = pool.listener.take() {
            scene.unsubscribe_click(entity, listener);
        }
        Some(pool)
    }

    /// Member entities in trigger order.
    pub fn members(&self) -> &[Entity] {
        &self.members
    }
}

/// Restart every member of the pool on `entity`, in order.
///
/// Returns how many members issued commands.
pub fn play_children(scene: &mut Scene, entity: Entity) -> usize {
    let members = match scene.world().get::<SoundControlPool>(entity) {
        Some(pool) => pool.members.clone(),
        None => return 0,
    };

    let mut played = 0;
    for member in members {
        if play_sound(scene, member) {
            played += 1;
        }
    }
    debug!(?entity, played, "pool triggered");
    played
}

fn on_click(scene: &mut Scene, event: &ClickEvent) {
    // Clicks bubbling up from a child already played that child.
    if !event.is_at_target() {
        return;
    }
    play_children(scene, event.current_target);
}
