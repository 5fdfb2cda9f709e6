//! Click events and per-entity listener lists.

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

use crate::Scene;

/// A click travelling up the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Entity that was clicked.
    pub target: Entity,
    /// Entity whose listener is running.
    pub current_target: Entity,
}

impl ClickEvent {
    /// True while the event is being handled on the clicked entity itself.
    pub fn is_at_target(&self) -> bool {
        self.target == self.current_target
    }
}

/// Listener callback. Plain function pointers keep listener storage `Send + Sync`.
pub type ClickHandler = fn(&mut Scene, &ClickEvent);

/// Handle returned by [`Scene::subscribe_click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

#[derive(Component, Default)]
pub(crate) struct ClickListeners(Vec<(ListenerId, ClickHandler)>);

impl ClickListeners {
    pub(crate) fn push(&mut self, id: ListenerId, handler: ClickHandler) {
        self.0.push((id, handler));
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.0.len();
        self.0.retain(|(listener, _)| *listener != id);
        self.0.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn handlers(&self) -> Vec<ClickHandler> {
        self.0.iter().map(|(_, handler)| *handler).collect()
    }
}
