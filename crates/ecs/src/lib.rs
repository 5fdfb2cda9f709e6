#![warn(missing_docs)]
//! Scene graph helpers wrapping `bevy_ecs`: named entities, an ordered
//! parent/child hierarchy and bubbling click dispatch.

mod click;

use bevy_ecs::component::Component;
use bevy_ecs::world::World;
use soundstage_core::{Error, Result};

pub use bevy_ecs::entity::Entity;
pub use click::{ClickEvent, ClickHandler, ListenerId};
use click::ClickListeners;

/// Human-readable entity name, unique by convention.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

/// Parent of a child entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Children of an entity, in insertion order.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Entity tree plus input plumbing.
#[derive(Default)]
pub struct Scene {
    world: World,
    next_listener: u64,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the underlying ECS world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawn a root entity.
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let name = name.into();
        let entity = self.world.spawn(Name(name.clone())).id();
        tracing::debug!(?entity, name = %name, "spawned entity");
        entity
    }

    /// Spawn an entity as the last child of `parent`.
    pub fn spawn_child(&mut self, parent: Entity, name: impl Into<String>) -> Result<Entity> {
        if !self.contains(parent) {
            return Err(Error::invalid(format!("unknown parent entity {parent:?}")));
        }

        let entity = self.spawn(name);
        self.world.entity_mut(entity).insert(Parent(parent));
        match self.world.get_mut::<Children>(parent) {
            Some(mut children) => children.0.push(entity),
            None => {
                self.world.entity_mut(parent).insert(Children(vec![entity]));
            }
        }
        Ok(entity)
    }

    /// Whether `entity` is alive.
    pub fn contains(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_some()
    }

    /// Direct children of `entity` in insertion order.
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.world
            .get::<Children>(entity)
            .map(|children| children.0.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of `entity`, if any.
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<Parent>(entity).map(|parent| parent.0)
    }

    /// Name of `entity`.
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.world.get::<Name>(entity).map(|name| name.0.as_str())
    }

    /// Find the first entity with the given name.
    pub fn find(&mut self, name: &str) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &Name)>();
        let mut matches: Vec<Entity> = query
            .iter(&self.world)
            .filter(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
            .collect();
        matches.sort();
        matches.first().copied()
    }

    /// Despawn `entity` and its whole subtree.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }

        if let Some(parent) = self.parent(entity) {
            if let Some(mut children) = self.world.get_mut::<Children>(parent) {
                children.0.retain(|child| *child != entity);
            }
        }

        let mut stack = vec![entity];
        while let Some(next) = stack.pop() {
            stack.extend_from_slice(self.children(next));
            self.world.despawn(next);
        }
        true
    }

    /// Register a click listener on `entity`.
    ///
    /// Returns `None` when the entity does not exist.
    pub fn subscribe_click(&mut self, entity: Entity, handler: ClickHandler) -> Option<ListenerId> {
        if !self.contains(entity) {
            return None;
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        match self.world.get_mut::<ClickListeners>(entity) {
            Some(mut listeners) => listeners.push(id, handler),
            None => {
                let mut listeners = ClickListeners::default();
                listeners.push(id, handler);
                self.world.entity_mut(entity).insert(listeners);
            }
        }
        Some(id)
    }

    /// Remove a click listener. Returns whether it was registered.
    pub fn unsubscribe_click(&mut self, entity: Entity, id: ListenerId) -> bool {
        self.world
            .get_mut::<ClickListeners>(entity)
            .map(|mut listeners| listeners.remove(id))
            .unwrap_or(false)
    }

    /// Number of click listeners on `entity`.
    pub fn click_listener_count(&self, entity: Entity) -> usize {
        self.world
            .get::<ClickListeners>(entity)
            .map(ClickListeners::len)
            .unwrap_or(0)
    }

    /// Deliver a click on `target`, bubbling up through its ancestors.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_click(&mut self, target: Entity) -> usize {
        if !self.contains(target) {
            tracing::debug!(?target, "click on unknown entity ignored");
            return 0;
        }

        let mut path = vec![target];
        let mut cursor = target;
        while let Some(parent) = self.parent(cursor) {
            path.push(parent);
            cursor = parent;
        }

        let mut invoked = 0;
        for current_target in path {
            let handlers = match self.world.get::<ClickListeners>(current_target) {
                Some(listeners) => listeners.handlers(),
                None => continue,
            };
            let event = ClickEvent {
                target,
                current_target,
            };
            for handler in handlers {
                handler(self, &event);
                invoked += 1;
            }
        }
        tracing::debug!(?target, invoked, "click dispatched");
        invoked
    }
}
