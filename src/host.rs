//! Engine integration surface.
//!
//! The locator is engine-agnostic: everything it needs to know about scenes
//! and entities comes through the [`Host`] trait. The embedding engine
//! implements `Host` and, in return, is responsible for delivering scope-end
//! events to [`SceneDisposer::scene_unloaded`] and
//! [`EntityDisposer::entity_destroyed`] exactly once per unload/destroy.
//!
//! [`SceneDisposer::scene_unloaded`]: crate::SceneDisposer::scene_unloaded
//! [`EntityDisposer::entity_destroyed`]: crate::EntityDisposer::entity_destroyed

/// Opaque scene identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u32);

/// Opaque entity identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// What the locator asks of the embedding engine.
///
/// Liveness queries gate resolution (`ExpiredScope` on dead owners) and
/// `entity_parent`/`entity_scene` drive the fallback chain for entity
/// resolvers.
pub trait Host: Send + Sync + 'static {
    /// Whether the scene is currently loaded.
    fn scene_is_loaded(&self, scene: SceneId) -> bool;

    /// Whether the entity still exists.
    fn entity_is_alive(&self, entity: EntityId) -> bool;

    /// The entity's hierarchy parent, if any.
    fn entity_parent(&self, entity: EntityId) -> Option<EntityId>;

    /// The scene the entity belongs to, if any.
    fn entity_scene(&self, entity: EntityId) -> Option<SceneId>;

    /// Called when the locator starts tracking `entity`.
    ///
    /// Hosts that deliver destroy events by polling or per-entity hooks can
    /// use this to start watching; hosts with a global destroy callback can
    /// leave the default no-op.
    fn watch_entity(&self, entity: EntityId) {
        let _ = entity;
    }
}
