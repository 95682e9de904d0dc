//! Scope-end event routing.
//!
//! Each locator owns one [`SceneDisposer`] and one [`EntityDisposer`]. The
//! host delivers unload/destroy events here; the disposer finds the teardown
//! handle for the owner, disposes it, then notifies observers. Delivering an
//! event for an owner with no registrations is a no-op, so hosts may forward
//! every unload/destroy unconditionally.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{LocatorError, LocatorResult};
use crate::handle::RegistrationHandle;
use crate::host::{EntityId, SceneId};
use crate::internal::guarded;

type Observer<I> = Arc<dyn Fn(I) + Send + Sync>;

struct DisposerState<I> {
    handles: Mutex<HashMap<I, RegistrationHandle>>,
    observers: Mutex<Vec<Observer<I>>>,
}

impl<I: Copy + Eq + std::hash::Hash> DisposerState<I> {
    fn new() -> Self {
        DisposerState {
            handles: Mutex::new(HashMap::new()),
            observers: Mutex::new(Vec::new()),
        }
    }

    fn register(&self, owner: I, handle: RegistrationHandle, what: &'static str) -> LocatorResult<()> {
        let mut handles = self.handles.lock().unwrap();
        if handles.contains_key(&owner) {
            return Err(LocatorError::Duplicate {
                type_name: "RegistrationHandle",
                scope: what,
            });
        }
        handles.insert(owner, handle);
        Ok(())
    }

    fn owner_ended(&self, owner: I) {
        let handle = self.handles.lock().unwrap().remove(&owner);
        let Some(handle) = handle else { return };
        handle.dispose();
        let observers: Vec<Observer<I>> = self.observers.lock().unwrap().clone();
        for observer in observers {
            guarded("disposal observer", || observer(owner));
        }
    }

    fn try_get(&self, owner: I) -> Option<RegistrationHandle> {
        self.handles.lock().unwrap().get(&owner).cloned()
    }
}

/// Routes scene-unload events to the scene store teardown handle.
pub struct SceneDisposer {
    state: DisposerState<SceneId>,
}

impl SceneDisposer {
    pub(crate) fn new() -> Self {
        SceneDisposer {
            state: DisposerState::new(),
        }
    }

    pub(crate) fn register_handle(
        &self,
        scene: SceneId,
        handle: RegistrationHandle,
    ) -> LocatorResult<()> {
        self.state.register(scene, handle, "scene disposer")
    }

    /// Host entry point: the scene has unloaded. Disposes its store handle
    /// (if any) and notifies observers. Safe to call for scenes that never
    /// registered anything, and safe to call at most once per unload.
    pub fn scene_unloaded(&self, scene: SceneId) {
        log::debug!("scene {:?} unloaded", scene);
        self.state.owner_ended(scene);
    }

    /// The live teardown handle for `scene`, if it has a store.
    pub fn try_get_handle(&self, scene: SceneId) -> Option<RegistrationHandle> {
        self.state.try_get(scene)
    }

    /// Observes every disposed scene. Observer panics are logged and do not
    /// affect other observers.
    pub fn on_disposed(&self, observer: impl Fn(SceneId) + Send + Sync + 'static) {
        self.state.observers.lock().unwrap().push(Arc::new(observer));
    }
}

/// Routes entity-destroy events to the entity store teardown handle.
pub struct EntityDisposer {
    state: DisposerState<EntityId>,
}

impl EntityDisposer {
    pub(crate) fn new() -> Self {
        EntityDisposer {
            state: DisposerState::new(),
        }
    }

    pub(crate) fn register_handle(
        &self,
        entity: EntityId,
        handle: RegistrationHandle,
    ) -> LocatorResult<()> {
        self.state.register(entity, handle, "entity disposer")
    }

    /// Host entry point: the entity has been destroyed.
    pub fn entity_destroyed(&self, entity: EntityId) {
        log::debug!("entity {:?} destroyed", entity);
        self.state.owner_ended(entity);
    }

    /// The live teardown handle for `entity`, if it has a store.
    pub fn try_get_handle(&self, entity: EntityId) -> Option<RegistrationHandle> {
        self.state.try_get(entity)
    }

    /// Observes every disposed entity.
    pub fn on_disposed(&self, observer: impl Fn(EntityId) + Send + Sync + 'static) {
        self.state.observers.lock().unwrap().push(Arc::new(observer));
    }
}
