//! Shared fixtures: a scriptable host plus instrumented services.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scoped_locator::{EntityId, Host, Lifecycle, SceneId, ServiceLocator};

#[derive(Default)]
struct HostState {
    loaded: HashSet<SceneId>,
    alive: HashSet<EntityId>,
    parents: HashMap<EntityId, EntityId>,
    scene_of: HashMap<EntityId, SceneId>,
    watched: HashSet<EntityId>,
}

/// In-memory scene/entity graph standing in for an engine.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn load_scene(&self, scene: SceneId) {
        self.state.lock().unwrap().loaded.insert(scene);
    }

    pub fn spawn(&self, entity: EntityId, scene: Option<SceneId>, parent: Option<EntityId>) {
        let mut state = self.state.lock().unwrap();
        state.alive.insert(entity);
        if let Some(scene) = scene {
            state.scene_of.insert(entity, scene);
        }
        if let Some(parent) = parent {
            state.parents.insert(entity, parent);
        }
    }

    pub fn mark_scene_unloaded(&self, scene: SceneId) {
        self.state.lock().unwrap().loaded.remove(&scene);
    }

    pub fn mark_entity_dead(&self, entity: EntityId) {
        self.state.lock().unwrap().alive.remove(&entity);
    }

    pub fn is_watching(&self, entity: EntityId) -> bool {
        self.state.lock().unwrap().watched.contains(&entity)
    }
}

impl Host for FakeHost {
    fn scene_is_loaded(&self, scene: SceneId) -> bool {
        self.state.lock().unwrap().loaded.contains(&scene)
    }

    fn entity_is_alive(&self, entity: EntityId) -> bool {
        self.state.lock().unwrap().alive.contains(&entity)
    }

    fn entity_parent(&self, entity: EntityId) -> Option<EntityId> {
        self.state.lock().unwrap().parents.get(&entity).copied()
    }

    fn entity_scene(&self, entity: EntityId) -> Option<SceneId> {
        self.state.lock().unwrap().scene_of.get(&entity).copied()
    }

    fn watch_entity(&self, entity: EntityId) {
        self.state.lock().unwrap().watched.insert(entity);
    }
}

/// A locator wired to a [`FakeHost`], with helpers that mirror how an engine
/// delivers scope-end events: mark the owner dead in the host, then notify
/// the matching disposer once.
pub struct World {
    pub host: Arc<FakeHost>,
    pub locator: ServiceLocator,
}

impl World {
    pub fn new() -> Self {
        let host = Arc::new(FakeHost::default());
        let locator = ServiceLocator::new(host.clone());
        World { host, locator }
    }

    pub fn load_scene(&self, raw: u32) -> SceneId {
        let scene = SceneId(raw);
        self.host.load_scene(scene);
        scene
    }

    pub fn spawn(&self, raw: u64, scene: Option<SceneId>) -> EntityId {
        let entity = EntityId(raw);
        self.host.spawn(entity, scene, None);
        entity
    }

    pub fn spawn_child(&self, raw: u64, parent: EntityId) -> EntityId {
        let entity = EntityId(raw);
        let scene = self.host.entity_scene(parent);
        self.host.spawn(entity, scene, Some(parent));
        entity
    }

    pub fn unload_scene(&self, scene: SceneId) {
        self.host.mark_scene_unloaded(scene);
        self.locator.scene_disposer().scene_unloaded(scene);
    }

    pub fn destroy_entity(&self, entity: EntityId) {
        self.host.mark_entity_dead(entity);
        self.locator.entity_disposer().entity_destroyed(entity);
    }
}

/// Counters shared between a test and its instrumented services.
#[derive(Debug, Default)]
pub struct Probe {
    pub created: AtomicUsize,
    pub resolved: AtomicUsize,
    pub scope_ended: AtomicUsize,
    pub disposed: AtomicUsize,
}

impl Probe {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    pub fn scope_ended(&self) -> usize {
        self.scope_ended.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// A service that reports every lifecycle hook into its [`Probe`].
#[derive(Debug)]
pub struct ProbeService {
    pub probe: Arc<Probe>,
}

impl ProbeService {
    pub fn new(probe: Arc<Probe>) -> Arc<Self> {
        Arc::new(ProbeService { probe })
    }
}

impl Lifecycle for ProbeService {
    fn on_provider_created(&self) {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
    }

    fn on_resolved(&self) {
        self.probe.resolved.fetch_add(1, Ordering::SeqCst);
    }

    fn on_scope_ended(&self) {
        self.probe.scope_ended.fetch_add(1, Ordering::SeqCst);
    }

    fn dispose(&self) {
        self.probe.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Trait used by alias tests.
pub trait Reporter: Send + Sync {
    fn tag(&self) -> &'static str;
}

impl Reporter for ProbeService {
    fn tag(&self) -> &'static str {
        "probe"
    }
}
