//! Registration, duplicates, aliasing, and snapshots.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{Probe, ProbeService, Reporter, World};
use scoped_locator::{
    Lifecycle, LocatorError, Resolver, ResolverCore, Scope, ServiceKind,
};

#[derive(Debug)]
struct Settings {
    difficulty: u8,
}
impl Lifecycle for Settings {}

#[test]
fn global_instance_resolves_by_concrete_type() {
    let world = World::new();
    world
        .locator
        .register_global_instance(Arc::new(Settings { difficulty: 3 }))
        .unwrap();
    let settings = world.locator.for_global().get::<Settings>().unwrap();
    assert_eq!(settings.difficulty, 3);
}

#[test]
fn duplicate_registration_is_rejected_per_scope() {
    let world = World::new();
    let scene = world.load_scene(1);
    let probe = Arc::new(Probe::default());

    let first = ProbeService::new(probe.clone());
    world.locator.register_global_instance(first.clone()).unwrap();
    let err = world
        .locator
        .register_global_instance(ProbeService::new(probe.clone()))
        .unwrap_err();
    assert!(matches!(
        err,
        LocatorError::Duplicate { scope: "global", .. }
    ));

    // The failed duplicate must not displace the original.
    let resolved = world.locator.for_global().get::<ProbeService>().unwrap();
    assert!(Arc::ptr_eq(&resolved, &first));

    // The same type is fine in a different scope.
    world
        .locator
        .register_scene_instance(scene, ProbeService::new(probe.clone()))
        .unwrap();
    let err = world
        .locator
        .register_scene_instance(scene, ProbeService::new(probe))
        .unwrap_err();
    assert!(matches!(
        err,
        LocatorError::Duplicate { scope: "scene", .. }
    ));
}

#[test]
fn transient_factory_runs_per_resolve() {
    let world = World::new();
    let made = Arc::new(AtomicUsize::new(0));
    let counter = made.clone();
    world
        .locator
        .register_transient(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Settings { difficulty: 1 })
        })
        .unwrap();

    let a = world.locator.for_global().get::<Settings>().unwrap();
    let b = world.locator.for_global().get::<Settings>().unwrap();
    assert_eq!(made.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn alias_resolves_to_the_same_instance() {
    let world = World::new();
    let probe = Arc::new(Probe::default());
    let service = ProbeService::new(probe);

    world
        .locator
        .register_global_instance(service.clone())
        .unwrap()
        .as_trait::<dyn Reporter>(|arc| arc)
        .unwrap();

    let direct = world.locator.for_global().get::<ProbeService>().unwrap();
    let aliased = world
        .locator
        .for_global()
        .get_trait::<dyn Reporter>()
        .unwrap();
    assert!(Arc::ptr_eq(&direct, &service));
    assert_eq!(aliased.tag(), "probe");
}

#[test]
fn self_alias_is_invalid() {
    let world = World::new();
    let probe = Arc::new(Probe::default());
    let err = world
        .locator
        .register_global_instance(ProbeService::new(probe))
        .unwrap()
        .as_trait::<ProbeService>(|arc| arc)
        .unwrap_err();
    assert!(matches!(err, LocatorError::InvalidAlias { .. }));
}

#[test]
fn duplicate_alias_is_rejected() {
    let world = World::new();
    let probe = Arc::new(Probe::default());
    let aliaser = world
        .locator
        .register_global_instance(ProbeService::new(probe))
        .unwrap();
    aliaser.as_trait::<dyn Reporter>(|arc| arc).unwrap();
    let err = aliaser.as_trait::<dyn Reporter>(|arc| arc).unwrap_err();
    assert!(matches!(err, LocatorError::Duplicate { .. }));
}

#[test]
fn scene_alias_lives_in_the_scene_store() {
    let world = World::new();
    let scene = world.load_scene(7);
    let other = world.load_scene(8);
    let probe = Arc::new(Probe::default());

    world
        .locator
        .register_scene_instance(scene, ProbeService::new(probe))
        .unwrap()
        .as_trait::<dyn Reporter>(|arc| arc)
        .unwrap();

    assert!(world
        .locator
        .for_scene(scene)
        .get_trait::<dyn Reporter>()
        .is_ok());
    // A sibling scene has no view of the alias.
    assert!(world
        .locator
        .for_scene(other)
        .try_get_trait::<dyn Reporter>()
        .is_none());
}

#[test]
fn registration_to_unloaded_scene_fails() {
    let world = World::new();
    let scene = world.load_scene(2);
    world.unload_scene(scene);

    let probe = Arc::new(Probe::default());
    let err = world
        .locator
        .register_scene_instance(scene, ProbeService::new(probe))
        .unwrap_err();
    assert_eq!(err, LocatorError::ExpiredScope("scene"));
}

#[test]
fn registration_to_dead_entity_fails() {
    let world = World::new();
    let entity = world.spawn(9, None);
    world.destroy_entity(entity);

    let probe = Arc::new(Probe::default());
    let err = world
        .locator
        .register_entity_instance(entity, ProbeService::new(probe))
        .unwrap_err();
    assert_eq!(err, LocatorError::ExpiredScope("entity"));
}

#[test]
fn entity_registration_starts_host_watch() {
    let world = World::new();
    let entity = world.spawn(11, None);
    assert!(!world.host.is_watching(entity));

    let probe = Arc::new(Probe::default());
    world
        .locator
        .register_entity_instance(entity, ProbeService::new(probe))
        .unwrap();
    assert!(world.host.is_watching(entity));
}

#[test]
fn concrete_get_on_trait_key_is_a_mismatch() {
    let world = World::new();
    let probe = Arc::new(Probe::default());
    world
        .locator
        .register_global_instance(ProbeService::new(probe))
        .unwrap()
        .as_trait::<dyn Reporter>(|arc| arc)
        .unwrap();

    // get_trait on a concrete key, and vice versa, both refuse.
    let err = world
        .locator
        .for_global()
        .get_trait::<ProbeService>()
        .unwrap_err();
    assert!(matches!(err, LocatorError::TypeMismatch(_)));
}

#[test]
fn snapshot_lists_every_table_without_materializing() {
    let world = World::new();
    let scene = world.load_scene(1);
    let entity = world.spawn(5, Some(scene));
    let probe = Arc::new(Probe::default());

    world
        .locator
        .register_global_instance(Arc::new(Settings { difficulty: 1 }))
        .unwrap();
    world
        .locator
        .register_scene_instance(scene, ProbeService::new(probe.clone()))
        .unwrap()
        .as_trait::<dyn Reporter>(|arc| arc)
        .unwrap();
    world
        .locator
        .register_entity_instance(entity, Arc::new(Settings { difficulty: 2 }))
        .unwrap();
    let made = Arc::new(AtomicUsize::new(0));
    let counter = made.clone();
    world
        .locator
        .register_lazy_provider(Scope::Scene, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ProbeService::new(probe.clone())
        })
        .unwrap();

    let snapshot = world.locator.snapshot();
    assert_eq!(snapshot.global.len(), 1);
    assert_eq!(snapshot.global[0].kind, ServiceKind::Instance);
    assert_eq!(snapshot.scenes.len(), 1);
    let (_, scene_entries) = &snapshot.scenes[0];
    assert_eq!(scene_entries.len(), 2);
    assert!(scene_entries.iter().any(|e| e.kind == ServiceKind::Alias));
    assert_eq!(snapshot.entities.len(), 1);
    assert_eq!(snapshot.providers.len(), 1);
    assert_eq!(snapshot.providers[0].scope, Scope::Scene);
    // Inspection never runs factories.
    assert_eq!(made.load(Ordering::SeqCst), 0);
}

#[test]
fn resolver_reports_scope_liveness() {
    let world = World::new();
    let scene = world.load_scene(3);
    let resolver = world.locator.for_scene(scene);
    assert!(resolver.is_in_scope());
    world.unload_scene(scene);
    assert!(!resolver.is_in_scope());
    assert_eq!(
        resolver.get::<Settings>().unwrap_err(),
        LocatorError::ExpiredScope("scene")
    );
}
