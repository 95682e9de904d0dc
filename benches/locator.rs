use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scoped_locator::{
    EntityId, Host, Lifecycle, Resolver, SceneId, Scope, ServiceLocator,
};

struct BenchHost;

impl Host for BenchHost {
    fn scene_is_loaded(&self, _: SceneId) -> bool {
        true
    }
    fn entity_is_alive(&self, _: EntityId) -> bool {
        true
    }
    fn entity_parent(&self, entity: EntityId) -> Option<EntityId> {
        // a short chain so hierarchy search has something to walk
        (entity.0 > 0).then(|| EntityId(entity.0 - 1))
    }
    fn entity_scene(&self, _: EntityId) -> Option<SceneId> {
        Some(SceneId(1))
    }
}

#[derive(Debug)]
struct Config {
    value: u64,
}
impl Lifecycle for Config {}

#[derive(Debug)]
struct SceneState {
    value: u64,
}
impl Lifecycle for SceneState {}

fn bench_resolution(c: &mut Criterion) {
    let locator = ServiceLocator::new(Arc::new(BenchHost));
    locator
        .register_global_instance(Arc::new(Config { value: 1 }))
        .unwrap();
    locator
        .register_scene_instance(SceneId(1), Arc::new(SceneState { value: 2 }))
        .unwrap();
    locator
        .register_lazy_provider(Scope::Entity, || Arc::new(Config { value: 3 }))
        .unwrap();
    // materialize once so the bench measures the cached path
    locator
        .for_entity(EntityId(0), false)
        .get::<Config>()
        .unwrap();

    c.bench_function("global_hit", |b| {
        let resolver = locator.for_global();
        b.iter(|| black_box(resolver.get::<Config>().unwrap()))
    });

    c.bench_function("scene_store_hit", |b| {
        let resolver = locator.for_scene(SceneId(1));
        b.iter(|| black_box(resolver.get::<SceneState>().unwrap()))
    });

    c.bench_function("scene_fallback_to_global", |b| {
        let resolver = locator.for_scene(SceneId(1));
        b.iter(|| black_box(resolver.get::<Config>().unwrap()))
    });

    c.bench_function("entity_provider_cached", |b| {
        let resolver = locator.for_entity(EntityId(0), false);
        b.iter(|| black_box(resolver.get::<Config>().unwrap()))
    });

    c.bench_function("entity_chain_to_scene", |b| {
        let resolver = locator.for_entity(EntityId(4), true);
        b.iter(|| black_box(resolver.get::<SceneState>().unwrap()))
    });
}

fn bench_registration(c: &mut Criterion) {
    c.bench_function("register_and_resolve_scene", |b| {
        b.iter(|| {
            let locator = ServiceLocator::new(Arc::new(BenchHost));
            locator
                .register_scene_instance(SceneId(1), Arc::new(SceneState { value: 1 }))
                .unwrap();
            black_box(
                locator
                    .for_scene(SceneId(1))
                    .get::<SceneState>()
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_resolution, bench_registration);
criterion_main!(benches);
