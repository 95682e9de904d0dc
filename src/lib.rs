//! Hierarchical service locator with scene and entity scopes.
//!
//! `scoped-locator` binds services by type into one of four scopes and
//! resolves them through fallback chains that mirror a game engine's
//! ownership hierarchy:
//!
//! - **Global**: application-wide singletons and transients.
//! - **Scene**: owned by a scene, torn down when it unloads.
//! - **Entity**: owned by a single entity, torn down when it is destroyed,
//!   with optional lookup through hierarchy ancestors.
//! - **Managed**: explicit lifetime via a [`RegistrationHandle`], with
//!   [`RegistrationToken`] subscriptions for consumers that need to know
//!   when the service goes away.
//!
//! Resolution falls back outward: an entity resolver checks the entity's
//! own store, optionally its ancestors' existing stores, its scope's lazy
//! providers, then the scene, then the global root. Only the global root
//! reports [`LocatorError::NotRegistered`].
//!
//! # Quick start
//!
//! ```rust
//! use scoped_locator::{
//!     EntityId, Host, Lifecycle, Resolver, SceneId, ServiceLocator,
//! };
//! use std::sync::Arc;
//!
//! // The embedding engine answers liveness and hierarchy queries.
//! struct StaticHost;
//! impl Host for StaticHost {
//!     fn scene_is_loaded(&self, _: SceneId) -> bool { true }
//!     fn entity_is_alive(&self, _: EntityId) -> bool { true }
//!     fn entity_parent(&self, _: EntityId) -> Option<EntityId> { None }
//!     fn entity_scene(&self, _: EntityId) -> Option<SceneId> { Some(SceneId(1)) }
//! }
//!
//! struct Audio { volume: f32 }
//! impl Lifecycle for Audio {}
//!
//! struct Spawner { scene: SceneId }
//! impl Lifecycle for Spawner {}
//!
//! let locator = ServiceLocator::new(Arc::new(StaticHost));
//! locator.register_global_instance(Arc::new(Audio { volume: 0.8 }))?;
//! locator.register_scene_instance(SceneId(1), Arc::new(Spawner { scene: SceneId(1) }))?;
//!
//! // An entity resolver reaches its scene's services and the globals.
//! let entity = locator.for_entity(EntityId(42), false);
//! assert_eq!(entity.get::<Spawner>()?.scene, SceneId(1));
//! assert_eq!(entity.get::<Audio>()?.volume, 0.8);
//! # Ok::<(), scoped_locator::LocatorError>(())
//! ```
//!
//! # Lazy providers
//!
//! [`ServiceLocator::register_lazy_provider`] defers construction until the
//! first resolve that reaches the provider. The instance is cached in the
//! resolving owner's store under the factory's concrete type, so a scene
//! provider yields one instance per scene and an entity provider one per
//! entity. Factories run with no locator locks held and may themselves
//! resolve or register services.
//!
//! # Lifecycle and teardown
//!
//! Services implement [`Lifecycle`]; all hooks default to no-ops. When the
//! host reports a scene unload or entity destroy to the
//! [`SceneDisposer`]/[`EntityDisposer`], every instance in that owner's
//! store gets `on_scope_ended` followed by `dispose`. Hooks are
//! panic-isolated and logged through the [`log`] facade.
//!
//! # Thread safety
//!
//! Everything is `Send + Sync`. Internal locks are never held across user
//! code (factories, hooks, listeners), so re-entrant use is fine; when two
//! threads race to materialize the same provider the first instance stored
//! wins and the loser is dropped.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod descriptors;
mod disposers;
mod error;
mod handle;
mod host;
mod internal;
mod key;
mod locator;
mod provider;
mod scope;
mod services;
mod snapshot;
mod traits;

pub use descriptors::AnyArc;
pub use disposers::{EntityDisposer, SceneDisposer};
pub use error::{LocatorError, LocatorResult};
pub use handle::{RegistrationHandle, RegistrationToken};
pub use host::{EntityId, Host, SceneId};
pub use key::{key_of, Key};
pub use locator::{
    EntityResolver, GlobalResolver, InstanceAliaser, ManagedResolver, ProviderAliaser,
    SceneResolver, ServiceLocator,
};
pub use provider::LazyProvider;
pub use scope::Scope;
pub use services::Services;
pub use snapshot::{LocatorSnapshot, ProviderInfo, ServiceEntry, ServiceKind};
pub use traits::{Lifecycle, Resolver, ResolverCore};
