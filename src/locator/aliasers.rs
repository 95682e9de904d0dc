//! Alias builders returned from registration.
//!
//! Registration binds a service under its concrete type; the returned
//! aliaser exposes the same registration under trait-object keys as well.
//! The coercion is a plain `fn(Arc<T>) -> Arc<B>` so `T: B` is checked at
//! compile time; supply it as `|arc| arc` and let coercion do the work.

use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptors::{AnyArc, ServiceValue};
use crate::error::{LocatorError, LocatorResult};
use crate::host::{EntityId, SceneId};
use crate::key::key_of;
use crate::locator::ServiceLocator;
use crate::provider::{CastFn, LazyProvider};
use crate::traits::Lifecycle;

pub(crate) enum AliasScope {
    Global,
    Scene(SceneId),
    Entity(EntityId),
}

/// Adds trait-object keys to a registered instance.
///
/// Returned by the instance registration methods; calls chain.
///
/// # Examples
///
/// ```rust
/// use scoped_locator::{Lifecycle, Resolver, ServiceLocator};
/// use std::sync::Arc;
/// # use scoped_locator::{EntityId, Host, SceneId};
/// # struct StaticHost;
/// # impl Host for StaticHost {
/// #     fn scene_is_loaded(&self, _: SceneId) -> bool { true }
/// #     fn entity_is_alive(&self, _: EntityId) -> bool { true }
/// #     fn entity_parent(&self, _: EntityId) -> Option<EntityId> { None }
/// #     fn entity_scene(&self, _: EntityId) -> Option<SceneId> { None }
/// # }
///
/// trait Clock: Send + Sync {
///     fn now_ms(&self) -> u64;
/// }
///
/// struct SystemClock;
/// impl Lifecycle for SystemClock {}
/// impl Clock for SystemClock {
///     fn now_ms(&self) -> u64 { 0 }
/// }
///
/// let locator = ServiceLocator::new(Arc::new(StaticHost));
/// locator
///     .register_global_instance(Arc::new(SystemClock))?
///     .as_trait::<dyn Clock>(|arc| arc)?;
///
/// // Resolvable under both the concrete type and the trait.
/// let clock = locator.for_global().get_trait::<dyn Clock>()?;
/// assert_eq!(clock.now_ms(), 0);
/// # Ok::<(), scoped_locator::LocatorError>(())
/// ```
pub struct InstanceAliaser<T> {
    locator: ServiceLocator,
    instance: Arc<T>,
    scope: AliasScope,
}

impl<T: Lifecycle> InstanceAliaser<T> {
    pub(crate) fn new(locator: ServiceLocator, instance: Arc<T>, scope: AliasScope) -> Self {
        InstanceAliaser {
            locator,
            instance,
            scope,
        }
    }

    /// Also binds the instance under the trait-object key `B`, in the same
    /// scope as the original registration.
    ///
    /// Fails with `InvalidAlias` when `B` is the concrete type itself, or
    /// when `coerce` returns something other than a view of the registered
    /// instance. Fails with `ExpiredScope` when the owning scene or entity
    /// store is already gone.
    pub fn as_trait<B>(&self, coerce: fn(Arc<T>) -> Arc<B>) -> LocatorResult<&Self>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        if TypeId::of::<B>() == TypeId::of::<T>() {
            return Err(LocatorError::InvalidAlias {
                from: type_name::<T>(),
                to: type_name::<B>(),
            });
        }
        let coerced = coerce(self.instance.clone());
        // an alias is a view of the registered allocation, never a new one
        if Arc::as_ptr(&coerced) as *const () != Arc::as_ptr(&self.instance) as *const () {
            return Err(LocatorError::InvalidAlias {
                from: type_name::<T>(),
                to: type_name::<B>(),
            });
        }
        let sv = ServiceValue {
            any: Arc::new(coerced) as AnyArc,
            hooks: self.instance.clone(),
        };
        self.locator.register_alias(key_of::<B>(), sv, &self.scope)?;
        Ok(self)
    }
}

impl<T> fmt::Debug for InstanceAliaser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceAliaser")
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// Adds trait-object keys to a lazy provider.
///
/// The alias never caches anything of its own: resolution through an alias
/// key materializes (or finds) the instance under the provider's original
/// key and returns a coerced view of it.
pub struct ProviderAliaser<T> {
    locator: ServiceLocator,
    provider: Arc<LazyProvider>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Lifecycle> ProviderAliaser<T> {
    pub(crate) fn new(locator: ServiceLocator, provider: Arc<LazyProvider>) -> Self {
        ProviderAliaser {
            locator,
            provider,
            _marker: PhantomData,
        }
    }

    /// Also binds the provider under the trait-object key `B`, in the same
    /// provider table.
    pub fn as_trait<B>(&self, coerce: fn(Arc<T>) -> Arc<B>) -> LocatorResult<&Self>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        if TypeId::of::<B>() == TypeId::of::<T>() {
            return Err(LocatorError::InvalidAlias {
                from: type_name::<T>(),
                to: type_name::<B>(),
            });
        }
        let cast: CastFn = Arc::new(move |sv: &ServiceValue| {
            let concrete = sv.any.clone().downcast::<T>().ok()?;
            Some(ServiceValue {
                any: Arc::new(coerce(concrete)) as AnyArc,
                hooks: sv.hooks.clone(),
            })
        });
        self.locator
            .register_provider_alias(key_of::<B>(), self.provider.clone(), cast)?;
        Ok(self)
    }
}

impl<T> fmt::Debug for ProviderAliaser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderAliaser")
            .field("type", &type_name::<T>())
            .field("scope", &self.provider.scope())
            .finish()
    }
}
