//! Managed registrations: explicit lifetime, observable teardown.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptors::ServiceValue;
use crate::error::{LocatorError, LocatorResult};
use crate::handle::{RegistrationHandle, RegistrationToken};
use crate::internal::guarded;
use crate::key::key_of;
use crate::locator::ServiceLocator;

pub(crate) struct ManagedEntry {
    pub(crate) value: ServiceValue,
    pub(crate) handle: RegistrationHandle,
}

/// Resolver for one managed registration.
///
/// Every successful [`get`](Self::get) pairs the service with a
/// [`RegistrationToken`], so the consumer can subscribe to the moment the
/// backing registration is disposed and drop its copy.
pub struct ManagedResolver<T> {
    locator: ServiceLocator,
    token: RegistrationToken,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ManagedResolver<T> {
    pub(crate) fn new(locator: ServiceLocator, token: RegistrationToken) -> Self {
        ManagedResolver {
            locator,
            token,
            _marker: PhantomData,
        }
    }

    /// Token observing the registration this resolver was built for.
    pub fn token(&self) -> RegistrationToken {
        self.token.clone()
    }

    /// Whether `T` is still registered as managed.
    pub fn is_in_scope(&self) -> bool {
        self.locator
            .inner
            .managed
            .lock()
            .unwrap()
            .contains_key(&key_of::<T>())
    }

    /// Resolves the managed instance together with its disposal token.
    ///
    /// Fails with `ExpiredScope` once the registration handle has been
    /// disposed and the entry removed.
    pub fn get(&self) -> LocatorResult<(Arc<T>, RegistrationToken)> {
        let sv = self
            .locator
            .inner
            .managed
            .lock()
            .unwrap()
            .get(&key_of::<T>())
            .map(|entry| entry.value.clone());
        let Some(sv) = sv else {
            return Err(LocatorError::ExpiredScope("managed"));
        };
        let instance = sv
            .any
            .clone()
            .downcast::<T>()
            .map_err(|_| LocatorError::TypeMismatch(type_name::<T>()))?;
        guarded("resolve callback", || sv.hooks.on_resolved());
        Ok((instance, self.token.clone()))
    }

    /// Like [`get`](Self::get) but maps every failure to `None`.
    pub fn try_get(&self) -> Option<(Arc<T>, RegistrationToken)> {
        self.get().ok()
    }
}

impl<T> fmt::Debug for ManagedResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedResolver")
            .field("type", &type_name::<T>())
            .field("disposed", &self.token.is_disposed())
            .finish()
    }
}
