//! Read-only inspection of locator contents.
//!
//! Snapshots are for debug overlays and tests: they list what is registered
//! where without materializing any lazy provider or firing any hook.

use crate::descriptors::{Descriptor, Stored};
use crate::host::{EntityId, SceneId};
use crate::locator::ServiceLocator;
use crate::scope::Scope;

/// How a registration is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// A registered or materialized singleton.
    Instance,
    /// A factory invoked per resolve.
    Transient,
    /// A trait view of an instance registered under another key.
    Alias,
}

/// One registered key in one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Type name of the key.
    pub type_name: &'static str,
    /// Storage kind.
    pub kind: ServiceKind,
}

/// One lazy provider registration. Providers that have already
/// materialized also show up as an [`ServiceKind::Instance`] entry in the
/// owner's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Key the provider is registered under.
    pub registered_as: &'static str,
    /// Concrete type the factory produces.
    pub original: &'static str,
    /// Breadth the provider materializes at.
    pub scope: Scope,
}

/// Point-in-time listing of everything registered in a locator.
#[derive(Debug, Clone)]
pub struct LocatorSnapshot {
    /// Global instances, aliases, and transients.
    pub global: Vec<ServiceEntry>,
    /// Managed registrations.
    pub managed: Vec<ServiceEntry>,
    /// Per-scene stores.
    pub scenes: Vec<(SceneId, Vec<ServiceEntry>)>,
    /// Per-entity stores.
    pub entities: Vec<(EntityId, Vec<ServiceEntry>)>,
    /// Pending and materialized lazy providers, all breadths.
    pub providers: Vec<ProviderInfo>,
}

fn stored_entries(store: &std::collections::HashMap<crate::key::Key, Stored>) -> Vec<ServiceEntry> {
    let mut entries: Vec<ServiceEntry> = store
        .iter()
        .map(|(key, stored)| ServiceEntry {
            type_name: key.name(),
            kind: match stored {
                Stored::Instance(_) => ServiceKind::Instance,
                Stored::Alias(_) => ServiceKind::Alias,
            },
        })
        .collect();
    entries.sort_by_key(|e| e.type_name);
    entries
}

impl ServiceLocator {
    /// Captures the current contents of every table.
    ///
    /// Entries are sorted by type name so output is stable for display and
    /// assertions.
    pub fn snapshot(&self) -> LocatorSnapshot {
        let mut global: Vec<ServiceEntry> = self
            .inner
            .global
            .lock()
            .unwrap()
            .iter()
            .map(|(key, descriptor)| ServiceEntry {
                type_name: key.name(),
                kind: match descriptor {
                    Descriptor::Instance(_) => ServiceKind::Instance,
                    Descriptor::Alias(_) => ServiceKind::Alias,
                    Descriptor::Transient(_) => ServiceKind::Transient,
                },
            })
            .collect();
        global.sort_by_key(|e| e.type_name);

        let mut managed: Vec<ServiceEntry> = self
            .inner
            .managed
            .lock()
            .unwrap()
            .keys()
            .map(|key| ServiceEntry {
                type_name: key.name(),
                kind: ServiceKind::Instance,
            })
            .collect();
        managed.sort_by_key(|e| e.type_name);

        let mut scenes: Vec<(SceneId, Vec<ServiceEntry>)> = self
            .inner
            .scenes
            .lock()
            .unwrap()
            .iter()
            .map(|(scene, store)| (*scene, stored_entries(&store.lock().unwrap())))
            .collect();
        scenes.sort_by_key(|(scene, _)| *scene);

        let mut entities: Vec<(EntityId, Vec<ServiceEntry>)> = self
            .inner
            .entities
            .lock()
            .unwrap()
            .iter()
            .map(|(entity, store)| (*entity, stored_entries(&store.lock().unwrap())))
            .collect();
        entities.sort_by_key(|(entity, _)| *entity);

        let mut providers: Vec<ProviderInfo> = Vec::new();
        for scope in [Scope::Entity, Scope::Scene, Scope::Global] {
            let table = self.inner.providers[scope.index()].lock().unwrap();
            providers.extend(table.iter().map(|(key, entry)| ProviderInfo {
                registered_as: key.name(),
                original: entry.provider.original_key().name(),
                scope,
            }));
        }
        providers.sort_by_key(|p| (p.scope, p.registered_as));

        LocatorSnapshot {
            global,
            managed,
            scenes,
            entities,
            providers,
        }
    }
}
