//! Registration handles and tokens.
//!
//! A [`RegistrationHandle`] owns the teardown for one registration (or, via
//! [`RegistrationHandle::combine`], several). Disposal is idempotent and
//! runs exactly one teardown pass. A [`RegistrationToken`] is the consumer
//! side: code that borrowed a managed service subscribes to learn when the
//! backing registration goes away.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::internal::guarded;

type DisposeAction = Box<dyn FnOnce() + Send>;
type TokenCallback = Arc<dyn Fn() + Send + Sync>;

struct HandleState {
    disposed: bool,
    action: Option<DisposeAction>,
    listeners: Vec<DisposeAction>,
}

/// One-shot teardown owner for a registration.
///
/// Cloning shares the underlying handle; the first [`dispose`](Self::dispose)
/// wins and every later call is a no-op. Listeners registered after disposal
/// fire immediately, so late subscribers never wait on an event that already
/// happened.
#[derive(Clone)]
pub struct RegistrationHandle {
    state: Arc<Mutex<HandleState>>,
}

impl RegistrationHandle {
    pub(crate) fn new(action: DisposeAction) -> Self {
        RegistrationHandle {
            state: Arc::new(Mutex::new(HandleState {
                disposed: false,
                action: Some(action),
                listeners: Vec::new(),
            })),
        }
    }

    /// A handle over two others: disposing it disposes both, in order.
    ///
    /// If either input is already disposed the combined handle is disposed
    /// on the spot, taking the surviving input with it.
    pub fn combine(first: &RegistrationHandle, second: &RegistrationHandle) -> RegistrationHandle {
        let (a, b) = (first.clone(), second.clone());
        let combined = RegistrationHandle::new(Box::new(move || {
            a.dispose();
            b.dispose();
        }));
        if first.is_disposed() || second.is_disposed() {
            combined.dispose();
        }
        combined
    }

    /// Whether this handle has already been disposed.
    pub fn is_disposed(&self) -> bool {
        self.state.lock().unwrap().disposed
    }

    /// Runs the teardown action, then notifies listeners in registration
    /// order. Idempotent.
    ///
    /// All state is taken under the lock but invoked after it is released,
    /// so teardown and listeners may freely call back into the locator.
    /// Listener panics are logged and do not stop later listeners.
    pub fn dispose(&self) {
        let (action, listeners) = {
            let mut state = self.state.lock().unwrap();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (state.action.take(), std::mem::take(&mut state.listeners))
        };
        if let Some(action) = action {
            action();
        }
        for listener in listeners {
            guarded("registration handle listener", listener);
        }
    }

    /// Registers `listener` to run on disposal; if the handle is already
    /// disposed it runs immediately.
    pub(crate) fn on_disposed(&self, listener: DisposeAction) {
        {
            let mut state = self.state.lock().unwrap();
            if !state.disposed {
                state.listeners.push(listener);
                return;
            }
        }
        guarded("registration handle listener", listener);
    }

    /// Creates a consumer-side token observing this handle.
    pub fn token(&self) -> RegistrationToken {
        let inner = Arc::new(TokenInner {
            listeners: Mutex::new(HashMap::new()),
        });
        let notify = inner.clone();
        self.on_disposed(Box::new(move || notify.fire_all()));
        RegistrationToken {
            handle: self.clone(),
            inner,
        }
    }
}

impl fmt::Debug for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationHandle")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Identity is the shared allocation: clones compare equal, separately
/// created handles never do.
impl PartialEq for RegistrationHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for RegistrationHandle {}

struct ListenerEntry {
    callback: TokenCallback,
    count: usize,
}

struct TokenInner {
    listeners: Mutex<HashMap<usize, ListenerEntry>>,
}

impl TokenInner {
    fn fire_all(&self) {
        let entries: Vec<(TokenCallback, usize)> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .values()
                .map(|e| (e.callback.clone(), e.count))
                .collect()
        };
        for (callback, count) in entries {
            for _ in 0..count {
                guarded("registration token listener", || callback());
            }
        }
    }
}

/// Consumer-side subscription to a registration's disposal.
///
/// The same callback value may be subscribed multiple times; it then fires
/// once per outstanding subscription, and each
/// [`remove_listener`](Self::remove_listener) retires one subscription.
/// Callback identity is the `Arc` allocation, so hold on to the `Arc` you
/// subscribed with if you intend to unsubscribe.
#[derive(Clone)]
pub struct RegistrationToken {
    handle: RegistrationHandle,
    inner: Arc<TokenInner>,
}

impl fmt::Debug for RegistrationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationToken")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl RegistrationToken {
    /// Whether the observed registration has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    /// Subscribes `callback` to the disposal event. If the registration is
    /// already disposed the callback fires immediately, once.
    pub fn add_listener(&self, callback: TokenCallback) {
        if self.handle.is_disposed() {
            guarded("registration token listener", || callback());
            return;
        }
        let key = Arc::as_ptr(&callback) as *const () as usize;
        let mut listeners = self.inner.listeners.lock().unwrap();
        listeners
            .entry(key)
            .and_modify(|e| e.count += 1)
            .or_insert(ListenerEntry {
                callback,
                count: 1,
            });
    }

    /// Retires one subscription of `callback`. Unknown callbacks are
    /// ignored.
    pub fn remove_listener(&self, callback: &TokenCallback) {
        let key = Arc::as_ptr(callback) as *const () as usize;
        let mut listeners = self.inner.listeners.lock().unwrap();
        if let Some(entry) = listeners.get_mut(&key) {
            entry.count -= 1;
            if entry.count == 0 {
                listeners.remove(&key);
            }
        }
    }
}
