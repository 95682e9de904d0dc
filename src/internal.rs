//! Crate-internal helpers.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs `f`, catching any panic so one misbehaving callback cannot take down
/// teardown or resolution for everyone else. The panic payload is logged.
pub(crate) fn guarded(what: &str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        let msg = payload
            .downcast_ref::<&str>()
            .copied()
            .map(String::from)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        log::error!("{} panicked: {}", what, msg);
    }
}
