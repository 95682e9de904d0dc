//! Error types for the service locator.

use std::fmt;

/// Service locator errors.
///
/// Registration misuse (duplicates, invalid aliases) fails loudly and
/// synchronously, since it indicates a configuration bug. Resolution misses
/// cascade through the scope fallback chain and only surface as
/// [`NotRegistered`](LocatorError::NotRegistered) at the global root;
/// `try_get` callers receive `None` instead of an error.
///
/// # Examples
///
/// ```rust
/// use scoped_locator::LocatorError;
///
/// let err = LocatorError::NotRegistered("my_game::AudioService");
/// assert_eq!(err.to_string(), "service not registered: my_game::AudioService");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The type key is already bound in the target scope or table.
    Duplicate {
        /// Type name of the offending registration.
        type_name: &'static str,
        /// Scope or table the key is already bound in.
        scope: &'static str,
    },
    /// Alias target is the source type itself, or does not refer to the
    /// registered instance.
    InvalidAlias {
        /// Concrete registered type.
        from: &'static str,
        /// Requested alias type.
        to: &'static str,
    },
    /// No instance and no provider anywhere in the fallback chain.
    NotRegistered(&'static str),
    /// The resolver's scope has ended (scene unloaded, entity destroyed,
    /// managed entry removed).
    ExpiredScope(&'static str),
    /// The stored representation does not downcast to the requested view.
    TypeMismatch(&'static str),
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::Duplicate { type_name, scope } => {
                write!(f, "{} already registered in {} scope", type_name, scope)
            }
            LocatorError::InvalidAlias { from, to } => {
                write!(f, "cannot alias {} as {}", from, to)
            }
            LocatorError::NotRegistered(name) => {
                write!(f, "service not registered: {}", name)
            }
            LocatorError::ExpiredScope(scope) => write!(f, "{} scope has expired", scope),
            LocatorError::TypeMismatch(name) => write!(f, "type mismatch for: {}", name),
        }
    }
}

impl std::error::Error for LocatorError {}

/// Result type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;
