//! Scope breadth for lazy provider registration.

use std::fmt;

/// Where a lazy provider materializes its instance.
///
/// Variants are declared narrowest first so the derived ordering reflects
/// breadth: `Entity < Scene < Global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Bound to a single entity; torn down when the entity is destroyed.
    Entity,
    /// Bound to a scene; torn down when the scene unloads.
    Scene,
    /// Application-wide; lives until reset.
    Global,
}

impl Scope {
    pub(crate) const COUNT: usize = 3;

    /// Stable table index for per-scope provider maps.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Scope::Entity => "entity",
            Scope::Scene => "scene",
            Scope::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
