//! Public traits: service lifecycle hooks and the resolver surface.

mod lifecycle;
mod resolver;

pub use lifecycle::Lifecycle;
pub use resolver::{Resolver, ResolverCore};
