//! fm-registry
//!
//! Entity registry and resolver.
//!
//! [`EntityRegistry`] is an explicit, shareable catalogue of known entities
//! (ticker → jurisdiction + identifiers). It is built once at process start
//! and passed to the [`EntityResolver`]; there is no process-global registry.
//!
//! [`EntityResolver::resolve`] combines the registry with caller-supplied
//! identifier overrides and is side-effect free.

mod registry;
mod resolver;

pub use registry::{EntityRegistry, RegisteredEntity, RegistryError};
pub use resolver::{EntityResolver, Overrides, ResolveError, ResolvedEntity};
