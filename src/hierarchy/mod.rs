//! Containment-hierarchy resolution: levels, the remote-fetch capability,
//! and the bounded-retry chain resolver.

mod client;
mod level;
mod resolver;

pub use client::{Container, ContainerClient};
pub use level::HierarchyLevel;
pub use resolver::{HierarchyChain, HierarchyResolver, RetryPolicy};
