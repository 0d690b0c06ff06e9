//! Dependency graph construction and ordering
//!
//! [`DependencyGraph::build`] turns a migration set into an adjacency map
//! whose edges point from a dependency to its dependents.
//! [`topological_order`] walks that map depth-first to produce an execution
//! order, failing on cycles and on dependencies missing from the set.

pub mod builder;
pub mod order;

pub use builder::DependencyGraph;
pub use order::{order_migrations, topological_order};
