//! lite-migrate Core - dependency resolution for database migrations
//!
//! This crate provides the engine-independent half of lite-migrate:
//! - Step and Migration models, generic over the execution handle
//! - Migration name validation (the `latest` alias is reserved)
//! - Dependency graph construction and cycle-checked topological ordering
//! - Run planning against a target and the set of applied migrations
//! - The error facility and structured logging facility shared by all crates

pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod plan;
pub mod rules;

pub use litemigrate_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, MigrateError, Result};
pub use graph::{order_migrations, topological_order, DependencyGraph};
pub use model::{CodeStep, ExecutionHandle, Migration, MigrationSet, QueryStep, Step};
pub use plan::{plan_run, RunPlan, Target};
pub use rules::validation::LATEST_ALIAS;
