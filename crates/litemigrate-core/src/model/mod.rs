//! Migration domain model
//!
//! - [`Step`]: unit of work applied against an execution handle
//! - [`Migration`]: named up/down step lists plus dependencies
//! - [`MigrationSet`]: the validated set of migrations for one run

pub mod migration;
pub mod set;
pub mod step;

pub use migration::Migration;
pub use set::MigrationSet;
pub use step::{CodeStep, ExecutionHandle, QueryStep, Step};
