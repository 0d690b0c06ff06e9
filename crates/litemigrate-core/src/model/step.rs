//! Step abstraction
//!
//! A step is one unit of work applied against a live execution handle. The
//! handle type is a parameter so the same model serves any SQL engine; the
//! store crate instantiates it with a SQLite connection.

use crate::errors::Result;

/// Capability to run raw SQL text against a database
pub trait ExecutionHandle {
    /// Execute one or more statements verbatim
    fn execute_batch(&self, sql: &str) -> Result<()>;
}

#[cfg(feature = "sqlite")]
impl ExecutionHandle for rusqlite::Connection {
    fn execute_batch(&self, sql: &str) -> Result<()> {
        rusqlite::Connection::execute_batch(self, sql)?;
        Ok(())
    }
}

/// A single executable action against an execution handle
pub trait Step<H: ?Sized> {
    /// Apply the step. Errors abort the enclosing migration.
    fn apply(&self, handle: &H) -> Result<()>;

    /// Short label used in logs and error context
    fn describe(&self) -> String;
}

/// Step that executes a literal query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStep {
    sql: String,
}

impl QueryStep {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl<H: ExecutionHandle + ?Sized> Step<H> for QueryStep {
    fn apply(&self, handle: &H) -> Result<()> {
        handle.execute_batch(&self.sql)
    }

    fn describe(&self) -> String {
        let first_line = self.sql.trim().lines().next().unwrap_or("");
        format!("query: {}", first_line)
    }
}

type StepFn<H> = dyn Fn(&H) -> Result<()>;

/// Step that invokes host code with the execution handle
///
/// The closure is responsible for running its own queries.
pub struct CodeStep<H: ?Sized> {
    label: String,
    func: Box<StepFn<H>>,
}

impl<H: ?Sized> CodeStep<H> {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&H) -> Result<()> + 'static,
    {
        Self {
            label: label.into(),
            func: Box::new(func),
        }
    }
}

impl<H: ?Sized> Step<H> for CodeStep<H> {
    fn apply(&self, handle: &H) -> Result<()> {
        (self.func)(handle)
    }

    fn describe(&self) -> String {
        format!("code: {}", self.label)
    }
}

impl<H: ?Sized> std::fmt::Debug for CodeStep<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStep")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
