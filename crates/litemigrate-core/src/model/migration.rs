use std::collections::BTreeSet;

use super::step::{CodeStep, ExecutionHandle, QueryStep, Step};
use crate::errors::Result;

/// A named, dependency-aware unit of database change
///
/// `up` steps run in listed order when the migration is applied. `down`
/// steps are exposed for callers that orchestrate rollback; the engine never
/// runs them.
pub struct Migration<H: ?Sized> {
    name: String,
    up: Vec<Box<dyn Step<H>>>,
    down: Vec<Box<dyn Step<H>>>,
    depends_on: BTreeSet<String>,
}

impl<H: ?Sized> Migration<H> {
    /// Create a migration with no steps and no dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up: Vec::new(),
            down: Vec::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// Declare a prerequisite migration
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.insert(name.into());
        self
    }

    /// Append a forward step
    pub fn up(mut self, step: impl Step<H> + 'static) -> Self {
        self.up.push(Box::new(step));
        self
    }

    /// Append an inverse step
    pub fn down(mut self, step: impl Step<H> + 'static) -> Self {
        self.down.push(Box::new(step));
        self
    }

    /// Append a forward step backed by host code
    pub fn up_fn<F>(self, label: impl Into<String>, func: F) -> Self
    where
        H: 'static,
        F: Fn(&H) -> Result<()> + 'static,
    {
        self.up(CodeStep::new(label, func))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn up_steps(&self) -> &[Box<dyn Step<H>>] {
        &self.up
    }

    pub fn down_steps(&self) -> &[Box<dyn Step<H>>] {
        &self.down
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    /// A root migration declares no dependencies
    pub fn is_root(&self) -> bool {
        self.depends_on.is_empty()
    }
}

impl<H: ExecutionHandle + ?Sized> Migration<H> {
    /// Append a forward query step
    pub fn up_sql(self, sql: impl Into<String>) -> Self {
        self.up(QueryStep::new(sql))
    }

    /// Append an inverse query step
    pub fn down_sql(self, sql: impl Into<String>) -> Self {
        self.down(QueryStep::new(sql))
    }
}

impl<H: ?Sized> std::fmt::Debug for Migration<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .field("up", &self.up.iter().map(|s| s.describe()).collect::<Vec<_>>())
            .field(
                "down",
                &self.down.iter().map(|s| s.describe()).collect::<Vec<_>>(),
            )
            .field("depends_on", &self.depends_on)
            .finish()
    }
}
