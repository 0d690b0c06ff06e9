use litemigrate_core_types::RunId;
use thiserror::Error;

/// Result type alias using MigrateError
pub type Result<T> = std::result::Result<T, MigrateError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised while loading, ordering and applying migrations. Each kind maps to
/// a stable error code that can be used for programmatic error handling,
/// testing, and process exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Load/Validation
    InvalidInput,
    ForbiddenName,
    AlreadyExists,
    InvalidDefinition,

    // Graph
    CycleDetected,
    UnresolvedDependency,
    NotFound,

    // Execution
    StepFailed,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ForbiddenName => "ERR_FORBIDDEN_NAME",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidDefinition => "ERR_INVALID_DEFINITION",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::UnresolvedDependency => "ERR_UNRESOLVED_DEPENDENCY",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::StepFailed => "ERR_STEP_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus the migration/step context needed to
/// point an operator at the failing definition.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    migration: Option<String>,
    step: Option<usize>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
    path: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            migration: None,
            step: None,
            run_id: None,
            message: String::new(),
            source: None,
            path: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add migration name context
    pub fn with_migration(mut self, name: impl Into<String>) -> Self {
        self.migration = Some(name.into());
        self
    }

    /// Add step index context
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add a dependency path (used for CycleDetected to carry the cycle trace)
    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = Some(path);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the migration name context, if any
    pub fn migration(&self) -> Option<&str> {
        self.migration.as_deref()
    }

    /// Get the step index context, if any
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Get the dependency path, if any (populated on CycleDetected)
    pub fn path(&self) -> Option<&[String]> {
        self.path.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(migration) = &self.migration {
            write!(f, " (migration: {})", migration)?;
        }
        if let Some(step) = self.step {
            write!(f, " (step: {})", step)?;
        }
        if let Some(run_id) = &self.run_id {
            write!(f, " (run_id: {})", run_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for migration loading, ordering and execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrateError {
    // ===== Load Errors =====
    /// A migration uses the reserved target alias as its name
    #[error("Forbidden migration name: '{name}' is reserved")]
    ForbiddenMigrationName { name: String },

    /// A migration name that cannot identify a migration
    #[error("Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// Two definitions share one name
    #[error("Duplicate migration: {name}")]
    DuplicateMigration { name: String },

    /// A migration definition could not be parsed
    #[error("Invalid migration definition at {path}: {reason}")]
    InvalidDefinition { path: String, reason: String },

    // ===== Graph Errors =====
    /// The dependency graph is not acyclic
    #[error("Dependency cycle detected at migration {migration}: {}", .path.join(" -> "))]
    DependencyCycle {
        migration: String,
        path: Vec<String>,
    },

    /// A depends_on entry names a migration absent from the loaded set
    #[error("Migration {migration} depends on unknown migration {dependency}")]
    UnresolvedDependency {
        migration: String,
        dependency: String,
    },

    /// A requested target migration does not exist
    #[error("Migration not found: {name}")]
    MigrationNotFound { name: String },

    // ===== Execution Errors =====
    /// A statement failed inside a step
    #[error("SQL error: {message}")]
    Sql { message: String },

    /// A step's apply failed; the run is aborted
    #[error("Migration {migration} failed at step {step}: {message}")]
    StepFailed {
        migration: String,
        step: usize,
        message: String,
    },
}

/// Conversion from MigrateError to ExError
///
/// Classifies each domain error into its canonical kind and moves the
/// migration/step context into the structured fields.
impl From<MigrateError> for ExError {
    fn from(err: MigrateError) -> Self {
        let message = err.to_string();
        match err {
            MigrateError::ForbiddenMigrationName { name } => {
                ExError::new(ExErrorKind::ForbiddenName)
                    .with_op("load_migration")
                    .with_migration(name)
                    .with_message(message)
            }

            MigrateError::InvalidMigrationName { name, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("load_migration")
                    .with_migration(name)
                    .with_message(message)
            }

            MigrateError::DuplicateMigration { name } => ExError::new(ExErrorKind::AlreadyExists)
                .with_op("load_migration")
                .with_migration(name)
                .with_message(message),

            MigrateError::InvalidDefinition { .. } => {
                ExError::new(ExErrorKind::InvalidDefinition)
                    .with_op("load_migration")
                    .with_message(message)
            }

            MigrateError::DependencyCycle { migration, path } => {
                ExError::new(ExErrorKind::CycleDetected)
                    .with_op("order_migrations")
                    .with_migration(migration)
                    .with_path(path)
                    .with_message(message)
            }

            MigrateError::UnresolvedDependency { migration, .. } => {
                ExError::new(ExErrorKind::UnresolvedDependency)
                    .with_op("order_migrations")
                    .with_migration(migration)
                    .with_message(message)
            }

            MigrateError::MigrationNotFound { name } => ExError::new(ExErrorKind::NotFound)
                .with_op("plan_run")
                .with_migration(name)
                .with_message(message),

            MigrateError::Sql { .. } => ExError::new(ExErrorKind::Persistence)
                .with_op("sqlite")
                .with_message(message),

            MigrateError::StepFailed {
                migration, step, ..
            } => ExError::new(ExErrorKind::StepFailed)
                .with_op("apply_step")
                .with_migration(migration)
                .with_step(step)
                .with_message(message),
        }
    }
}

/// Lets code steps use `?` on SQLite calls
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MigrateError {
    fn from(err: rusqlite::Error) -> Self {
        MigrateError::Sql {
            message: err.to_string(),
        }
    }
}
