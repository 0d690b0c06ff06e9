//! Migration manifest format v0
//!
//! One YAML file per migration; the file stem is the migration name.
//!
//! ```yaml
//! depends_on: [0001_initial]
//! up:
//!   - CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL)
//! down:
//!   - DROP TABLE users
//! ```

use serde::{Deserialize, Serialize};

/// Top-level manifest structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationFileV0 {
    /// Names of prerequisite migrations
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Forward SQL, executed in listed order
    pub up: Vec<String>,

    /// Inverse SQL, in rollback order
    #[serde(default)]
    pub down: Vec<String>,
}
