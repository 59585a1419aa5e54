//! Shared fixtures for command unit tests.

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Config;
use crate::db::{Database, EmbeddedMigrations, Store};
use crate::models::{CreateUserInput, User};

use super::{OutputBuffer, Session};

/// A session over a migrated in-memory database and a throwaway config file.
pub(crate) struct Harness {
    pub(crate) session: Session,
    pub(crate) db: Database,
    output: OutputBuffer,
    _dir: TempDir,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let db = Database::open_memory().unwrap();
        db.bootstrap(&EmbeddedMigrations).unwrap();
        Self::with_store(db.clone(), Arc::new(db))
    }

    /// Build a harness whose session talks to `store`; `db` is the database
    /// underneath it, kept for assertions.
    pub(crate) fn with_store(db: Database, store: Arc<dyn Store>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("config.json")).unwrap();
        let output = OutputBuffer::default();
        let session = Session::new(config, store).with_output(output.clone());
        Self {
            session,
            db,
            output,
            _dir: dir,
        }
    }

    /// Register `name` and make it the current user.
    pub(crate) fn login_as(&mut self, name: &str) -> User {
        let user = self
            .db
            .create_user(CreateUserInput {
                name: name.to_string(),
            })
            .unwrap();
        self.session.set_current_user(name).unwrap();
        user
    }

    pub(crate) fn output(&self) -> String {
        self.output.contents()
    }
}
