#![allow(dead_code)]

use std::sync::Arc;

use gator::commands::{OutputBuffer, Session};
use gator::config::Config;
use gator::db::{Database, EmbeddedMigrations};
use tempfile::TempDir;

pub fn migrated_db() -> Database {
    let db = Database::open_memory().expect("Failed to create in-memory database");
    db.bootstrap(&EmbeddedMigrations)
        .expect("Failed to apply schema");
    db
}

pub struct TestSession {
    pub session: Session,
    pub db: Database,
    pub output: OutputBuffer,
    pub dir: TempDir,
}

impl TestSession {
    pub fn new() -> Self {
        let db = migrated_db();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config =
            Config::load(dir.path().join("gatorconfig.json")).expect("Failed to load config");
        let output = OutputBuffer::default();
        let session = Session::new(config, Arc::new(db.clone())).with_output(output.clone());
        Self {
            session,
            db,
            output,
            dir,
        }
    }

    pub fn output(&self) -> String {
        self.output.contents()
    }
}

pub fn cmd(name: &str, args: &[&str]) -> gator::commands::Command {
    gator::commands::Command::new(name, args.iter().map(|a| a.to_string()).collect())
}
