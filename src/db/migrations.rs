//! Schema migrations in goose format.
//!
//! Each file carries a forward segment after `-- +goose Up` and an optional
//! backward segment after `-- +goose Down`. Only forward segments are ever
//! applied; files whose forward segment is missing or blank are skipped.

use std::path::PathBuf;

use rusqlite::Connection;

use super::{Result, StoreError};

const UP_MARKER: &str = "-- +goose Up";
const DOWN_MARKER: &str = "-- +goose Down";

/// Schema files shipped with the binary, in filename order.
const EMBEDDED: &[(&str, &str)] = &[
    ("001_users.sql", include_str!("migrations/001_users.sql")),
    ("002_feeds.sql", include_str!("migrations/002_feeds.sql")),
    (
        "003_feed_follows.sql",
        include_str!("migrations/003_feed_follows.sql"),
    ),
];

/// The forward half of one migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// File name, e.g. `001_users.sql`.
    pub id: String,
    pub forward: String,
}

/// An ordered sequence of forward migrations.
pub trait MigrationSource: Send + Sync {
    fn migrations(&self) -> Result<Vec<Migration>>;
}

/// Migrations compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedMigrations;

impl MigrationSource for EmbeddedMigrations {
    fn migrations(&self) -> Result<Vec<Migration>> {
        Ok(collect(
            EMBEDDED
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string())),
        ))
    }
}

/// Migrations read from `*.sql` files in a directory, applied in lexical order.
#[derive(Debug, Clone)]
pub struct DirMigrations {
    dir: PathBuf,
}

impl DirMigrations {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MigrationSource for DirMigrations {
    fn migrations(&self) -> Result<Vec<Migration>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".sql") {
                continue;
            }
            let text = std::fs::read_to_string(entry.path())?;
            files.push((name, text));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(collect(files))
    }
}

fn collect(files: impl IntoIterator<Item = (String, String)>) -> Vec<Migration> {
    files
        .into_iter()
        .filter_map(|(id, text)| {
            let forward = split_forward(&text);
            if forward.is_none() {
                tracing::debug!("Migration {} has no forward segment, skipping", id);
            }
            forward.map(|forward| Migration { id, forward })
        })
        .collect()
}

/// Extract the forward segment of a migration file.
///
/// Returns `None` when the up marker is absent or the segment is blank.
pub fn split_forward(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(UP_MARKER)?;
    let up = match rest.split_once(DOWN_MARKER) {
        Some((up, _)) => up,
        None => rest,
    };
    let up = up.trim();
    (!up.is_empty()).then(|| up.to_string())
}

pub(super) fn apply(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    for migration in migrations {
        tracing::info!("Applying migration {}", migration.id);
        conn.execute_batch(&migration.forward)
            .map_err(|source| StoreError::Migration {
                id: migration.id.clone(),
                source,
            })?;
    }
    Ok(())
}
