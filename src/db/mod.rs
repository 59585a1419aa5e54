mod error;
mod migrations;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

pub use error::StoreError;
pub use migrations::{split_forward, DirMigrations, EmbeddedMigrations, Migration, MigrationSource};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Tables in drop order: dependents before the tables they reference.
const TABLES: &[&str] = &["feed_follows", "feeds", "users"];

/// User, feed and follow persistence.
///
/// Lookups that find nothing return `Ok(None)`; writes that break a
/// uniqueness rule return [`StoreError::Conflict`].
pub trait Store: Send + Sync {
    fn create_user(&self, input: CreateUserInput) -> Result<User>;
    fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    /// All users, ordered by name.
    fn get_users(&self) -> Result<Vec<User>>;
    /// Delete every user; feeds and follows go with them. Returns the count.
    fn delete_users(&self) -> Result<usize>;

    fn create_feed(&self, input: CreateFeedInput) -> Result<Feed>;
    /// All feeds, ordered by creation time.
    fn get_feeds(&self) -> Result<Vec<Feed>>;
    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>>;

    fn create_feed_follow(&self, input: CreateFeedFollowInput) -> Result<FeedFollowView>;
    fn get_feed_follows_for_user(&self, user_id: Uuid) -> Result<Vec<FeedFollowView>>;
    /// Returns `false` when the user did not follow the feed.
    fn delete_feed_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool>;

    /// Drop every table and replay the forward migrations.
    fn reset(&self, source: &dyn MigrationSource) -> Result<()>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database named by a config connection string.
    ///
    /// Accepts a plain path, a `sqlite://` URL or `:memory:`. Any other
    /// `scheme://` is rejected rather than opened as a file.
    pub fn open(url: &str) -> Result<Self> {
        let path = match url.strip_prefix("sqlite://") {
            Some(path) => path,
            None if url.contains("://") => {
                return Err(StoreError::UnsupportedUrl(url.to_string()));
            }
            None => url,
        };
        if path == ":memory:" {
            return Self::open_memory();
        }
        Self::open_path(PathBuf::from(path))
    }

    pub fn open_path(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "gator").ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine data directory",
            )
        })?;
        Self::open_path(dirs.data_dir().join("gator.db"))
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    /// Apply the schema to a database that has never seen it.
    ///
    /// A database that already has a `users` table is left untouched.
    pub fn bootstrap(&self, source: &dyn MigrationSource) -> Result<()> {
        let conn = self.conn();
        let existing: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='users'",
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(());
        }

        tracing::info!("Empty database, applying schema");
        migrations::apply(&conn, &source.migrations()?)
    }
}

impl Store for Database {
    // ============================================================
    // User operations
    // ============================================================

    fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, created_at, updated_at, name) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
                &input.name,
            ),
        )
        .map_err(|e| StoreError::unique(e, || format!("user {}", input.name)))?;

        Ok(User {
            id,
            name: input.name,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE id = ?",
                [id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
                [name],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;

        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn delete_users(&self) -> Result<usize> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM users", [])?;
        Ok(rows)
    }

    // ============================================================
    // Feed operations
    // ============================================================

    fn create_feed(&self, input: CreateFeedInput) -> Result<Feed> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
                &input.name,
                &input.url,
                input.user_id.to_string(),
            ),
        )
        .map_err(|e| StoreError::unique(e, || format!("feed with URL {}", input.url)))?;

        Ok(Feed {
            id,
            name: input.name,
            url: input.url,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_feeds(&self) -> Result<Vec<Feed>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, url, user_id, created_at, updated_at
             FROM feeds ORDER BY created_at, name",
        )?;

        let feeds = stmt
            .query_map([], feed_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.conn();
        let feed = conn
            .query_row(
                "SELECT id, name, url, user_id, created_at, updated_at FROM feeds WHERE url = ?",
                [url],
                feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    // ============================================================
    // Feed follow operations
    // ============================================================

    fn create_feed_follow(&self, input: CreateFeedFollowInput) -> Result<FeedFollowView> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
                input.user_id.to_string(),
                input.feed_id.to_string(),
            ),
        )
        .map_err(|e| StoreError::unique(e, || "feed follow".to_string()))?;

        let view = conn.query_row(
            "SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at, f.name, u.name
             FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             JOIN users u ON u.id = ff.user_id
             WHERE ff.id = ?",
            [id.to_string()],
            follow_view_from_row,
        )?;

        Ok(view)
    }

    fn get_feed_follows_for_user(&self, user_id: Uuid) -> Result<Vec<FeedFollowView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at, f.name, u.name
             FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             JOIN users u ON u.id = ff.user_id
             WHERE ff.user_id = ?
             ORDER BY f.name",
        )?;

        let follows = stmt
            .query_map([user_id.to_string()], follow_view_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(follows)
    }

    fn delete_feed_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?",
            (user_id.to_string(), feed_id.to_string()),
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // Maintenance
    // ============================================================

    fn reset(&self, source: &dyn MigrationSource) -> Result<()> {
        // Read migrations before dropping anything so a bad source leaves data intact.
        let migrations = source.migrations()?;

        let conn = self.conn();
        for table in TABLES {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))?;
            tracing::debug!("Dropped table {}", table);
        }
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::apply(&conn, &migrations)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        created_at: parse_datetime(row.get::<_, String>(2)?),
        updated_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        url: row.get(2)?,
        user_id: parse_uuid(row.get::<_, String>(3)?),
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn follow_view_from_row(row: &Row<'_>) -> rusqlite::Result<FeedFollowView> {
    Ok(FeedFollowView {
        follow: FeedFollow {
            id: parse_uuid(row.get::<_, String>(0)?),
            user_id: parse_uuid(row.get::<_, String>(1)?),
            feed_id: parse_uuid(row.get::<_, String>(2)?),
            created_at: parse_datetime(row.get::<_, String>(3)?),
            updated_at: parse_datetime(row.get::<_, String>(4)?),
        },
        feed_name: row.get(5)?,
        user_name: row.get(6)?,
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
