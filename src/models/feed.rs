use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A subscription source, owned by the user who added it.
///
/// URLs are unique: two feeds can share a name but never a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// The user who added the feed.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedInput {
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
}
