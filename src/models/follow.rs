use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Records that a user follows a feed, independent of who owns the feed.
///
/// A user follows a given feed at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFollow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feed_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for following a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedFollowInput {
    pub user_id: Uuid,
    pub feed_id: Uuid,
}

/// A follow joined with the names of its feed and user, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFollowView {
    #[serde(flatten)]
    pub follow: FeedFollow,
    pub feed_name: String,
    pub user_name: String,
}
