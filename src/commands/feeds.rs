use std::io::Write;

use async_trait::async_trait;

use crate::db::StoreError;
use crate::feed::FeedFetcher;
use crate::models::{CreateFeedFollowInput, CreateFeedInput, Feed, User};

use super::auth::AuthenticatedHandler;
use super::{Command, CommandError, CommandHandler, Session};

/// Feed fetched by `agg`.
pub const AGG_FEED_URL: &str = "https://www.wagslane.dev/index.xml";

/// `agg`: fetch one feed and print the parsed document. Nothing is stored.
pub struct Aggregate {
    fetcher: FeedFetcher,
    url: String,
}

impl Aggregate {
    pub fn new(fetcher: FeedFetcher) -> Self {
        Self::with_url(fetcher, AGG_FEED_URL)
    }

    pub fn with_url(fetcher: FeedFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for Aggregate {
    async fn execute(&self, session: &mut Session, _: &Command) -> Result<(), CommandError> {
        let feed = self.fetcher.fetch(&self.url, std::future::pending()).await?;

        let out = session.output();
        writeln!(out, "{}", feed.channel.description)?;
        writeln!(out, "{feed:#?}")?;
        Ok(())
    }
}

/// `addfeed <name> <url>`: add a feed owned by the current user, who also
/// starts following it.
pub struct AddFeed;

#[async_trait]
impl AuthenticatedHandler for AddFeed {
    async fn execute(
        &self,
        session: &mut Session,
        command: &Command,
        user: User,
    ) -> Result<(), CommandError> {
        const USAGE: &str = "addfeed <name> <url>";
        let name = command.arg(0, USAGE)?;
        let url = command.arg(1, USAGE)?;

        let feed = session
            .store()
            .create_feed(CreateFeedInput {
                name: name.to_string(),
                url: url.to_string(),
                user_id: user.id,
            })
            .map_err(CommandError::store(format!("creating feed {name}")))?;
        tracing::info!("Created feed {} ({}) for {}", feed.name, feed.id, user.name);

        // Not atomic with the insert above: a failure here leaves an unfollowed feed.
        let follow = session
            .store()
            .create_feed_follow(CreateFeedFollowInput {
                user_id: user.id,
                feed_id: feed.id,
            })
            .map_err(CommandError::store(format!("following feed {name}")))?;

        let out = session.output();
        writeln!(out, "Feed created:")?;
        print_feed(out, &feed, &user)?;
        writeln!(out, "{} now follows {}", follow.user_name, follow.feed_name)?;
        Ok(())
    }
}

/// `feeds`: list every feed with the name of the user who added it.
pub struct ListFeeds;

#[async_trait]
impl CommandHandler for ListFeeds {
    async fn execute(&self, session: &mut Session, _: &Command) -> Result<(), CommandError> {
        let feeds = session
            .store()
            .get_feeds()
            .map_err(CommandError::store("fetching feeds"))?;

        for feed in feeds {
            let owner = session
                .store()
                .get_user(feed.user_id)
                .map_err(CommandError::store(format!("fetching user for feed {}", feed.name)))?
                .ok_or_else(|| CommandError::UserNotFound(feed.user_id.to_string()))?;

            writeln!(
                session.output(),
                "* Name: {}, URL: {}, User: {}",
                feed.name,
                feed.url,
                owner.name
            )?;
        }
        Ok(())
    }
}

/// `follow <url>`: follow an existing feed.
pub struct Follow;

#[async_trait]
impl AuthenticatedHandler for Follow {
    async fn execute(
        &self,
        session: &mut Session,
        command: &Command,
        user: User,
    ) -> Result<(), CommandError> {
        let url = command.arg(0, "follow <url>")?;
        let feed = find_feed(session, url)?;

        let follow = session
            .store()
            .create_feed_follow(CreateFeedFollowInput {
                user_id: user.id,
                feed_id: feed.id,
            })
            .map_err(|e| match e {
                StoreError::Conflict(_) => CommandError::AlreadyFollowing(url.to_string()),
                other => CommandError::store(format!("following feed {}", feed.name))(other),
            })?;

        writeln!(
            session.output(),
            "{} now follows {}",
            follow.user_name,
            follow.feed_name
        )?;
        Ok(())
    }
}

/// `following`: list the feeds the current user follows.
pub struct Following;

#[async_trait]
impl AuthenticatedHandler for Following {
    async fn execute(
        &self,
        session: &mut Session,
        _: &Command,
        user: User,
    ) -> Result<(), CommandError> {
        let follows = session
            .store()
            .get_feed_follows_for_user(user.id)
            .map_err(CommandError::store(format!("fetching follows for {}", user.name)))?;

        let out = session.output();
        for follow in follows {
            writeln!(out, "* {}", follow.feed_name)?;
        }
        Ok(())
    }
}

/// `unfollow <url>`: stop following a feed.
pub struct Unfollow;

#[async_trait]
impl AuthenticatedHandler for Unfollow {
    async fn execute(
        &self,
        session: &mut Session,
        command: &Command,
        user: User,
    ) -> Result<(), CommandError> {
        let url = command.arg(0, "unfollow <url>")?;
        let feed = find_feed(session, url)?;

        let deleted = session
            .store()
            .delete_feed_follow(user.id, feed.id)
            .map_err(CommandError::store(format!("unfollowing feed {}", feed.name)))?;
        if !deleted {
            return Err(CommandError::NotFollowing(url.to_string()));
        }

        writeln!(session.output(), "{} unfollowed {}", user.name, feed.name)?;
        Ok(())
    }
}

fn find_feed(session: &Session, url: &str) -> Result<Feed, CommandError> {
    session
        .store()
        .get_feed_by_url(url)
        .map_err(CommandError::store(format!("fetching feed {url}")))?
        .ok_or_else(|| CommandError::FeedNotFound(url.to_string()))
}

fn print_feed(out: &mut dyn Write, feed: &Feed, owner: &User) -> std::io::Result<()> {
    writeln!(out, "  ID:      {}", feed.id)?;
    writeln!(out, "  Name:    {}", feed.name)?;
    writeln!(out, "  URL:     {}", feed.url)?;
    writeln!(out, "  User:    {}", owner.name)?;
    writeln!(out, "  Created: {}", feed.created_at.to_rfc3339())
}
