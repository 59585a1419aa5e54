//! Command dispatch.
//!
//! Every command is a [`CommandHandler`] bound to a name in [`Commands`].
//! Commands that need a logged-in user implement [`AuthenticatedHandler`]
//! instead and are registered through [`authenticated`], which resolves the
//! current user once per invocation and hands the record down.

mod auth;
mod error;
mod feeds;
mod registry;
mod session;
#[cfg(test)]
mod test_support;
mod users;

pub use auth::{authenticated, AuthenticatedHandler, RequireUser};
pub use error::CommandError;
pub use feeds::{AddFeed, Aggregate, Follow, Following, ListFeeds, Unfollow, AGG_FEED_URL};
pub use registry::{Command, CommandHandler, Commands};
pub use session::{OutputBuffer, Session};
pub use users::{ListUsers, Login, Register, Reset};

use crate::db::MigrationSource;
use crate::feed::FeedFetcher;

/// Build the table of every command the CLI understands.
pub fn registry(fetcher: FeedFetcher, migrations: Box<dyn MigrationSource>) -> Commands {
    let mut commands = Commands::new();
    commands.register("login", Login);
    commands.register("register", Register);
    commands.register("reset", Reset::new(migrations));
    commands.register("users", ListUsers);
    commands.register("agg", Aggregate::new(fetcher));
    commands.register("addfeed", authenticated(AddFeed));
    commands.register("feeds", ListFeeds);
    commands.register("follow", authenticated(Follow));
    commands.register("following", authenticated(Following));
    commands.register("unfollow", authenticated(Unfollow));
    commands
}
