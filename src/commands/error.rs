use thiserror::Error;

use crate::db::StoreError;
use crate::feed::FetchError;

/// Failure of a single command invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument, usage: {0}")]
    Usage(&'static str),

    #[error("not logged in: run `register <name>` or `login <name>` first")]
    NotLoggedIn,

    #[error("cannot resolve current user: {0}")]
    CurrentUser(#[source] Box<CommandError>),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    #[error("no feed with URL {0}")]
    FeedNotFound(String),

    #[error("already following {0}")]
    AlreadyFollowing(String),

    #[error("not following {0}")]
    NotFollowing(String),

    #[error("error fetching feed: {0}")]
    Fetch(#[from] FetchError),

    #[error("error {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("error updating config: {0:#}")]
    Config(anyhow::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    /// Wrap a store failure with what the command was doing, for use with
    /// `map_err`.
    pub fn store(context: impl Into<String>) -> impl FnOnce(StoreError) -> Self {
        let context = context.into();
        move |source| Self::Store { context, source }
    }
}
