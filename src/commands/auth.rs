use async_trait::async_trait;

use crate::db::Store;
use crate::models::User;

use super::{Command, CommandError, CommandHandler, Session};

/// A command that needs the logged-in user's record.
#[async_trait]
pub trait AuthenticatedHandler: Send + Sync {
    async fn execute(
        &self,
        session: &mut Session,
        command: &Command,
        user: User,
    ) -> Result<(), CommandError>;
}

/// Plain handler that resolves the current user before delegating.
///
/// Built once at registration by [`authenticated`].
pub struct RequireUser<H> {
    inner: H,
}

/// Adapt a handler that needs a user into one the registry can run.
pub fn authenticated<H: AuthenticatedHandler>(inner: H) -> RequireUser<H> {
    RequireUser { inner }
}

#[async_trait]
impl<H: AuthenticatedHandler> CommandHandler for RequireUser<H> {
    async fn execute(&self, session: &mut Session, command: &Command) -> Result<(), CommandError> {
        if !session.is_authenticated() {
            return Err(CommandError::NotLoggedIn);
        }

        let name = session.current_user_name().to_string();
        let user = find_user(session.store(), &name)
            .map_err(|e| CommandError::CurrentUser(Box::new(e)))?;

        self.inner.execute(session, command, user).await
    }
}

/// Look up a user by name, turning a missing row into
/// [`CommandError::UserNotFound`].
pub(super) fn find_user(store: &dyn Store, name: &str) -> Result<User, CommandError> {
    store
        .get_user_by_name(name)
        .map_err(CommandError::store(format!("fetching user {name}")))?
        .ok_or_else(|| CommandError::UserNotFound(name.to_string()))
}
