use std::io::Write;

use async_trait::async_trait;

use crate::db::{MigrationSource, StoreError};
use crate::models::CreateUserInput;

use super::auth::find_user;
use super::{Command, CommandError, CommandHandler, Session};

/// `login <name>`: switch the current user to an existing user.
pub struct Login;

#[async_trait]
impl CommandHandler for Login {
    async fn execute(&self, session: &mut Session, command: &Command) -> Result<(), CommandError> {
        let name = command.arg(0, "login <name>")?;
        find_user(session.store(), name)?;

        session.set_current_user(name)?;
        writeln!(session.output(), "Logged in as user: {name}")?;
        Ok(())
    }
}

/// `register <name>`: create a user and log in as them.
pub struct Register;

#[async_trait]
impl CommandHandler for Register {
    async fn execute(&self, session: &mut Session, command: &Command) -> Result<(), CommandError> {
        let name = command.arg(0, "register <name>")?;

        let user = session
            .store()
            .create_user(CreateUserInput {
                name: name.to_string(),
            })
            .map_err(|e| match e {
                StoreError::Conflict(_) => CommandError::UserAlreadyExists(name.to_string()),
                other => CommandError::store(format!("creating user {name}"))(other),
            })?;
        tracing::info!("Registered user {} ({})", user.name, user.id);

        session.set_current_user(name)?;
        writeln!(session.output(), "Registered and logged in as user: {name}")?;
        Ok(())
    }
}

/// `reset`: drop all data and rebuild the schema from migrations.
pub struct Reset {
    migrations: Box<dyn MigrationSource>,
}

impl Reset {
    pub fn new(migrations: Box<dyn MigrationSource>) -> Self {
        Self { migrations }
    }
}

#[async_trait]
impl CommandHandler for Reset {
    async fn execute(&self, session: &mut Session, _: &Command) -> Result<(), CommandError> {
        let deleted = session
            .store()
            .delete_users()
            .map_err(CommandError::store("deleting users"))?;
        tracing::info!("Deleted {} users", deleted);

        session
            .store()
            .reset(self.migrations.as_ref())
            .map_err(CommandError::store("resetting database"))?;

        writeln!(session.output(), "Database reset, all users deleted")?;
        Ok(())
    }
}

/// `users`: list every user, marking the current one.
pub struct ListUsers;

#[async_trait]
impl CommandHandler for ListUsers {
    async fn execute(&self, session: &mut Session, _: &Command) -> Result<(), CommandError> {
        let users = session
            .store()
            .get_users()
            .map_err(CommandError::store("fetching users"))?;

        let current = session.current_user_name().to_string();
        let out = session.output();
        for user in users {
            if user.name == current {
                writeln!(out, "* {} (current)", user.name)?;
            } else {
                writeln!(out, "* {}", user.name)?;
            }
        }
        Ok(())
    }
}
