use std::collections::HashMap;

use async_trait::async_trait;

use super::{CommandError, Session};

/// One invocation: a command name and its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Positional argument `index`, or a usage error when it is missing.
    pub fn arg(&self, index: usize, usage: &'static str) -> Result<&str, CommandError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or(CommandError::Usage(usage))
    }
}

/// A command that runs against the session as-is.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, session: &mut Session, command: &Command) -> Result<(), CommandError>;
}

/// Table of command names to handlers.
#[derive(Default)]
pub struct Commands {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `handler`. Registering a name again replaces the
    /// earlier handler.
    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            tracing::debug!("Replacing handler for command {}", name);
        }
        self.handlers.insert(name, Box::new(handler));
    }

    /// Run the handler bound to `command.name`, returning its result unchanged.
    pub async fn run(&self, session: &mut Session, command: &Command) -> Result<(), CommandError> {
        let handler = self
            .handlers
            .get(&command.name)
            .ok_or_else(|| CommandError::UnknownCommand(command.name.clone()))?;

        tracing::debug!("Running command {} with {} args", command.name, command.args.len());
        handler.execute(session, command).await
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
