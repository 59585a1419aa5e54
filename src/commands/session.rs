use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::db::Store;

use super::CommandError;

/// State threaded through every command: who is logged in, where the data
/// lives and where output goes.
///
/// A session is anonymous while the current user name is empty. Only `login`
/// and `register` move it to authenticated; there is no way back.
pub struct Session {
    config: Config,
    store: Arc<dyn Store>,
    output: Box<dyn Write + Send>,
}

impl Session {
    /// Create a session that prints to stdout.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store,
            output: Box::new(std::io::stdout()),
        }
    }

    /// Redirect command output, e.g. into a buffer.
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn current_user_name(&self) -> &str {
        &self.config.current_user_name
    }

    pub fn is_authenticated(&self) -> bool {
        !self.config.current_user_name.is_empty()
    }

    /// Make `name` the current user and persist it to the config file.
    pub fn set_current_user(&mut self, name: &str) -> Result<(), CommandError> {
        self.config.set_user(name).map_err(CommandError::Config)?;
        tracing::debug!("Current user is now {}", name);
        Ok(())
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }
}

/// Output sink that keeps everything written to it, for reading back after
/// commands ran. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("output buffer lock poisoned")).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("output buffer lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
