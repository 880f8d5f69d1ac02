//! Service container for dependency injection
//!
//! Holds the effective settings and the I/O boundary used by the built-in
//! commands.

use std::sync::Arc;

use tracing::instrument;

use crate::application::{ApplicationResult, CommandSet};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Set when `--file` named the commands file explicitly
    pub explicit_commands_file: bool,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            explicit_commands_file: false,
        }
    }

    /// Mark the commands file as explicitly requested; a missing file becomes an error.
    pub fn with_explicit_commands_file(mut self, explicit: bool) -> Self {
        self.explicit_commands_file = explicit;
        self
    }

    /// Load the user-defined commands from the configured file.
    #[instrument(level = "debug", skip(self))]
    pub fn commands(&self) -> ApplicationResult<CommandSet> {
        let path = &self.settings.commands_file;
        if self.explicit_commands_file {
            CommandSet::load(self.fs.as_ref(), path)
        } else {
            CommandSet::load_default(self.fs.as_ref(), path)
        }
    }
}
