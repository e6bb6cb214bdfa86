//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use showcase_core::ShowcaseConfig;
use showcase_data::{FixtureTransport, HttpTransport, Transport};

use crate::config;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: ShowcaseConfig,
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from the given config file, or the nearest discovered one.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let source = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => config::discover(&cwd),
        };

        let config = match &source {
            Some(path) => {
                output.debug(&format!("Using config: {}", path.display()));
                config::load(path)?
            }
            None => ShowcaseConfig::default(),
        };

        Ok(Self { config, output, cwd })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }

    /// HTTP transport, or a fixture file served in its place.
    pub fn transport(&self, fixture: Option<&str>) -> Result<Arc<dyn Transport>> {
        match fixture {
            Some(path) => {
                let path = self.resolve_path(path);
                let transport = FixtureTransport::from_file(&path)
                    .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
                Ok(Arc::new(transport))
            }
            None => {
                let transport = HttpTransport::new().context("Failed to build HTTP client")?;
                Ok(Arc::new(transport))
            }
        }
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
