use std::path::Path;

use tracing::info;

use crate::config::PackConfig;
use crate::error::Result;
use crate::media::{CommandRunner, RunnerFactory};

/// Execution context shared by the nodes: the loaded configuration plus
/// the process runner used for encoder invocations. Hosts create one
/// workspace at startup and pass it to every node run.
pub struct Workspace {
    config: PackConfig,
    runner: Box<dyn CommandRunner>,
}

impl Workspace {
    /// Creates a workspace backed by the system process runner,
    /// creating any missing workspace directories.
    pub fn new(config: PackConfig) -> Result<Self> {
        Self::with_runner(config, RunnerFactory::create_runner())
    }

    /// Creates a workspace with an explicit runner.
    pub fn with_runner(config: PackConfig, runner: Box<dyn CommandRunner>) -> Result<Self> {
        config.workspace.ensure_dirs()?;
        info!(
            "Workspace ready: media={} output={} scratch={}",
            config.workspace.media_dir.display(),
            config.workspace.output_dir.display(),
            config.workspace.scratch_dir.display()
        );
        Ok(Self { config, runner })
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn media_dir(&self) -> &Path {
        &self.config.workspace.media_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.workspace.output_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.config.workspace.scratch_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(root: &Path) -> PackConfig {
        let mut config = PackConfig::default();
        config.workspace.media_dir = root.join("input");
        config.workspace.output_dir = root.join("output");
        config.workspace.scratch_dir = root.join("temp");
        config.workspace.models_dir = root.join("models");
        config
    }

    #[test]
    fn test_new_creates_workspace_directories() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(temp_config(dir.path())).unwrap();

        assert!(workspace.media_dir().is_dir());
        assert!(workspace.output_dir().is_dir());
        assert!(workspace.scratch_dir().is_dir());
        assert!(dir.path().join("models").is_dir());
    }
}
