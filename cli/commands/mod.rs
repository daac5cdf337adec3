pub mod config;
pub mod debug;
pub mod generate;
pub mod tree;

use crate::cli_args::ProjectOpts;
use aicc_core::{Config, LogReporter, ProjectContext, WalkOptions};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration and project root resolved from the shared options.
pub struct ProjectSetup {
    pub config: Config,
    pub config_path: PathBuf,
    pub config_found: bool,
    pub root: PathBuf,
    pub use_gitignore: bool,
    pub follow_links: bool,
}

impl ProjectSetup {
    pub fn resolve(opts: &ProjectOpts) -> Result<Self> {
        let config_path = Config::resolve_config_path(opts.config.as_deref());
        let (config, config_found) = Config::load_or_default(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        let root = config
            .determine_project_root(opts.project.as_deref())
            .context("Failed to determine project root")?;
        log::info!("Project root determined: {}", root.display());

        Ok(Self {
            use_gitignore: opts.use_gitignore || config.use_gitignore,
            follow_links: opts.follow_links || config.follow_links,
            config,
            config_path,
            config_found,
            root,
        })
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_links: self.follow_links,
        }
    }

    /// Filters and walks the project. `configured_output` is the output path
    /// before timestamping; its stem is excluded from the selection.
    pub fn build_context(&self, configured_output: &Path) -> Result<ProjectContext> {
        let reporter = LogReporter;
        let filter_set = ProjectContext::filters_for(
            &self.config,
            &self.root,
            configured_output,
            self.use_gitignore,
            &reporter,
        )
        .context("Failed to prepare filters")?;
        Ok(ProjectContext::build(
            &self.root,
            filter_set,
            self.walk_options(),
            &reporter,
        ))
    }
}
