use crate::config::Config;
use crate::error::Result;
use crate::filters::{FilterSet, read_gitignore};
use crate::relpath::RelativePath;
use crate::report::Reporter;
use crate::tree::{ProjectTree, render_tree};
use crate::walk::{VisibleSet, WalkOptions, Walker};
use std::path::{Path, PathBuf};

/// Everything selected for one project root: the body file list, the
/// visible tree entries and their rendering.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    filter_set: FilterSet,
    files: Vec<RelativePath>,
    visible: VisibleSet,
    tree: ProjectTree,
}

impl ProjectContext {
    /// Builds the filter lists for `root`, reading `.gitignore` first when
    /// `use_gitignore` is set.
    pub fn filters_for(
        config: &Config,
        root: &Path,
        configured_output: &Path,
        use_gitignore: bool,
        reporter: &dyn Reporter,
    ) -> Result<FilterSet> {
        let gitignore = if use_gitignore {
            let content = read_gitignore(root)?;
            if content.is_none() {
                reporter.info("No .gitignore found at the project root.");
            }
            content
        } else {
            None
        };
        Ok(FilterSet::build(
            config,
            configured_output,
            gitignore.as_deref(),
            reporter,
        ))
    }

    /// Runs both walks and renders the tree. Per-entry problems are reported
    /// and skipped; this never fails.
    pub fn build(
        root: &Path,
        filter_set: FilterSet,
        options: WalkOptions,
        reporter: &dyn Reporter,
    ) -> Self {
        let filters = filter_set.compile(root, reporter);
        let walker = Walker::new(root, options, reporter);

        reporter.info("Collecting files for the body...");
        let files = walker.collect_files(&filters.body);
        reporter.info("Collecting entries for the tree...");
        let visible = walker.collect_visible(&filters.tree);
        let tree = render_tree(root, &visible);

        Self {
            root: root.to_path_buf(),
            filter_set,
            files,
            visible,
            tree,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter_set(&self) -> &FilterSet {
        &self.filter_set
    }

    pub fn files(&self) -> &[RelativePath] {
        &self.files
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn tree(&self) -> &ProjectTree {
        &self.tree
    }
}
