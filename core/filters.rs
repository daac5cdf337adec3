use crate::config::Config;
use crate::error::{AppError, Result};
use crate::patterns::{PatternMatcher, clean_patterns};
use crate::relpath::RelativePath;
use crate::report::Reporter;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const GITIGNORE_FILENAME: &str = ".gitignore";
pub const MATCH_EVERYTHING: &str = "**/*";

/// The three ordered pattern lists a run works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    pub include: Vec<String>,
    pub body_exclude: Vec<String>,
    pub tree_exclude: Vec<String>,
}

impl FilterSet {
    /// Composes the lists from configuration, the configured output path and
    /// optional `.gitignore` content.
    ///
    /// `output_path` is the output file as configured (before any timestamp
    /// suffix); its stem becomes a `<stem>*` exclusion appended to both
    /// exclude lists.
    pub fn build(
        config: &Config,
        output_path: &Path,
        gitignore: Option<&str>,
        reporter: &dyn Reporter,
    ) -> Self {
        let mut include = clean_patterns(config.include_patterns());
        if include.is_empty() {
            reporter.warn("No include patterns left after cleaning; including everything.");
            include.push(MATCH_EVERYTHING.to_string());
        }

        let common = clean_patterns(config.common_filters());
        let mut body_exclude = common.clone();
        body_exclude.extend(clean_patterns(config.project_only_filters()));
        let mut tree_exclude = common;
        tree_exclude.extend(clean_patterns(config.tree_only_filters()));

        match output_stem_pattern(output_path) {
            Some(stem_pattern) => {
                reporter.debug(&format!("Auto-excluding own output with '{}'", stem_pattern));
                body_exclude.push(stem_pattern.clone());
                tree_exclude.push(stem_pattern);
            }
            None => reporter.warn(&format!(
                "Output path '{}' has no file name; cannot auto-exclude it.",
                output_path.display()
            )),
        }

        if let Some(content) = gitignore {
            let lines: Vec<&str> = content.lines().collect();
            let gitignore_patterns = clean_patterns(&lines);
            reporter.debug(&format!(
                "Appending {} .gitignore patterns to exclude lists",
                gitignore_patterns.len()
            ));
            body_exclude.extend(gitignore_patterns.iter().cloned());
            tree_exclude.extend(gitignore_patterns);
        }

        FilterSet {
            include,
            body_exclude,
            tree_exclude,
        }
    }

    /// Compiles the four matchers of a run.
    pub fn compile(&self, root: &Path, reporter: &dyn Reporter) -> Filters {
        Filters {
            body: Selection::new(
                include_matcher(root, &self.include, reporter),
                PatternMatcher::new(root, &self.body_exclude, reporter),
            ),
            tree: Selection::new(
                include_matcher(root, &self.include, reporter),
                PatternMatcher::new(root, &self.tree_exclude, reporter),
            ),
        }
    }
}

fn include_matcher(root: &Path, patterns: &[String], reporter: &dyn Reporter) -> PatternMatcher {
    let matcher = PatternMatcher::new(root, patterns, reporter);
    if matcher.is_empty() {
        reporter.warn("No usable include pattern compiled; including everything.");
        PatternMatcher::match_all()
    } else {
        matcher
    }
}

/// `<stem>*` for the file name of `output_path`.
pub fn output_stem_pattern(output_path: &Path) -> Option<String> {
    output_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .filter(|stem| !stem.trim().is_empty())
        .map(|stem| format!("{}*", stem))
}

/// Reads `<root>/.gitignore`. A missing file is `None`; an unreadable one is
/// a configuration error, raised before any traversal starts.
pub fn read_gitignore(root: &Path) -> Result<Option<String>> {
    let path = root.join(GITIGNORE_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    fs::read(&path)
        .map(|bytes| Some(String::from_utf8_lossy(&bytes).into_owned()))
        .map_err(|e| {
            AppError::Config(format!(
                "Failed to read ignore file '{}': {}",
                path.display(),
                e
            ))
        })
}

/// An include matcher paired with an exclude matcher.
#[derive(Debug, Clone)]
pub struct Selection {
    include: PatternMatcher,
    exclude: PatternMatcher,
}

impl Selection {
    pub fn new(include: PatternMatcher, exclude: PatternMatcher) -> Self {
        Self { include, exclude }
    }

    /// A directory whose subtree must never be visited.
    pub fn prunes(&self, dir: &RelativePath) -> bool {
        self.exclude.is_match(dir, true)
    }

    pub fn selects(&self, path: &RelativePath, is_dir: bool) -> bool {
        self.include.is_match(path, is_dir) && !self.exclude.is_match(path, is_dir)
    }

    pub fn include(&self) -> &PatternMatcher {
        &self.include
    }

    pub fn exclude(&self) -> &PatternMatcher {
        &self.exclude
    }
}

/// Body and tree selections of one run.
#[derive(Debug, Clone)]
pub struct Filters {
    pub body: Selection,
    pub tree: Selection,
}
