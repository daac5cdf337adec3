//! Assembles the final artifact: preamble, tree, then one block per file.

use crate::error::{AppError, Result};
use crate::reduce::{NameFilter, ReducerRegistry, ReductionOptions};
use crate::relpath::RelativePath;
use crate::report::Reporter;
use crate::stats::ContentStats;
use crate::tree::ProjectTree;
use chrono::{DateTime, TimeZone};
use std::fs;
use std::path::Path;

pub const RULE_WIDTH: usize = 80;
pub const BODY_TITLE: &str = "FILE CONTENTS";
pub const FILE_MARKER: &str = "--- FILE:";
pub const DESCRIPTION: &str = "This file is a concatenation of the source files of a project.";
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a file as text, replacing invalid UTF-8 sequences.
pub fn read_lossy(path: &Path) -> Result<String> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Delimiter block plus content for one file.
pub fn file_block(path: &RelativePath, content: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n{FILE_MARKER} {path}\n{rule}\n\n{content}")
}

pub struct Aggregator<'a> {
    root: &'a Path,
    registry: ReducerRegistry,
    options: ReductionOptions,
    keep_full: NameFilter,
    reporter: &'a dyn Reporter,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        root: &'a Path,
        options: ReductionOptions,
        keep_full: NameFilter,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            root,
            registry: ReducerRegistry::default(),
            options,
            keep_full,
            reporter,
        }
    }

    /// Reads, reduces and wraps every file in order. Unreadable files are
    /// reported and left out.
    pub fn assemble(&self, tree: &ProjectTree, files: &[RelativePath]) -> Artifact {
        let mut body = String::new();
        let mut included = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for path in files {
            let absolute = path.to_absolute(self.root);
            let content = match read_lossy(&absolute) {
                Ok(content) => content,
                Err(e) => {
                    self.reporter.warn(&format!("Unable to read {}: {}", path, e));
                    skipped.push(path.clone());
                    continue;
                }
            };
            self.reporter.info(&format!("  -> Processing: {}", path));
            let content =
                self.registry
                    .reduce(path, content, self.options, &self.keep_full, self.reporter);
            body.push_str(&file_block(path, &content));
            included.push(path.clone());
        }

        let rule = "-".repeat(RULE_WIDTH);
        let full_body = format!("{tree}\n\n{rule}\n{BODY_TITLE}\n{rule}\n\n{body}");
        let stats = ContentStats::measure(&full_body);
        self.reporter.info(&format!(
            "Assembled {} files ({} skipped). {}",
            included.len(),
            skipped.len(),
            stats
        ));

        Artifact {
            full_body,
            stats,
            included,
            skipped,
        }
    }
}

/// Tree and file blocks, ready to be prefixed with a preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    full_body: String,
    stats: ContentStats,
    included: Vec<RelativePath>,
    skipped: Vec<RelativePath>,
}

impl Artifact {
    pub fn full_body(&self) -> &str {
        &self.full_body
    }

    /// Measured over the full body only; the preamble is not counted.
    pub fn stats(&self) -> ContentStats {
        self.stats
    }

    pub fn included(&self) -> &[RelativePath] {
        &self.included
    }

    pub fn skipped(&self) -> &[RelativePath] {
        &self.skipped
    }

    pub fn preamble<Tz: TimeZone>(&self, generated: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{}\nGenerated: {}\nContent statistics: {}\n\n",
            DESCRIPTION,
            generated.format(GENERATED_FORMAT),
            self.stats
        )
    }

    pub fn render<Tz: TimeZone>(&self, generated: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = self.preamble(generated);
        out.push_str(&self.full_body);
        out
    }
}
