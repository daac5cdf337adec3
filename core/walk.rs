use crate::filters::Selection;
use crate::relpath::RelativePath;
use crate::report::Reporter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == EntryKind::Dir
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into symlinked directories. Cycles are detected and skipped.
    pub follow_links: bool,
}

/// Visible entries of the tree, ordered by [`RelativePath`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    entries: BTreeMap<RelativePath, EntryKind>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath, kind: EntryKind) {
        self.entries.insert(path, kind);
    }

    /// Adds every missing ancestor directory of every member.
    pub fn close_over_ancestors(&mut self) {
        // Ascending order visits ancestors first, so a chain can stop at the
        // first ancestor already present: that one is closed already.
        let members: Vec<RelativePath> = self.entries.keys().cloned().collect();
        for path in members {
            for ancestor in path.ancestors() {
                if self.entries.contains_key(&ancestor) {
                    break;
                }
                self.entries.insert(ancestor, EntryKind::Dir);
            }
        }
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn kind(&self, path: &RelativePath) -> Option<EntryKind> {
        self.entries.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, EntryKind)> {
        self.entries.iter().map(|(path, kind)| (path, *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(RelativePath, EntryKind)> for VisibleSet {
    fn from_iter<I: IntoIterator<Item = (RelativePath, EntryKind)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Single-threaded, top-down walk of a project root with exclude pruning.
pub struct Walker<'a> {
    root: &'a Path,
    options: WalkOptions,
    reporter: &'a dyn Reporter,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, options: WalkOptions, reporter: &'a dyn Reporter) -> Self {
        Self {
            root,
            options,
            reporter,
        }
    }

    /// Selected files, sorted and free of duplicates.
    pub fn collect_files(&self, selection: &Selection) -> Vec<RelativePath> {
        let mut files = Vec::new();
        self.walk(selection, |path, kind| {
            if kind == EntryKind::File {
                files.push(path);
            }
        });
        files.sort();
        files.dedup();
        self.reporter
            .info(&format!("{} files selected for the body.", files.len()));
        files
    }

    /// Selected files and directories, closed under ancestry.
    pub fn collect_visible(&self, selection: &Selection) -> VisibleSet {
        let mut visible = VisibleSet::new();
        self.walk(selection, |path, kind| visible.insert(path, kind));
        let kept = visible.len();
        visible.close_over_ancestors();
        self.reporter.debug(&format!(
            "{} tree entries kept, {} after adding ancestors.",
            kept,
            visible.len()
        ));
        visible
    }

    fn walk(&self, selection: &Selection, mut keep: impl FnMut(RelativePath, EntryKind)) {
        let root = self.root;
        let reporter = self.reporter;
        reporter.trace(&format!("Walking {}", root.display()));

        let entries = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.options.follow_links)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                match RelativePath::from_absolute(entry.path(), root) {
                    Some(dir) if selection.prunes(&dir) => {
                        reporter.debug(&format!("Pruning excluded directory: {}", dir));
                        false
                    }
                    _ => true,
                }
            });

        for result in entries {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    report_walk_error(reporter, &e);
                    continue;
                }
            };
            let Some(path) = RelativePath::from_absolute(entry.path(), root) else {
                reporter.warn(&format!(
                    "Could not get relative path for: {}",
                    entry.path().display()
                ));
                continue;
            };

            let kind = if entry.file_type().is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            if !selection.selects(&path, kind.is_dir()) {
                reporter.trace(&format!("Not selected: {}", path));
                continue;
            }
            if kind == EntryKind::File && !is_regular_file(&entry) {
                reporter.debug(&format!("Skipping non-regular file: {}", path));
                continue;
            }
            keep(path, kind);
        }
    }
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn report_walk_error(reporter: &dyn Reporter, error: &walkdir::Error) {
    match (error.loop_ancestor(), error.path()) {
        (Some(ancestor), Some(path)) => reporter.warn(&format!(
            "Symlink cycle: {} points back to {}; not descending.",
            path.display(),
            ancestor.display()
        )),
        _ => reporter.warn(&format!("Skipping unreadable entry: {}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternMatcher;
    use crate::report::CollectingReporter;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
        dir
    }

    fn selection(root: &Path, include: &[&str], exclude: &[&str]) -> Selection {
        let reporter = CollectingReporter::new();
        Selection::new(
            PatternMatcher::new(root, include, &reporter),
            PatternMatcher::new(root, exclude, &reporter),
        )
    }

    fn names(paths: &[RelativePath]) -> Vec<&str> {
        paths.iter().map(RelativePath::as_str).collect()
    }

    #[test]
    fn pruned_directory_wins_over_negation_inside_it() {
        let dir = project(&["cache/keep.txt", "cache/deep/x.txt", "src/a.txt"]);
        let sel = selection(dir.path(), &["**/*"], &["cache/", "!cache/keep.txt"]);
        let reporter = CollectingReporter::new();
        let walker = Walker::new(dir.path(), WalkOptions::default(), &reporter);

        assert_eq!(names(&walker.collect_files(&sel)), vec!["src/a.txt"]);
        let visible = walker.collect_visible(&sel);
        assert!(visible.iter().all(|(p, _)| !p.as_str().starts_with("cache")));
    }

    #[test]
    fn files_come_back_sorted_by_segment() {
        let dir = project(&["a-b/z.txt", "a/y.txt", "a.txt", "B.txt"]);
        let sel = selection(dir.path(), &["**/*"], &[]);
        let reporter = CollectingReporter::new();
        let files = Walker::new(dir.path(), WalkOptions::default(), &reporter).collect_files(&sel);
        assert_eq!(names(&files), vec!["B.txt", "a/y.txt", "a-b/z.txt", "a.txt"]);
    }

    #[test]
    fn closure_adds_directories_the_include_rejects() {
        let dir = project(&["x/y/z/deep.py", "x/y/z/n.txt", "x/y/n.txt", "x/n.txt", "n.txt", "w/n.txt"]);
        let sel = selection(dir.path(), &["**/*.py"], &[]);
        let reporter = CollectingReporter::new();
        let visible = Walker::new(dir.path(), WalkOptions::default(), &reporter).collect_visible(&sel);

        let listed: Vec<(&str, EntryKind)> = visible.iter().map(|(p, k)| (p.as_str(), k)).collect();
        assert_eq!(
            listed,
            vec![
                ("x", EntryKind::Dir),
                ("x/y", EntryKind::Dir),
                ("x/y/z", EntryKind::Dir),
                ("x/y/z/deep.py", EntryKind::File),
            ]
        );
    }

    #[test]
    fn closure_is_complete_for_arbitrary_members() {
        let mut visible: VisibleSet = [
            (RelativePath::parse("a/b/c/d.txt").unwrap(), EntryKind::File),
            (RelativePath::parse("a/b").unwrap(), EntryKind::Dir),
            (RelativePath::parse("e/f.txt").unwrap(), EntryKind::File),
        ]
        .into_iter()
        .collect();
        visible.close_over_ancestors();

        for (path, _) in visible.iter() {
            for ancestor in path.ancestors() {
                assert!(visible.contains(&ancestor), "{ancestor} missing for {path}");
                assert_eq!(visible.kind(&ancestor), Some(EntryKind::Dir));
            }
        }
        assert_eq!(visible.len(), 6);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_reported_and_broken() {
        let dir = project(&["loop/inner/file.txt"]);
        std::os::unix::fs::symlink(dir.path().join("loop"), dir.path().join("loop/inner/back"))
            .unwrap();
        let sel = selection(dir.path(), &["**/*"], &[]);
        let reporter = CollectingReporter::new();
        let walker = Walker::new(dir.path(), WalkOptions { follow_links: true }, &reporter);

        let files = walker.collect_files(&sel);
        assert_eq!(names(&files), vec!["loop/inner/file.txt"]);
        assert!(
            reporter
                .messages_at_least(log::Level::Warn)
                .iter()
                .any(|m| m.contains("Symlink cycle"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn unfollowed_directory_symlink_is_not_a_file() {
        let dir = project(&["real/file.txt"]);
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();
        let sel = selection(dir.path(), &["**/*"], &[]);
        let reporter = CollectingReporter::new();
        let files = Walker::new(dir.path(), WalkOptions::default(), &reporter).collect_files(&sel);
        assert_eq!(names(&files), vec!["real/file.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_reported_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = project(&["locked/secret.txt", "open/a.txt"]);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Permission bits do not bind this user (root).
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let sel = selection(dir.path(), &["**/*"], &[]);
        let reporter = CollectingReporter::new();
        let files = Walker::new(dir.path(), WalkOptions::default(), &reporter).collect_files(&sel);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(names(&files), vec!["open/a.txt"]);
        assert!(
            reporter
                .messages_at_least(log::Level::Warn)
                .iter()
                .any(|m| m.contains("Skipping unreadable entry"))
        );
    }
}
