use crate::relpath::RelativePath;
use crate::walk::VisibleSet;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const TREE_TITLE: &str = "Project tree:";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const BLANK_INDENT: &str = "    ";

/// Rendered tree lines. The first line names the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    root: PathBuf,
    lines: Vec<String>,
}

impl ProjectTree {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for ProjectTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Renders `visible` (already closed under ancestry) as an ASCII tree.
///
/// The output depends only on the set's contents: entries are consumed in
/// [`RelativePath`] order, never in filesystem order.
pub fn render_tree(root: &Path, visible: &VisibleSet) -> ProjectTree {
    let mut lines = Vec::with_capacity(visible.len() + 1);
    lines.push(format!("{} {}", TREE_TITLE, root.display()));

    let last_children = last_child_per_parent(visible);
    // last_at_depth[i]: whether the latest node seen at depth i+1 closed its
    // sibling list. Overwritten as the walk moves on.
    let mut last_at_depth: Vec<bool> = Vec::new();

    for (path, kind) in visible.iter() {
        let depth = path.depth();
        let is_last = last_children
            .get(&path.parent())
            .is_none_or(|last| *last == path);

        if last_at_depth.len() < depth {
            last_at_depth.resize(depth, false);
        }
        last_at_depth[depth - 1] = is_last;

        let mut line: String = last_at_depth[..depth - 1]
            .iter()
            .map(|closed| if *closed { BLANK_INDENT } else { PIPE_INDENT })
            .collect();
        line.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        line.push_str(path.file_name());
        if kind.is_dir() {
            line.push('/');
        }
        lines.push(line);
    }

    ProjectTree {
        root: root.to_path_buf(),
        lines,
    }
}

fn last_child_per_parent(visible: &VisibleSet) -> HashMap<Option<RelativePath>, &RelativePath> {
    let mut last = HashMap::new();
    for (path, _) in visible.iter() {
        last.insert(path.parent(), path);
    }
    last
}
