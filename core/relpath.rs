use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path below the project root, always `/`-separated.
///
/// Ordering is segment by segment (byte-wise inside a segment), so a
/// directory sorts directly before its own children: `a`, `a/x`, `a-b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalizes a path that is already relative to the root.
    /// Returns `None` for the root itself or for paths escaping it.
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if segments.is_empty() {
            None
        } else {
            Some(RelativePath(segments.join("/")))
        }
    }

    /// Relativizes `path` against `root`.
    pub fn from_absolute(path: &Path, root: &Path) -> Option<Self> {
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .ok()
            .or_else(|| pathdiff::diff_paths(path, root))?;
        Self::from_relative(&relative)
    }

    /// Parses a `/` or `\` separated string.
    pub fn parse(text: &str) -> Option<Self> {
        let segments: Vec<&str> = text
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if segments.is_empty() || segments.contains(&"..") {
            None
        } else {
            Some(RelativePath(segments.join("/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// `None` when the path sits directly under the root.
    pub fn parent(&self) -> Option<RelativePath> {
        self.0
            .rfind('/')
            .map(|idx| RelativePath(self.0[..idx].to_string()))
    }

    /// Every ancestor directory, nearest first, root excluded.
    pub fn ancestors(&self) -> impl Iterator<Item = RelativePath> {
        std::iter::successors(self.parent(), RelativePath::parent)
    }

    pub fn join(&self, name: &str) -> RelativePath {
        RelativePath(format!("{}/{}", self.0, name))
    }

    pub fn to_path(&self) -> PathBuf {
        self.segments().collect()
    }

    pub fn to_absolute(&self, root: &Path) -> PathBuf {
        root.join(self.to_path())
    }
}

impl Ord for RelativePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(other.segments())
    }
}

impl PartialOrd for RelativePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}
