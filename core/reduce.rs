use crate::python::PythonReducer;
use crate::relpath::RelativePath;
use crate::report::Reporter;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReductionOptions {
    pub strip_comments: bool,
    pub headers_only: bool,
}

impl ReductionOptions {
    pub fn is_active(&self) -> bool {
        self.strip_comments || self.headers_only
    }
}

/// Globs over bare definition names (`main`, `configure_*`) whose bodies
/// survive signature extraction untouched.
#[derive(Debug, Clone)]
pub struct NameFilter {
    set: GlobSet,
}

impl NameFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S], reporter: &dyn Reporter) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns.iter().map(|p| p.as_ref().trim()).filter(|p| !p.is_empty()) {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => reporter.warn(&format!(
                    "Ignoring invalid full-body pattern \"{}\": {}",
                    pattern, e
                )),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            reporter.warn(&format!("Error building full-body filter: {}", e));
            GlobSet::empty()
        });
        Self { set }
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.set.is_match(name)
    }
}

/// Language-specific shrinking of file content.
pub trait ContentReducer: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the content could not be processed.
    fn strip_comments(&self, content: &str) -> Option<String>;

    /// `None` when the language has no signature view.
    fn signatures(&self, _content: &str, _keep_full: &NameFilter) -> Option<String> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ContentReducer for PassThrough {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn strip_comments(&self, content: &str) -> Option<String> {
        Some(content.to_string())
    }
}

/// Shell-like files: whole-line `#` comments are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashLineComments;

impl ContentReducer for HashLineComments {
    fn name(&self) -> &'static str {
        "hash-comments"
    }

    fn strip_comments(&self, content: &str) -> Option<String> {
        Some(
            content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#'))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Picks a reducer by extension, then by file-name fragment.
pub struct ReducerRegistry {
    by_extension: HashMap<String, Arc<dyn ContentReducer>>,
    by_name_fragment: Vec<(String, Arc<dyn ContentReducer>)>,
    fallback: PassThrough,
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_extension("py", Arc::new(PythonReducer));
        let shell: Arc<dyn ContentReducer> = Arc::new(HashLineComments);
        registry.register_extension("sh", shell.clone());
        registry.register_extension("bash", shell.clone());
        registry.register_name_fragment("Dockerfile", shell);
        registry
    }
}

impl ReducerRegistry {
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
            by_name_fragment: Vec::new(),
            fallback: PassThrough,
        }
    }

    pub fn register_extension(&mut self, extension: &str, reducer: Arc<dyn ContentReducer>) {
        self.by_extension
            .insert(extension.trim_start_matches('.').to_string(), reducer);
    }

    pub fn register_name_fragment(&mut self, fragment: &str, reducer: Arc<dyn ContentReducer>) {
        self.by_name_fragment.push((fragment.to_string(), reducer));
    }

    pub fn for_path(&self, path: &RelativePath) -> &dyn ContentReducer {
        let name = path.file_name();
        let by_extension = name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .and_then(|(_, ext)| self.by_extension.get(ext));
        if let Some(reducer) = by_extension {
            return &**reducer;
        }
        self.by_name_fragment
            .iter()
            .find(|(fragment, _)| name.contains(fragment.as_str()))
            .map(|(_, reducer)| &**reducer)
            .unwrap_or(&self.fallback)
    }

    /// Applies `options` to one file's content.
    ///
    /// Signature extraction wins when the language supports it; otherwise
    /// comment stripping applies if requested.
    pub fn reduce(
        &self,
        path: &RelativePath,
        content: String,
        options: ReductionOptions,
        keep_full: &NameFilter,
        reporter: &dyn Reporter,
    ) -> String {
        if !options.is_active() {
            return content;
        }
        let reducer = self.for_path(path);
        if options.headers_only {
            if let Some(signatures) = reducer.signatures(&content, keep_full) {
                reporter.trace(&format!("{}: signatures via {}", path, reducer.name()));
                return signatures;
            }
        }
        if options.strip_comments {
            return match reducer.strip_comments(&content) {
                Some(stripped) => stripped,
                None => {
                    reporter.warn(&format!(
                        "Could not strip comments from {}; including it unchanged.",
                        path
                    ));
                    content
                }
            };
        }
        content
    }
}
