use crate::relpath::RelativePath;
use crate::report::Reporter;
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Drops blank and whitespace-only entries, trimming the rest.
pub fn clean_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// An ordered gitignore-style rule list answering "does this path match?".
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    gitignore: Gitignore,
    patterns: Vec<String>,
    match_all: bool,
}

impl PatternMatcher {
    /// Builds a matcher rooted at `root`. Patterns that fail to compile are
    /// reported and left out; the remaining rules keep their order.
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S], reporter: &dyn Reporter) -> Self {
        let mut accepted = Vec::new();
        for pattern in clean_patterns(patterns) {
            match GitignoreBuilder::new(root).add_line(None, &pattern) {
                Ok(_) => {
                    reporter.trace(&format!("Adding pattern: {}", pattern));
                    accepted.push(pattern);
                }
                Err(e) => {
                    reporter.warn(&format!(
                        "Ignoring invalid pattern \"{}\": {}",
                        pattern, e
                    ));
                }
            }
        }

        let gitignore = match compile(root, &accepted) {
            Ok(gitignore) => gitignore,
            Err(e) => {
                reporter.warn(&format!(
                    "Failed to build pattern set ({}); retrying with the patterns that build alone.",
                    e
                ));
                accepted.retain(|pattern| match compile(root, std::slice::from_ref(pattern)) {
                    Ok(_) => true,
                    Err(e) => {
                        reporter.warn(&format!("Dropping pattern \"{}\": {}", pattern, e));
                        false
                    }
                });
                match compile(root, &accepted) {
                    Ok(gitignore) => gitignore,
                    Err(e) => {
                        reporter.warn(&format!(
                            "Failed to build pattern set ({}); treating it as empty.",
                            e
                        ));
                        accepted.clear();
                        Gitignore::empty()
                    }
                }
            }
        };

        Self {
            gitignore,
            patterns: accepted,
            match_all: false,
        }
    }

    /// A matcher that accepts every path.
    pub fn match_all() -> Self {
        Self {
            gitignore: Gitignore::empty(),
            patterns: vec!["**/*".to_string()],
            match_all: true,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        !self.match_all && self.patterns.is_empty()
    }

    /// `is_dir` enables the directory-only (`name/`) rules.
    pub fn is_match(&self, path: &RelativePath, is_dir: bool) -> bool {
        if self.match_all {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        matches!(
            self.gitignore.matched_path_or_any_parents(path, is_dir),
            Match::Ignore(_)
        )
    }
}

/// `X/**` matches only what is inside `X`. The directory itself gets an
/// extra `X/` rule right after it so it is pruned too.
fn directory_rule(pattern: &str) -> Option<String> {
    if pattern.starts_with('!') {
        return None;
    }
    let stem = pattern.strip_suffix("/**")?;
    if stem.is_empty() || stem.ends_with("**") {
        return None;
    }
    if stem.starts_with('/') || stem.starts_with("**/") {
        Some(format!("{}/", stem))
    } else {
        // `X/**` is anchored at the root; `X/` alone would match at any depth.
        Some(format!("/{}/", stem))
    }
}

fn compile(root: &Path, patterns: &[String]) -> Result<Gitignore, ignore::Error> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder.add_line(None, pattern)?;
        if let Some(rule) = directory_rule(pattern) {
            builder.add_line(None, &rule)?;
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use rstest::rstest;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        PatternMatcher::new(Path::new("/project"), patterns, &CollectingReporter::new())
    }

    fn rel(s: &str) -> RelativePath {
        RelativePath::parse(s).unwrap()
    }

    #[rstest]
    #[case(&["node_modules/"], "node_modules", true, true)]
    #[case(&["node_modules/"], "node_modules", false, false)]
    #[case(&["node_modules/"], "web/node_modules", true, true)]
    #[case(&["node_modules/"], "node_modules/x.js", false, true)]
    #[case(&["*.pyc"], "pkg/mod.pyc", false, true)]
    #[case(&["/build"], "build", true, true)]
    #[case(&["/build"], "src/build", true, false)]
    #[case(&["docs/*.md"], "docs/a.md", false, true)]
    #[case(&["docs/*.md"], "x/docs/a.md", false, false)]
    #[case(&["build/**"], "build", true, true)]
    #[case(&["build/**"], "src/build", true, false)]
    #[case(&["build/**"], "build/out/a.o", false, true)]
    #[case(&["docs/*", "!docs/keep.md"], "docs", true, false)]
    #[case(&["docs/*", "!docs/keep.md"], "docs/keep.md", false, false)]
    #[case(&["docs/*", "!docs/keep.md"], "docs/drop.md", false, true)]
    #[case(&["d*"], "src", true, false)]
    #[case(&["d*"], "src/main.py", false, false)]
    #[case(&["d*"], "dist", true, true)]
    #[case(&["**/*.py"], "a/b/c.py", false, true)]
    #[case(&["**/*.py"], "a/b", true, false)]
    #[case(&["*.log", "!keep.log"], "keep.log", false, false)]
    #[case(&["*.log", "!keep.log"], "drop.log", false, true)]
    fn gitignore_semantics(
        #[case] patterns: &[&str],
        #[case] path: &str,
        #[case] is_dir: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(matcher(patterns).is_match(&rel(path), is_dir), expected);
    }

    #[test]
    fn blank_patterns_are_discarded() {
        let m = matcher(&["", "   ", "\t"]);
        assert!(m.is_empty());
        assert!(!m.is_match(&rel("anything.txt"), false));
        assert_eq!(clean_patterns(&[" a ", "", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn invalid_pattern_is_inert_and_reported() {
        let reporter = CollectingReporter::new();
        let m = PatternMatcher::new(
            Path::new("/project"),
            &["*.tmp", "{a,b", "logs/"],
            &reporter,
        );
        assert_eq!(m.patterns(), &["*.tmp".to_string(), "logs/".to_string()]);
        assert!(m.is_match(&rel("x.tmp"), false));
        assert!(m.is_match(&rel("deep/logs"), true));
        assert!(!m.is_match(&rel("{a,b"), false));
        let warnings = reporter.messages_at_least(log::Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("{a,b"));
    }

    #[rstest]
    #[case("build/**", Some("/build/"))]
    #[case("/out/**", Some("/out/"))]
    #[case("**/target/**", Some("**/target/"))]
    #[case("!build/**", None)]
    #[case("build/*", None)]
    #[case("**", None)]
    fn double_star_suffix_adds_a_directory_rule(#[case] pattern: &str, #[case] rule: Option<&str>) {
        assert_eq!(directory_rule(pattern).as_deref(), rule);
    }

    #[test]
    fn match_all_accepts_everything() {
        let m = PatternMatcher::match_all();
        assert!(m.is_match(&rel("deep/nested/file"), false));
        assert!(m.is_match(&rel("dir"), true));
    }
}
