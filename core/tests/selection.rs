use aicc_core::{
    Aggregator, CollectingReporter, Config, NameFilter, ProjectContext, ReductionOptions,
    WalkOptions,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

fn context(root: &Path, config: &Config, use_gitignore: bool) -> ProjectContext {
    let reporter = CollectingReporter::new();
    let output = Path::new(&config.output_path);
    let filter_set =
        ProjectContext::filters_for(config, root, output, use_gitignore, &reporter).unwrap();
    ProjectContext::build(root, filter_set, WalkOptions::default(), &reporter)
}

fn names(ctx: &ProjectContext) -> Vec<&str> {
    ctx.files().iter().map(|p| p.as_str()).collect()
}

#[test]
fn default_filters_skip_dependency_folders() {
    let (_dir, root) = project(&[
        ("a.txt", "a"),
        ("b/c.txt", "c"),
        ("node_modules/x.js", "x"),
    ]);
    let ctx = context(&root, &Config::default(), false);

    assert_eq!(names(&ctx), vec!["a.txt", "b/c.txt"]);
    assert_eq!(
        ctx.tree().lines()[1..],
        [
            "├── a.txt".to_string(),
            "└── b/".to_string(),
            "    └── c.txt".to_string(),
        ]
    );
    assert_eq!(ctx.tree().lines()[0], format!("Project tree: {}", root.display()));
}

#[test]
fn deep_include_keeps_ancestor_directories_in_tree() {
    let (_dir, root) = project(&[
        ("pkg/sub/mod.py", "x = 1\n"),
        ("pkg/readme.txt", "hi"),
        ("top.txt", "t"),
    ]);
    let config = Config::from_yaml_str("include_patterns: ['**/*.py']\n", Path::new("t.yaml"))
        .unwrap();
    let ctx = context(&root, &config, false);

    assert_eq!(names(&ctx), vec!["pkg/sub/mod.py"]);
    assert_eq!(
        ctx.tree().lines()[1..],
        [
            "└── pkg/".to_string(),
            "    └── sub/".to_string(),
            "        └── mod.py".to_string(),
        ]
    );
}

#[test]
fn tree_only_filters_hide_entries_from_the_tree_only() {
    let (_dir, root) = project(&[("README.md", "# hi"), ("main.py", "print(1)\n")]);
    let ctx = context(&root, &Config::default(), false);

    assert_eq!(names(&ctx), vec!["README.md", "main.py"]);
    assert_eq!(
        ctx.tree().lines()[1..],
        ["└── main.py".to_string()]
    );
}

#[test]
fn previous_outputs_are_never_reingested() {
    let (_dir, root) = project(&[
        ("src/lib.rs", "pub fn a() {}"),
        ("ctx_20240101_000000.txt", "old run"),
        ("ctx_20240101_000000.log", "old log"),
    ]);
    let config = Config {
        output_path: "ctx.txt".to_string(),
        ..Config::default()
    };
    let ctx = context(&root, &config, false);

    assert_eq!(names(&ctx), vec!["src/lib.rs"]);
    assert!(ctx.tree().lines().iter().all(|l| !l.contains("ctx_")));
}

#[test]
fn gitignore_lines_extend_both_excludes() {
    let (_dir, root) = project(&[
        (".gitignore", "secret/\n# comment\n*.tmp\n"),
        ("secret/key.txt", "k"),
        ("scratch.tmp", "s"),
        ("kept.rs", "fn k() {}"),
    ]);
    let with = context(&root, &Config::default(), true);
    assert_eq!(names(&with), vec![".gitignore", "kept.rs"]);
    assert!(with.tree().lines().iter().all(|l| !l.contains("secret")));

    let without = context(&root, &Config::default(), false);
    assert_eq!(
        names(&without),
        vec![".gitignore", "kept.rs", "scratch.tmp", "secret/key.txt"]
    );
}

#[test]
fn repeated_runs_produce_identical_tree_and_body() {
    let (_dir, root) = project(&[
        ("z.py", "def main():\n    pass\n"),
        ("a/b.py", "# c\nx = 1\n"),
        ("a/c/d.txt", "d"),
    ]);
    let render = || {
        let ctx = context(&root, &Config::default(), false);
        let reporter = CollectingReporter::new();
        let aggregator = Aggregator::new(
            &root,
            ReductionOptions {
                strip_comments: true,
                headers_only: false,
            },
            NameFilter::empty(),
            &reporter,
        );
        aggregator
            .assemble(ctx.tree(), ctx.files())
            .full_body()
            .to_string()
    };
    let first = render();
    assert_eq!(first, render());
    assert!(first.contains("--- FILE: a/b.py"));
    assert!(!first.contains("# c"));
}

#[test]
fn negation_inside_a_globbed_directory_keeps_the_file() {
    let (_dir, root) = project(&[
        ("docs/keep.txt", "kept"),
        ("docs/drop.txt", "dropped"),
        ("src/main.py", "print(1)\n"),
    ]);
    let config = Config {
        project_only_filters: Some(vec!["docs/*".to_string(), "!docs/keep.txt".to_string()]),
        ..Config::default()
    };
    let ctx = context(&root, &config, false);

    assert_eq!(names(&ctx), vec!["docs/keep.txt", "src/main.py"]);
}

#[test]
fn short_output_stem_does_not_prune_unrelated_directories() {
    let (_dir, root) = project(&[
        ("lib/util.py", "x = 1\n"),
        ("src/main.py", "print(1)\n"),
        ("top.py", "y = 2\n"),
        ("d_20240101_000000.txt", "old run"),
    ]);
    let config = Config {
        output_path: "d.txt".to_string(),
        ..Config::default()
    };
    let ctx = context(&root, &config, false);

    assert_eq!(names(&ctx), vec!["lib/util.py", "src/main.py", "top.py"]);
}
