use crate::error::{AppError, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "aicc.yaml";
pub const DEFAULT_OUTPUT_PATH: &str = "./build/project_context.txt";
pub const LOG_EXTENSION: &str = "log";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// User configuration, read from YAML.
///
/// List keys are `Option`s so that an explicit `null` in the file can be
/// told apart from an absent key: absent keys get the built-in default,
/// `null` means "no patterns".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Option<Vec<String>>,
    #[serde(default = "default_common_filters")]
    pub common_filters: Option<Vec<String>>,
    #[serde(default = "default_empty_list")]
    pub project_only_filters: Option<Vec<String>>,
    #[serde(default = "default_tree_only_filters")]
    pub tree_only_filters: Option<Vec<String>>,
    #[serde(default = "default_full_body_filters")]
    pub full_body_filters: Option<Vec<String>>,
    #[serde(default)]
    pub use_gitignore: bool,
    #[serde(default)]
    pub follow_links: bool,
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}
fn to_list(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}
fn default_include_patterns() -> Option<Vec<String>> {
    to_list(&["**/*"])
}
fn default_common_filters() -> Option<Vec<String>> {
    to_list(&[
        "__pycache__/",
        "*.pyc",
        ".git/",
        ".venv/",
        "venv/",
        "node_modules/",
        "build/",
        "dist/",
        ".idea/",
        ".vscode/",
    ])
}
fn default_empty_list() -> Option<Vec<String>> {
    Some(Vec::new())
}
fn default_tree_only_filters() -> Option<Vec<String>> {
    to_list(&["*.md", "LICENSE", ".gitignore", DEFAULT_CONFIG_FILENAME])
}
fn default_full_body_filters() -> Option<Vec<String>> {
    to_list(&["main", "run_app", "settings", "configure_*"])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            project_path: None,
            include_patterns: default_include_patterns(),
            common_filters: default_common_filters(),
            project_only_filters: default_empty_list(),
            tree_only_filters: default_tree_only_filters(),
            full_body_filters: default_full_body_filters(),
            use_gitignore: false,
            follow_links: false,
        }
    }
}

impl Config {
    pub fn include_patterns(&self) -> &[String] {
        self.include_patterns.as_deref().unwrap_or_default()
    }
    pub fn common_filters(&self) -> &[String] {
        self.common_filters.as_deref().unwrap_or_default()
    }
    pub fn project_only_filters(&self) -> &[String] {
        self.project_only_filters.as_deref().unwrap_or_default()
    }
    pub fn tree_only_filters(&self) -> &[String] {
        self.tree_only_filters.as_deref().unwrap_or_default()
    }
    pub fn full_body_filters(&self) -> &[String] {
        self.full_body_filters.as_deref().unwrap_or_default()
    }

    /// Parses YAML text. Empty or comment-only documents yield the defaults.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self> {
        let has_content = yaml.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && line != "---"
        });
        if !has_content {
            log::debug!("Config '{}' is empty; using defaults.", origin.display());
            return Ok(Config::default());
        }
        serde_yml::from_str::<Config>(yaml).map_err(|e| AppError::YamlParse {
            path: origin.to_path_buf(),
            message: format!("{}. Check YAML syntax and key names.", e),
        })
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let yaml = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&yaml, config_path)
    }

    /// Loads `config_path` if it exists, otherwise returns the defaults.
    /// The flag tells whether the file was found.
    pub fn load_or_default(config_path: &Path) -> Result<(Self, bool)> {
        if config_path.is_file() {
            Ok((Self::load_from_path(config_path)?, true))
        } else {
            log::debug!(
                "No config file at '{}'; using defaults.",
                config_path.display()
            );
            Ok((Config::default(), false))
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        let body = serde_yml::to_string(self)?;
        Ok(format!("# aicc configuration\n{}", body))
    }

    /// Writes the default configuration to `path`, creating parent folders.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let yaml = Config::default().to_yaml()?;
        fs::write(path, yaml).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn resolve_config_path(cli_config_file: Option<&Path>) -> PathBuf {
        match cli_config_file {
            Some(path) => expand_tilde(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILENAME),
        }
    }

    /// CLI value first, then `project_path`, then the working directory.
    pub fn determine_project_root(&self, cli_project_root: Option<&Path>) -> Result<PathBuf> {
        let path_to_resolve = match cli_project_root {
            Some(path) => expand_tilde(path),
            None => match self.project_path.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(configured) => expand_tilde(Path::new(configured)),
                None => env::current_dir().map_err(AppError::Io)?,
            },
        };

        let root = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Config(format!(
                "Failed to canonicalize project root '{}': {}",
                path_to_resolve.display(),
                e
            ))
        })?;
        if !root.is_dir() {
            return Err(AppError::Config(format!(
                "Project root '{}' is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }

    /// The output path as configured, before any timestamp is applied.
    pub fn configured_output_path(&self, cli_output: Option<&Path>) -> Result<PathBuf> {
        let path = match cli_output {
            Some(path) => expand_tilde(path),
            None => expand_tilde(Path::new(&self.output_path)),
        };
        if path.file_name().is_none() {
            return Err(AppError::InvalidArgument(format!(
                "Output path '{}' does not name a file",
                path.display()
            )));
        }
        Ok(path)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(text.as_ref()).as_ref())
}

/// `dir/name.ext` → `dir/name_YYYYmmdd_HHMMSS.ext`.
pub fn timestamped_output_path<Tz: TimeZone>(path: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!(
            "{}_{}.{}",
            stem,
            now.format(TIMESTAMP_FORMAT),
            ext.to_string_lossy()
        ),
        None => format!("{}_{}", stem, now.format(TIMESTAMP_FORMAT)),
    };
    path.with_file_name(name)
}

/// Companion log file of an output artifact.
pub fn log_path_for(output_path: &Path) -> PathBuf {
    output_path.with_extension(LOG_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn absent_keys_keep_defaults_and_null_empties_a_list() {
        let config = Config::from_yaml_str(
            "output_path: out/ctx.md\ncommon_filters: null\n",
            Path::new("c.yaml"),
        )
        .unwrap();
        assert_eq!(config.output_path, "out/ctx.md");
        assert!(config.common_filters().is_empty());
        assert_eq!(config.include_patterns(), &["**/*".to_string()]);
        assert!(config.tree_only_filters().contains(&"*.md".to_string()));
    }

    #[test]
    fn comment_only_file_means_defaults() {
        let config = Config::from_yaml_str("# nothing here\n\n", Path::new("c.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        let err = Config::from_yaml_str("output_pth: x.txt\n", Path::new("bad.yaml")).unwrap_err();
        match err {
            AppError::YamlParse { path, .. } => assert_eq!(path, PathBuf::from("bad.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_yaml_round_trips() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed = Config::from_yaml_str(&yaml, Path::new("d.yaml")).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn timestamp_goes_between_stem_and_extension() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            timestamped_output_path(Path::new("build/project_context.txt"), &now),
            PathBuf::from("build/project_context_20240309_070501.txt")
        );
        assert_eq!(
            timestamped_output_path(Path::new("ctx"), &now),
            PathBuf::from("ctx_20240309_070501")
        );
        assert_eq!(
            log_path_for(Path::new("build/project_context_20240309_070501.txt")),
            PathBuf::from("build/project_context_20240309_070501.log")
        );
    }

    #[test]
    fn project_root_prefers_cli_over_config() {
        let cli_dir = tempfile::tempdir().unwrap();
        let cfg_dir = tempfile::tempdir().unwrap();
        let config = Config {
            project_path: Some(cfg_dir.path().to_string_lossy().into_owned()),
            ..Config::default()
        };
        assert_eq!(
            config.determine_project_root(Some(cli_dir.path())).unwrap(),
            cli_dir.path().canonicalize().unwrap()
        );
        assert_eq!(
            config.determine_project_root(None).unwrap(),
            cfg_dir.path().canonicalize().unwrap()
        );
        assert!(config
            .determine_project_root(Some(&cli_dir.path().join("missing")))
            .is_err());
    }

    #[test]
    fn default_config_is_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIG_FILENAME);
        Config::write_default(&path).unwrap();
        let (config, found) = Config::load_or_default(&path).unwrap();
        assert!(found);
        assert_eq!(config, Config::default());
    }
}
