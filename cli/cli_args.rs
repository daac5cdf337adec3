use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectOpts {
    #[arg(
        short,
        long,
        help = "Path to the YAML configuration file (default: ./aicc.yaml).",
        value_name = "CONFIG_FILE",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Project directory to scan (overrides `project_path` in the config).",
        value_name = "PATH",
        help_heading = "Project Setup"
    )]
    pub project: Option<PathBuf>,

    #[arg(
        long,
        help = "Append the project's .gitignore rules to the exclude lists.",
        help_heading = "Filtering"
    )]
    pub use_gitignore: bool,

    #[arg(
        long,
        help = "Descend into symlinked directories (cycles are detected and skipped).",
        help_heading = "Filtering"
    )]
    pub follow_links: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReductionOpts {
    #[arg(
        long,
        help = "Remove comments (and Python docstrings) from file contents.",
        help_heading = "Content Reduction"
    )]
    pub strip_comments: bool,

    #[arg(
        long,
        help = "Keep only function/class signatures where supported (Python).",
        help_heading = "Content Reduction"
    )]
    pub headers_only: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Aggregate a project's files into one text file for AI models.",
    long_about = "aicc walks a project, selects files with gitignore-style include/exclude \npatterns, renders a directory tree and concatenates the selected files \n(optionally stripped of comments or reduced to signatures) into one artifact.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  aicc generate\n  aicc g -p ../service --headers-only --no-timestamp\n  aicc tree --use-gitignore\n  aicc debug -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        about = "Aggregate the project into the output file."
    )]
    Generate(GenerateArgs),

    #[command(visible_alias = "t", about = "Print the project tree.")]
    Tree(TreeArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective filters and the planned file list."
    )]
    Debug(DebugArgs),

    #[command(about = "Show or save the default configuration file.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,

    #[clap(flatten)]
    pub reduction: ReductionOpts,

    #[arg(
        short,
        long,
        help = "Output file (overrides `output_path` in the config).",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Do not append a _YYYYmmdd_HHMMSS suffix to the output file name.",
        help_heading = "Output"
    )]
    pub no_timestamp: bool,

    #[arg(
        long,
        help = "Compute everything but only write the log file.",
        help_heading = "Output"
    )]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,

    #[arg(
        short = 'f',
        long,
        help = "Print as structured data instead of tables.",
        value_name = "FORMAT",
        value_parser = ["json"],
        help_heading = "Output Formatting"
    )]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short,
        long,
        help = "Path to write when saving (default: ./aicc.yaml).",
        value_name = "CONFIG_FILE"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Write the default configuration instead of printing it. Never overwrites."
    )]
    pub save: bool,
}
