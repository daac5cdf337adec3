use super::ProjectSetup;
use crate::cli_args::DebugArgs;
use crate::output::{self, FileRow, print_files_table, print_pattern_list, print_summary};
use aicc_core::{ContentStats, FilterSet, read_lossy};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DebugReport<'a> {
    config_path: String,
    config_found: bool,
    project_root: String,
    use_gitignore: bool,
    follow_links: bool,
    filters: &'a FilterSet,
    files: Vec<FileRow>,
    tree: &'a [String],
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let setup = ProjectSetup::resolve(&args.project)?;
    let configured_output = setup
        .config
        .configured_output_path(None)
        .context("Failed to determine output path")?;
    let context = setup.build_context(&configured_output)?;

    let files: Vec<FileRow> = context
        .files()
        .iter()
        .filter_map(|path| match read_lossy(&path.to_absolute(context.root())) {
            Ok(content) => Some(FileRow::new(path.to_string(), ContentStats::measure(&content))),
            Err(e) => {
                log::warn!("Unable to read {}: {}", path, e);
                None
            }
        })
        .collect();

    let report = DebugReport {
        config_path: setup.config_path.display().to_string(),
        config_found: setup.config_found,
        project_root: setup.root.display().to_string(),
        use_gitignore: setup.use_gitignore,
        follow_links: setup.follow_links,
        filters: context.filter_set(),
        files,
        tree: context.tree().lines(),
    };

    if args.format.is_some() {
        return output::print_json(&report);
    }

    println!();
    println!("{}", " Effective Settings ".green().bold().underline());
    let config_note = if report.config_found {
        report.config_path.clone()
    } else {
        format!("{} (not found, defaults)", report.config_path)
    };
    print_summary("Config:", &config_note);
    print_summary("Project root:", &report.project_root);
    print_summary("Gitignore:", &report.use_gitignore.to_string());
    print_summary("Follow links:", &report.follow_links.to_string());
    println!();
    print_pattern_list("Include Patterns", &report.filters.include);
    print_pattern_list("Body Excludes", &report.filters.body_exclude);
    print_pattern_list("Tree Excludes", &report.filters.tree_exclude);
    print_files_table(&report.files);
    println!();
    println!(
        "{}",
        format!("{} tree entries visible.", context.visible().len()).dimmed()
    );
    Ok(())
}
