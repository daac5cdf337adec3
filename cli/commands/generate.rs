use super::ProjectSetup;
use crate::cli_args::GenerateArgs;
use crate::logging;
use crate::output::{self, print_summary};
use aicc_core::{
    Aggregator, Config, LogReporter, NameFilter, ReductionOptions, log_path_for,
    timestamped_output_path,
};
use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let setup = ProjectSetup::resolve(&args.project)?;
    let configured_output = setup
        .config
        .configured_output_path(args.output.as_deref())
        .context("Failed to determine output path")?;
    let output_path = if args.no_timestamp {
        configured_output.clone()
    } else {
        timestamped_output_path(&configured_output, &Local::now())
    };
    let log_path = log_path_for(&output_path);
    logging::attach_log_file(&log_path)?;

    log::info!("Configuration file: {}", setup.config_path.display());
    log::info!("Project root: {}", setup.root.display());
    log::info!("Output file: {}", output_path.display());
    if args.dry_run {
        log::info!("Dry run: the output file will not be written.");
    }

    if !setup.config_found && !args.dry_run {
        Config::write_default(&setup.config_path).with_context(|| {
            format!(
                "Failed to write default config to {}",
                setup.config_path.display()
            )
        })?;
        log::warn!(
            "No configuration found; wrote the defaults to {}",
            setup.config_path.display()
        );
    }

    let context = setup.build_context(&configured_output)?;

    let reporter = LogReporter;
    let options = ReductionOptions {
        strip_comments: args.reduction.strip_comments,
        headers_only: args.reduction.headers_only,
    };
    let keep_full = NameFilter::new(setup.config.full_body_filters(), &reporter);
    log::info!("Assembling the output...");
    let artifact = Aggregator::new(&setup.root, options, keep_full, &reporter)
        .assemble(context.tree(), context.files());
    let text = artifact.render(&Local::now());

    if !args.dry_run {
        output::write_to_file(&output_path, &text)?;
        log::info!("Output written: {}", output_path.display());
    }

    if !quiet {
        println!();
        if args.dry_run {
            println!("{}", "Dry run complete.".green().bold());
            print_summary("Would write:", &display_absolute(&output_path));
        } else {
            println!("{}", "Done.".green().bold());
            print_summary("Output:", &display_absolute(&output_path));
        }
        print_summary("Log:", &display_absolute(&log_path));
        print_summary("Files:", &artifact.included().len().to_string());
        print_summary("Statistics:", &artifact.stats().to_string());
        if !artifact.skipped().is_empty() {
            println!(
                "{}",
                format!("{} unreadable file(s) skipped, see the log.", artifact.skipped().len())
                    .yellow()
            );
        }
    }
    Ok(())
}

fn display_absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .display()
        .to_string()
}
