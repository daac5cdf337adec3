use crate::cli_args::ConfigArgs;
use crate::output;
use aicc_core::{AppError, Config};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    if !args.save {
        let yaml = Config::default()
            .to_yaml()
            .context("Failed to serialize default config")?;
        return output::write_to_stdout(&yaml);
    }

    let path = Config::resolve_config_path(args.config.as_deref());
    if path.exists() {
        return Err(AppError::InvalidArgument(format!(
            "'{}' already exists; refusing to overwrite it",
            path.display()
        ))
        .into());
    }
    Config::write_default(&path)
        .with_context(|| format!("Failed to save default config to {}", path.display()))?;
    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✓".green(),
            path.display().to_string().blue()
        );
    }
    Ok(())
}
