use super::ProjectSetup;
use crate::cli_args::TreeArgs;
use crate::output;
use anyhow::{Context, Result};

pub fn handle_tree_command(args: TreeArgs) -> Result<()> {
    let setup = ProjectSetup::resolve(&args.project)?;
    let configured_output = setup
        .config
        .configured_output_path(None)
        .context("Failed to determine output path")?;
    let context = setup.build_context(&configured_output)?;
    output::write_to_stdout(&context.tree().to_string())
}
