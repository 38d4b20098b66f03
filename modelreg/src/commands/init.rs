use anyhow::{Context, Result, bail};
use clap::Args;

use crate::context::{ModelregConfig, ProjectContext};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    heading: "Setup",
    lines: &[
        "modelreg init             # Write .modelreg/config.toml with defaults",
        "modelreg init --force     # Overwrite an existing config",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    init_project(&ctx, args.force)?;

    output.success(&format!("Wrote {}", ctx.display_path(&ctx.config_path)));
    let settings = ModelregConfig::default().registry;
    output.key_value("source_dir", &settings.source_dir);
    output.key_value("output_file", &settings.output_file);
    output.info("Run 'modelreg generate' to build the registry.");
    Ok(())
}

fn init_project(ctx: &ProjectContext, force: bool) -> Result<()> {
    if ctx.is_initialized() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            ctx.display_path(&ctx.config_path)
        );
    }

    std::fs::create_dir_all(&ctx.modelreg_dir)
        .with_context(|| format!("Failed to create {}", ctx.modelreg_dir.display()))?;

    let content = toml::to_string_pretty(&ModelregConfig::default()).context("Failed to serialize config")?;
    std::fs::write(&ctx.config_path, content)
        .with_context(|| format!("Failed to write {}", ctx.config_path.display()))?;

    log::debug!("initialized {}", ctx.config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_default_config() {
        let temp = TempDir::new().unwrap();
        let ctx = ProjectContext::from_root(temp.path().to_path_buf()).unwrap();

        init_project(&ctx, false).unwrap();

        let reloaded = ProjectContext::from_root(temp.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config, Some(ModelregConfig::default()));
        assert!(init_project(&reloaded, false).is_err());
        assert!(init_project(&reloaded, true).is_ok());
    }
}
