//! Write a default configuration file.

use anyhow::{bail, Context as _, Result};

use super::InitArgs;
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let name = if args.json_format { "showcase.json" } else { "showcase.toml" };
    let path = ctx.cwd.join(name);

    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let content = generate_default_config(args.json_format)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ctx.output.success(&format!("Created {}", path.display()));
    ctx.output.info("Next steps:");
    ctx.output.list_item("showcase csr");
    ctx.output.list_item("showcase build");

    Ok(())
}
