use anyhow::{Context as _, Result};
use std::path::Path;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, old: &Path, new: &Path) -> Result<()> {
    let before = read_optional(old)?;
    let after = std::fs::read_to_string(new)
        .with_context(|| format!("Could not read {}", new.display()))?;

    let comparison = reqkit::compare(before.as_deref(), &after);

    if !ctx.quiet {
        ui::kv("old", &old.display().to_string());
        ui::kv("new", &new.display().to_string());
    }
    println!("{} ({comparison})", ui::comparison_status(&comparison));
    ui::comparison_details(&comparison);
    Ok(())
}

/// Read a file, treating a missing one as absent content
fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("{} does not exist, treating as new", path.display());
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
    }
}
