use anyhow::{Context as _, Result};
use std::path::Path;

use crate::Context;

pub fn run(_ctx: &Context, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Could not read {}", file.display()))?;

    for token in reqkit::iter_requirements(&content) {
        let token = token.map_err(|e| e.in_manifest(&file.to_string_lossy()))?;
        println!("{token}");
    }
    Ok(())
}
