// Inspection commands
pub mod compare;
pub mod normalize;
pub mod tree;

// Revision commands
pub mod changed;
pub mod deploy;

use anyhow::{Context as _, Result};
use reqkit::ManifestPath;
use reqkit::source::git::GitRepo;

use crate::Context;

/// Root manifests configured for the deployment
pub fn configured_roots(ctx: &Context) -> Vec<ManifestPath> {
    ctx.config
        .requirements
        .iter()
        .map(ManifestPath::new)
        .collect()
}

/// Open the configured git checkout
pub fn open_repository(ctx: &Context) -> Result<GitRepo> {
    let path = ctx.config.repository_path();
    GitRepo::open(&path)
        .with_context(|| format!("Could not open repository at {}", path.display()))
}
