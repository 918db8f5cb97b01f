//! Reinstall planning between two revisions.

use crate::compare::{Comparison, compare};
use crate::error::Result;
use crate::source::ContentSource;
use crate::tree::RequirementTree;
use crate::types::ManifestPath;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The manifests to hand to `pip install -r`, in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReinstallPlan {
    /// Manifests to install, in order
    pub files: Vec<ManifestPath>,
    /// Per-manifest comparison results (empty for a forced plan)
    pub comparisons: BTreeMap<ManifestPath, Comparison>,
}

impl ReinstallPlan {
    /// Whether nothing needs to be installed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Manifests whose comparison reported a change, including those covered
    /// by a changed ancestor.
    pub fn changed(&self) -> impl Iterator<Item = (&ManifestPath, &Comparison)> {
        self.comparisons.iter().filter(|(_, c)| c.is_changed())
    }
}

/// Compare every manifest of `tree` between `old` and `new` and resolve the
/// minimal ordered set to reinstall.
///
/// `tree` should be built from the new revision. Manifests missing from the
/// old revision count as changed.
pub fn plan(
    tree: &RequirementTree,
    old: &dyn ContentSource,
    new: &dyn ContentSource,
) -> Result<ReinstallPlan> {
    let mut comparisons = BTreeMap::new();
    let mut changed = BTreeSet::new();

    for path in tree.all_files() {
        let before = old.try_get_content(&path)?;
        let after = new.get_content(&path)?;
        let comparison = compare(before.as_deref(), &after);
        log::debug!("{path}: {comparison}");

        if comparison.is_changed() {
            changed.insert(path.clone());
        }
        comparisons.insert(path, comparison);
    }

    let files = tree.get_changed(&changed);
    log::info!(
        "{} manifest(s) changed, {} to install",
        changed.len(),
        files.len()
    );
    Ok(ReinstallPlan { files, comparisons })
}

/// Reinstall every root in declared order, ignoring what changed.
pub fn plan_all(tree: &RequirementTree) -> ReinstallPlan {
    ReinstallPlan {
        files: tree.roots().to_vec(),
        comparisons: BTreeMap::new(),
    }
}
