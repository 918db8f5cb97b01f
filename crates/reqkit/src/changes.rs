//! Change-set resolution over a [`RequirementTree`].
//!
//! Installing a manifest with `pip install -r` also installs everything it
//! includes, so a changed manifest whose ancestor also changed is redundant.
//! The survivors are ordered by the priority of the root they hang off.

use crate::tree::RequirementTree;
use crate::types::ManifestPath;
use std::collections::{BTreeSet, HashSet};

impl RequirementTree {
    /// Minimal, ordered set of manifests to reinstall.
    ///
    /// A changed manifest is dropped when any ancestor is also changed. Roots
    /// are never dropped. Paths outside the graph are ignored. The result is
    /// sorted by [`get_order`](Self::get_order), then by path.
    pub fn get_changed(&self, all_changed_files: &BTreeSet<ManifestPath>) -> Vec<ManifestPath> {
        let mut changed: Vec<ManifestPath> = all_changed_files
            .iter()
            .filter(|path| self.contains(path))
            .filter(|path| self.is_root(path) || !self.is_parent_changed(path, all_changed_files))
            .cloned()
            .collect();

        changed.sort_by_cached_key(|path| (self.get_order(path), path.clone()));
        log::debug!(
            "{} of {} changed manifests need install: {changed:?}",
            changed.len(),
            all_changed_files.len()
        );
        changed
    }

    /// Whether any ancestor of `path` is in `changed`.
    ///
    /// Every changed ancestor covers `path`, including one reached through a
    /// cycle between non-root manifests. Changed members of such a cycle
    /// therefore cover each other; only a changed root breaks the tie.
    pub fn is_parent_changed(&self, path: &ManifestPath, changed: &BTreeSet<ManifestPath>) -> bool {
        let mut visited = HashSet::new();
        self.ancestor_changed(path, changed, &mut visited)
    }

    fn ancestor_changed<'a>(
        &'a self,
        path: &ManifestPath,
        changed: &BTreeSet<ManifestPath>,
        visited: &mut HashSet<&'a ManifestPath>,
    ) -> bool {
        for parent in self.parents_of(path) {
            if !visited.insert(parent) {
                continue;
            }
            if changed.contains(parent) || self.ancestor_changed(parent, changed, visited) {
                return true;
            }
        }
        false
    }

    /// Install priority of `path`: its root index if it is a root, otherwise
    /// the smallest priority among its parents.
    ///
    /// Manifests with no route back to a root sort last (`usize::MAX`).
    pub fn get_order(&self, path: &ManifestPath) -> usize {
        let mut visited = HashSet::new();
        self.order_of(path, &mut visited)
    }

    fn order_of<'a>(&'a self, path: &ManifestPath, visited: &mut HashSet<&'a ManifestPath>) -> usize {
        if let Some(index) = self.root_index(path) {
            return index;
        }

        let mut best = usize::MAX;
        for parent in self.parents_of(path) {
            if visited.insert(parent) {
                best = best.min(self.order_of(parent, visited));
            }
        }
        best
    }
}
