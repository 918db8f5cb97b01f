//! Requirement include graph.
//!
//! Starting from one or more root manifests, every `-r` include is followed
//! depth-first and recorded as a parent → children edge. Each manifest is read
//! and parsed at most once. The inverse child → parents map is derived after
//! expansion, leaving out edges that point at a root: roots are always
//! installed on their own and are never covered by another manifest.

use crate::error::Result;
use crate::requirements::parser;
use crate::source::ContentSource;
use crate::types::ManifestPath;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Include graph of a set of root manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementTree {
    /// Root manifests in priority order
    roots: Vec<ManifestPath>,
    /// Forward edges; the `None` key holds the roots
    tree: BTreeMap<Option<ManifestPath>, Vec<ManifestPath>>,
    /// Manifests in the order they were expanded
    expanded: Vec<ManifestPath>,
    /// Inverse edges, excluding edges into roots
    parents: BTreeMap<ManifestPath, Vec<ManifestPath>>,
}

/// Serializable view of a [`RequirementTree`].
#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot<'a> {
    /// Root manifests in priority order
    pub roots: &'a [ManifestPath],
    /// Direct includes of every expanded manifest
    pub includes: BTreeMap<&'a ManifestPath, &'a [ManifestPath]>,
    /// Including manifests of every reachable manifest
    pub parents: &'a BTreeMap<ManifestPath, Vec<ManifestPath>>,
}

impl RequirementTree {
    /// Build the graph by reading manifests from `source`.
    ///
    /// Any read or parse failure aborts the build: an incomplete graph would
    /// make the change resolver skip or duplicate installs.
    pub fn build<I, P>(paths: I, source: &dyn ContentSource) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ManifestPath>,
    {
        let mut roots: Vec<ManifestPath> = Vec::new();
        for path in paths {
            push_unique(&mut roots, path.into());
        }

        let mut builder = Builder {
            source,
            tree: BTreeMap::new(),
            expanded: Vec::new(),
        };
        builder.tree.insert(None, roots.clone());
        for root in &roots {
            builder.expand(root)?;
        }

        let Builder { tree, expanded, .. } = builder;
        let parents = invert(&tree, &expanded, &roots);
        log::debug!(
            "Built requirement tree: {} roots, {} manifests",
            roots.len(),
            expanded.len()
        );

        Ok(Self {
            roots,
            tree,
            expanded,
            parents,
        })
    }

    /// Root manifests in priority order.
    pub fn roots(&self) -> &[ManifestPath] {
        &self.roots
    }

    /// Position of `path` among the roots.
    pub fn root_index(&self, path: &ManifestPath) -> Option<usize> {
        self.roots.iter().position(|r| r == path)
    }

    /// Whether `path` is one of the roots.
    pub fn is_root(&self, path: &ManifestPath) -> bool {
        self.root_index(path).is_some()
    }

    /// Forward edges. The `None` key lists the roots.
    pub fn tree(&self) -> &BTreeMap<Option<ManifestPath>, Vec<ManifestPath>> {
        &self.tree
    }

    /// Child → parents edges, without edges into roots.
    pub fn parents(&self) -> &BTreeMap<ManifestPath, Vec<ManifestPath>> {
        &self.parents
    }

    /// Direct includes of `path`, in declared order.
    pub fn children(&self, path: &ManifestPath) -> &[ManifestPath] {
        self.tree
            .get(&Some(path.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Manifests that include `path`.
    pub fn parents_of(&self, path: &ManifestPath) -> &[ManifestPath] {
        self.parents.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Manifests in the order they were read.
    pub fn manifests(&self) -> &[ManifestPath] {
        &self.expanded
    }

    /// Every manifest reachable from the roots, roots included.
    pub fn all_files(&self) -> BTreeSet<ManifestPath> {
        self.tree.values().flatten().cloned().collect()
    }

    /// Whether `path` is reachable from the roots.
    pub fn contains(&self, path: &ManifestPath) -> bool {
        self.parents.contains_key(path)
    }

    /// Serializable view of the graph.
    pub fn snapshot(&self) -> TreeSnapshot<'_> {
        TreeSnapshot {
            roots: &self.roots,
            includes: self
                .tree
                .iter()
                .filter_map(|(k, v)| k.as_ref().map(|k| (k, v.as_slice())))
                .collect(),
            parents: &self.parents,
        }
    }
}

struct Builder<'a> {
    source: &'a dyn ContentSource,
    tree: BTreeMap<Option<ManifestPath>, Vec<ManifestPath>>,
    expanded: Vec<ManifestPath>,
}

impl Builder<'_> {
    fn expand(&mut self, path: &ManifestPath) -> Result<()> {
        let key = Some(path.clone());
        if self.tree.contains_key(&key) {
            return Ok(());
        }

        let content = self.source.get_content(path)?;
        let includes = parser::includes(&content).map_err(|e| e.in_manifest(path.as_str()))?;

        let mut children = Vec::with_capacity(includes.len());
        for include in &includes {
            push_unique(&mut children, path.resolve(include));
        }
        log::debug!("{path} includes {children:?}");

        self.tree.insert(key, children.clone());
        self.expanded.push(path.clone());

        for child in &children {
            self.expand(child)?;
        }
        Ok(())
    }
}

fn push_unique(list: &mut Vec<ManifestPath>, path: ManifestPath) {
    if !list.contains(&path) {
        list.push(path);
    }
}

/// Derive child → parents edges, skipping edges into roots.
fn invert(
    tree: &BTreeMap<Option<ManifestPath>, Vec<ManifestPath>>,
    expanded: &[ManifestPath],
    roots: &[ManifestPath],
) -> BTreeMap<ManifestPath, Vec<ManifestPath>> {
    let mut parents: BTreeMap<ManifestPath, Vec<ManifestPath>> = BTreeMap::new();

    for root in roots {
        parents.entry(root.clone()).or_default();
    }

    for parent in expanded {
        let children = tree.get(&Some(parent.clone())).map(Vec::as_slice).unwrap_or(&[]);
        for child in children {
            let entry = parents.entry(child.clone()).or_default();
            if !roots.contains(child) && !entry.contains(parent) {
                entry.push(parent.clone());
            }
        }
    }

    parents
}
