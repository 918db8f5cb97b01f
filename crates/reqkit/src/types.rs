//! Core types for requirement manifests.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Path of a requirements file, relative to the repository root.
///
/// Paths are canonicalized lexically on construction so that `./c.txt`,
/// `c.txt` and `sub/../c.txt` name the same graph node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestPath(String);

impl ManifestPath {
    /// Create a canonical manifest path.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(canonicalize(path.as_ref()))
    }

    /// Resolve an include directive relative to the directory of this manifest.
    pub fn resolve(&self, include: &str) -> Self {
        if include.starts_with('/') {
            return Self::new(include);
        }
        match self.parent() {
            Some(dir) => Self::new(format!("{dir}/{include}")),
            None => Self::new(include),
        }
    }

    /// Directory part of the path, if any.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| {
            if idx == 0 { "/" } else { &self.0[..idx] }
        })
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lexically normalize a slash-separated path.
fn canonicalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `/..` is `/`
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

impl fmt::Display for ManifestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ManifestPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ManifestPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for ManifestPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ManifestPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ManifestPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ManifestPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A dependency pinned to a version-control checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRequirement {
    /// Distribution name from the `#egg=` fragment
    pub name: String,
    /// Commit, tag or branch after `@`
    pub reference: String,
    /// Full URL as written
    pub url: String,
    /// Whether it was declared with `-e`/`--editable`
    pub editable: bool,
}

impl VcsRequirement {
    /// The comparable `name==ref` form.
    pub fn comparable(&self) -> String {
        format!("{}=={}", self.name, self.reference)
    }
}

/// A concrete requirement found on a manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Requirement {
    /// Registry package, e.g. `Django>=1.8,<2`
    Package {
        /// Distribution name
        name: String,
        /// Extras, version specifier and markers following the name
        specifier: String,
    },
    /// Version-control checkout with an `@ref#egg=name` suffix
    Vcs(VcsRequirement),
    /// Local path, archive URL or editable directory
    Direct {
        /// Target as written
        target: String,
    },
}

impl Requirement {
    /// Distribution name of the requirement, when it can be known without
    /// building it.
    pub fn name(&self) -> Option<&str> {
        match self {
            Requirement::Package { name, .. } => Some(name),
            Requirement::Vcs(vcs) => Some(&vcs.name),
            Requirement::Direct { .. } => None,
        }
    }
}

/// Options recognized on a requirements line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOptions {
    /// `-r`/`--requirement` includes, in declared order
    pub requirements: Vec<String>,
    /// `-c`/`--constraint` files (rejected by the parser, kept for diagnostics)
    pub constraints: Vec<String>,
    /// `-e`/`--editable` target
    pub editable: Option<String>,
    /// Any other recognized option, with its value if it takes one
    pub other: Vec<(String, Option<String>)>,
}

impl LineOptions {
    /// Whether no option was set.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
            && self.constraints.is_empty()
            && self.editable.is_none()
            && self.other.is_empty()
    }
}

/// One logical line of a requirements file after continuation joining and
/// comment stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementLine {
    /// Line number of the first physical line (1-indexed)
    pub line_number: usize,
    /// Logical line text, comment stripped and whitespace collapsed
    pub raw: String,
    /// Positional arguments joined by a single space
    pub args: String,
    /// Parsed options
    pub options: LineOptions,
    /// Concrete requirement, if the line declares one
    pub requirement: Option<Requirement>,
}

impl RequirementLine {
    /// Whether this line includes another manifest.
    pub fn is_include(&self) -> bool {
        !self.options.requirements.is_empty()
    }

    /// Included manifest paths, as written.
    pub fn includes(&self) -> &[String] {
        &self.options.requirements
    }

    /// Form used when comparing two versions of a manifest.
    ///
    /// VCS requirements become `name==ref`; everything else is the raw line.
    pub fn comparable(&self) -> String {
        match &self.requirement {
            Some(Requirement::Vcs(vcs)) => vcs.comparable(),
            _ => self.raw.clone(),
        }
    }
}
