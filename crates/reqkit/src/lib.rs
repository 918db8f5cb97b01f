//! # reqkit
//!
//! Pure Rust library for deciding which pip requirements files need to be
//! reinstalled after a code update.
//!
//! This crate provides functionality for:
//! - Parsing requirements files into normalized, comparable tokens
//! - Building the `-r` include graph of a set of root manifests
//! - Comparing manifests between two revisions
//! - Reducing a set of changed manifests to the minimal ordered install list
//!
//! ## Example
//!
//! ```no_run
//! use reqkit::{RequirementTree, source::git::GitRepo};
//!
//! let repo = GitRepo::open("/srv/app/project").expect("not a git checkout");
//! let old = repo.at("HEAD~1");
//! let new = repo.at("HEAD");
//!
//! let tree = RequirementTree::build(["requirements/live.txt"], &new).expect("Failed to build");
//! let plan = reqkit::plan(&tree, &old, &new).expect("Failed to compare");
//! for path in &plan.files {
//!     println!("pip install -r {path}");
//! }
//! ```
//!
//! ## Normalization
//!
//! Two manifests are equivalent when they yield the same set of tokens from
//! [`iter_requirements`]. VCS requirements reduce to `name==ref`, so moving a
//! pinned repository to another URL is not a change.
//!
//! ```
//! let tokens: Vec<String> = reqkit::iter_requirements(
//!     "-e git+https://github.com/fabric/fabric@470a5d9#egg=Fabric\nDjango  ==1.8",
//! )
//! .collect::<reqkit::Result<_>>()
//! .unwrap();
//! assert_eq!(tokens, ["Fabric==470a5d9", "Django ==1.8"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod changes;
pub mod compare;
pub mod error;
pub mod plan;
pub mod requirements;
pub mod source;
pub mod tree;
pub mod types;

pub use compare::{Comparison, compare};
pub use error::{Error, ErrorCategory, Result};
pub use plan::{ReinstallPlan, plan, plan_all};
pub use requirements::{includes, iter_requirements, parse, requirement_set};
pub use source::{ContentSource, DirSource, MemorySource};
pub use tree::{RequirementTree, TreeSnapshot};
pub use types::{ManifestPath, Requirement, RequirementLine, VcsRequirement};
