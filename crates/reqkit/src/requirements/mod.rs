//! Requirements file parsing and normalization.
//!
//! This module reads pip requirement files into logical lines and produces the
//! normalized tokens used to compare two versions of a manifest.

pub mod parser;
pub mod vcs;

pub use parser::{includes, iter_requirements, parse, parse_lines, requirement_set};
