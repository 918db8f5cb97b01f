use anyhow::{Context as _, Result};
use colored::Colorize;
use reqkit::source::DirSource;
use reqkit::{ContentSource, ManifestPath, RequirementTree};
use std::collections::HashSet;

use super::{configured_roots, open_repository};
use crate::Context;
use crate::cli::TreeArgs;
use crate::ui;

pub fn run(ctx: &Context, args: TreeArgs) -> Result<()> {
    let roots: Vec<ManifestPath> = if args.roots.is_empty() {
        configured_roots(ctx)
    } else {
        args.roots.iter().map(ManifestPath::new).collect()
    };

    let source: Box<dyn ContentSource> = match &args.rev {
        Some(rev) => Box::new(open_repository(ctx)?.at(rev.clone())),
        None => Box::new(DirSource::new(ctx.config.repository_path())),
    };

    let tree = RequirementTree::build(roots, &*source)
        .context("Failed to build requirements tree")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree.snapshot())?);
        return Ok(());
    }

    if !ctx.quiet {
        let title = match &args.rev {
            Some(rev) => format!("Requirements tree at {rev}"),
            None => "Requirements tree".to_string(),
        };
        ui::header(&title);
    }

    let mut printed = HashSet::new();
    for root in tree.roots() {
        print_node(&tree, root, 0, &mut printed, &mut Vec::new());
    }

    if !ctx.quiet {
        println!();
        ui::kv("manifests", &tree.all_files().len().to_string());
    }
    Ok(())
}

/// Print a manifest and its includes, expanding each manifest only once
fn print_node<'a>(
    tree: &'a RequirementTree,
    path: &'a ManifestPath,
    depth: usize,
    printed: &mut HashSet<&'a ManifestPath>,
    stack: &mut Vec<&'a ManifestPath>,
) {
    let indent = "  ".repeat(depth);

    if stack.contains(&path) {
        println!("{indent}{} {}", path.as_str().yellow(), "(cycle)".dimmed());
        return;
    }
    if !printed.insert(path) {
        println!("{indent}{} {}", path.as_str(), "(see above)".dimmed());
        return;
    }

    let label = if depth == 0 {
        path.as_str().bold().to_string()
    } else {
        path.to_string()
    };
    println!("{indent}{label}");

    stack.push(path);
    for child in tree.children(path) {
        print_node(tree, child, depth + 1, printed, stack);
    }
    stack.pop();
}
