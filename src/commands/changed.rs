use anyhow::{Context as _, Result};
use reqkit::source::git::{GitRepo, short_commit};
use reqkit::{ReinstallPlan, RequirementTree};
use serde::Serialize;

use super::{configured_roots, open_repository};
use crate::Context;
use crate::cli::{ChangedArgs, RevisionArgs};
use crate::ui;

/// A reinstall plan together with where it was computed
pub struct Deployment {
    pub repo: GitRepo,
    pub from: String,
    pub to: String,
    pub tree: RequirementTree,
    pub plan: ReinstallPlan,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(flatten)]
    plan: &'a ReinstallPlan,
}

/// Resolve both revisions, build the tree at the new one and compare
pub fn compute(ctx: &Context, revisions: &RevisionArgs) -> Result<Deployment> {
    let repo = open_repository(ctx)?;
    let from = repo
        .rev_parse(&revisions.from)
        .with_context(|| format!("Unknown revision: {}", revisions.from))?;
    let to = repo
        .rev_parse(&revisions.to)
        .with_context(|| format!("Unknown revision: {}", revisions.to))?;
    log::info!(
        "Comparing {} -> {}",
        short_commit(&from),
        short_commit(&to)
    );

    let old = repo.at(from.clone());
    let new = repo.at(to.clone());
    let tree = RequirementTree::build(configured_roots(ctx), &new)
        .with_context(|| format!("Failed to build requirements tree at {}", short_commit(&to)))?;
    let plan = reqkit::plan(&tree, &old, &new)?;

    Ok(Deployment {
        repo,
        from,
        to,
        tree,
        plan,
    })
}

pub fn run(ctx: &Context, args: ChangedArgs) -> Result<()> {
    let deployment = compute(ctx, &args.revisions)?;

    if args.json {
        let output = JsonOutput {
            from: &deployment.from,
            to: &deployment.to,
            plan: &deployment.plan,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_plan(ctx, &deployment);
    Ok(())
}

/// Print the per-manifest comparison and the resulting install list
pub fn print_plan(ctx: &Context, deployment: &Deployment) {
    let Deployment {
        from, to, plan, tree, ..
    } = deployment;

    if !ctx.quiet {
        ui::header(&format!(
            "Requirements {} -> {}",
            short_commit(from),
            short_commit(to)
        ));
        for (path, comparison) in &plan.comparisons {
            println!("  {} {}", ui::comparison_status(comparison), path);
            if ctx.verbose > 0 {
                ui::comparison_details(comparison);
            }
        }
        println!();
    }

    if plan.is_empty() {
        ui::success("Requirements unchanged, nothing to install");
        return;
    }

    ui::info(&format!("{} file(s) to install:", plan.files.len()));
    for path in &plan.files {
        if tree.is_root(path) {
            ui::dim(&format!("{path} (root)"));
        } else {
            ui::dim(path.as_str());
        }
    }
}
