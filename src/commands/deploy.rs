use anyhow::{Context as _, Result};
use reqkit::source::git::short_commit;
use reqkit::{ManifestPath, plan_all};
use std::path::Path;

use super::changed::{self, Deployment};
use crate::Context;
use crate::cli::DeployArgs;
use crate::config::PipConfig;
use crate::runner;
use crate::ui;

pub fn run(ctx: &Context, args: DeployArgs) -> Result<()> {
    let mut deployment = changed::compute(ctx, &args.revisions)?;
    warn_if_not_checked_out(&deployment);

    if args.force {
        log::info!("Forced install of all root requirements files");
        deployment.plan = plan_all(&deployment.tree);
    }
    changed::print_plan(ctx, &deployment);

    let pip = &ctx.config.pip;
    let repo_path = deployment.repo.path();

    if args.update_pip {
        let cmd = pip_args(pip, ctx.quiet, &["install", "-U", "pip"]);
        execute(pip, &cmd, args.dry_run).context("Failed to update pip")?;
    }

    let files = &deployment.plan.files;
    for (i, path) in files.iter().enumerate() {
        let target = install_target(repo_path, path);
        if !ctx.quiet {
            ui::step(i + 1, files.len(), &format!("Installing {path}"));
        }
        let cmd = pip_args(pip, ctx.quiet, &["install", "-r", &target]);
        execute(pip, &cmd, args.dry_run)
            .with_context(|| format!("Failed to install requirements from {path}"))?;
    }

    if !files.is_empty() && !args.dry_run {
        ui::success(&format!(
            "Installed {} requirements file(s) at {}",
            files.len(),
            short_commit(&deployment.to)
        ));
    }
    Ok(())
}

/// Build the pip argument list: subcommand, configured args, then extras
fn pip_args(pip: &PipConfig, quiet: bool, extra: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(extra.len() + pip.args.len() + 1);
    let (subcommand, rest) = extra.split_first().map_or((None, extra), |(s, r)| (Some(*s), r));

    if let Some(subcommand) = subcommand {
        args.push(subcommand.to_string());
    }
    if quiet {
        args.push("--quiet".to_string());
    }
    args.extend(pip.args.iter().cloned());
    args.extend(rest.iter().map(|s| (*s).to_string()));
    args
}

/// Filesystem path handed to `pip install -r`
fn install_target(repo: &Path, path: &ManifestPath) -> String {
    repo.join(path.as_str()).to_string_lossy().into_owned()
}

fn execute(pip: &PipConfig, args: &[String], dry_run: bool) -> Result<()> {
    let executable = pip.executable();
    if dry_run {
        ui::dim(&format!("[dry-run] {} {}", executable, args.join(" ")));
        return Ok(());
    }

    log::info!("Running {} {}", executable, args.join(" "));
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner::run_checked(&executable, &args)
}

/// pip installs from the working tree, which should be at the target revision
fn warn_if_not_checked_out(deployment: &Deployment) {
    match deployment.repo.rev_parse("HEAD") {
        Ok(head) if head != deployment.to => ui::warn(&format!(
            "Working tree is at {}, not {}; installing from the working tree",
            short_commit(&head),
            short_commit(&deployment.to)
        )),
        Ok(_) => {}
        Err(e) => log::debug!("Could not resolve HEAD: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_args_order() {
        let pip = PipConfig {
            args: vec!["--log=/tmp/pip.log".to_string()],
            ..PipConfig::default()
        };
        assert_eq!(
            pip_args(&pip, false, &["install", "-r", "/srv/app/requirements.txt"]),
            ["install", "--log=/tmp/pip.log", "-r", "/srv/app/requirements.txt"]
        );
        assert_eq!(
            pip_args(&PipConfig::default(), true, &["install", "-U", "pip"]),
            ["install", "--quiet", "-U", "pip"]
        );
    }

    #[test]
    fn test_install_target() {
        let target = install_target(
            Path::new("/srv/app/project"),
            &ManifestPath::new("requirements/live.txt"),
        );
        assert_eq!(target, "/srv/app/project/requirements/live.txt");
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let pip = PipConfig {
            command: "reqdeploy-no-such-pip".to_string(),
            ..PipConfig::default()
        };
        assert!(execute(&pip, &["install".to_string()], true).is_ok());
        assert!(execute(&pip, &["install".to_string()], false).is_err());
    }
}
