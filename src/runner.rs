use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Stdio};

/// Run a command and inherit stdio (shows output in real-time)
pub fn run(cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    log::debug!("Running: {} {}", cmd, args.join(" "));
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))
}

/// Run a command and fail unless it exits successfully
pub fn run_checked(cmd: &str, args: &[&str]) -> Result<()> {
    let status = run(cmd, args)?;
    if !status.success() {
        anyhow::bail!("Command failed ({}): {} {}", status, cmd, args.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_checked() {
        assert!(run_checked("true", &[]).is_ok());
        assert!(run_checked("false", &[]).is_err());
        assert!(run_checked("reqdeploy-no-such-command", &[]).is_err());
    }
}
