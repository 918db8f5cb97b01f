//! Git-backed content source using `git show <rev>:<path>`.

use crate::error::{Error, Result};
use crate::source::ContentSource;
use crate::types::ManifestPath;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A git checkout on the local host.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Path to the working tree
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`.
    ///
    /// Returns an error if `path` is not inside a git working tree.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self { path: path.into() };
        let inside = repo.run_git_checked(&["rev-parse", "--is-inside-work-tree"])?;
        if inside.trim() != "true" {
            return Err(Error::Other(format!(
                "not a git working tree: {}",
                repo.path.display()
            )));
        }
        Ok(repo)
    }

    /// Path to the working tree.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a git command in the repository and return output.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute git: {e}"),
                stderr: String::new(),
            })
    }

    /// Run a git command and check for success.
    fn run_git_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run_git(args)?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                message: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Resolve a revision (branch, tag, `HEAD~1`, ...) to a full commit hash.
    pub fn rev_parse(&self, revision: &str) -> Result<String> {
        let spec = format!("{revision}^{{commit}}");
        let output = self.run_git_checked(&["rev-parse", "--verify", "--quiet", &spec])?;
        Ok(output.trim().to_string())
    }

    /// Content of `path` at `revision`, or `None` if it does not exist there.
    pub fn show(&self, revision: &str, path: &ManifestPath) -> Result<Option<String>> {
        let object = object_spec(revision, path)?;
        let output = self.run_git(&["show", &object])?;

        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_path(&stderr) {
            log::debug!("{path} does not exist at {revision}");
            return Ok(None);
        }

        Err(Error::CommandFailed {
            message: format!("git show {object}"),
            stderr: stderr.trim().to_string(),
        })
    }

    /// A content source reading manifests at `revision`.
    pub fn at(&self, revision: impl Into<String>) -> GitSource {
        GitSource {
            repo: self.clone(),
            revision: revision.into(),
        }
    }
}

/// Build the `<rev>:<path>` object name for `git show`.
fn object_spec(revision: &str, path: &ManifestPath) -> Result<String> {
    let path = path.as_str();
    if path.starts_with('/') || path == ".." || path.starts_with("../") {
        return Err(Error::Other(format!(
            "requirements file outside the repository: {path}"
        )));
    }
    Ok(format!("{revision}:{path}"))
}

/// Whether `git show` stderr says the path is absent at that revision.
fn is_missing_path(stderr: &str) -> bool {
    stderr.contains("does not exist in")
        || stderr.contains("exists on disk, but not in")
        || stderr.contains("not in the working tree")
}

/// Manifests as they were at one git revision.
#[derive(Debug, Clone)]
pub struct GitSource {
    repo: GitRepo,
    revision: String,
}

impl GitSource {
    /// The revision this source reads from.
    pub fn revision(&self) -> &str {
        &self.revision
    }
}

impl ContentSource for GitSource {
    fn get_content(&self, path: &ManifestPath) -> Result<String> {
        self.repo
            .show(&self.revision, path)?
            .ok_or_else(|| Error::NotFound(format!("{path}@{}", short_commit(&self.revision))))
    }
}

/// Abbreviate a commit hash to 7 characters; other revisions pass through.
pub fn short_commit(revision: &str) -> &str {
    let is_hash = revision.len() >= 7 && revision.chars().all(|c| c.is_ascii_hexdigit());
    if is_hash { &revision[..7] } else { revision }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("470a5d91fab350aa7d4aa0f952e1f0eb16ea9d5c"), "470a5d9");
        assert_eq!(short_commit("HEAD~1"), "HEAD~1");
        assert_eq!(short_commit("main"), "main");
    }

    #[test]
    fn test_object_spec_rejects_outside_paths() {
        assert_eq!(
            object_spec("HEAD", &ManifestPath::new("reqs/base.txt")).unwrap(),
            "HEAD:reqs/base.txt"
        );
        assert!(object_spec("HEAD", &ManifestPath::new("/etc/req.txt")).is_err());
        assert!(object_spec("HEAD", &ManifestPath::new("../req.txt")).is_err());
    }

    #[test]
    fn test_is_missing_path() {
        assert!(is_missing_path(
            "fatal: path 'live.txt' does not exist in 'HEAD'"
        ));
        assert!(is_missing_path(
            "fatal: path 'live.txt' exists on disk, but not in 'abc1234'"
        ));
        assert!(!is_missing_path("fatal: invalid object name 'nope'."));
    }

    #[test]
    fn test_show_across_revisions() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        git(dir, &["init", "-q"]);
        std::fs::write(dir.join("requirements.txt"), "Django==1.8\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "first"]);

        let repo = GitRepo::open(dir).unwrap();
        let first = repo.rev_parse("HEAD").unwrap();
        assert_eq!(first.len(), 40);

        std::fs::write(dir.join("requirements.txt"), "Django==1.9\n").unwrap();
        std::fs::write(dir.join("live.txt"), "-r requirements.txt\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "second"]);

        let old = repo.at(first.clone());
        let new = repo.at("HEAD");
        let path = ManifestPath::new("requirements.txt");
        assert_eq!(old.get_content(&path).unwrap(), "Django==1.8\n");
        assert_eq!(new.get_content(&path).unwrap(), "Django==1.9\n");

        let live = ManifestPath::new("live.txt");
        assert!(matches!(old.get_content(&live), Err(Error::NotFound(_))));
        assert_eq!(old.try_get_content(&live).unwrap(), None);
        assert!(repo.rev_parse("no-such-branch").is_err());
    }
}
