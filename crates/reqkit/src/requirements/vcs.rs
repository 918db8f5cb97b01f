//! Version-control requirement detection and rewriting.
//!
//! ```text
//! -e git+ssh://git@github.com/org/repo.git@470a5d9#egg=Fabric
//! hg+https://hg.example.com/lib@v1.2#egg=lib
//! ```
//!
//! Both forms compare as `<name>==<ref>` so that moving a repository to a new
//! host or protocol does not register as a dependency change.

use crate::types::VcsRequirement;
use regex::Regex;
use std::sync::LazyLock;

/// Matches the start of a VCS requirement, with optional editable flag.
static VCS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:-e|--editable)(?:\s+|=))?(?:git|hg|svn|bzr)(?:\+|://)")
        .expect("valid VCS prefix regex")
});

/// Matches a full extractable VCS requirement, with an optional
/// environment marker after `;`.
static VCS_REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<editable>(?:-e|--editable)(?:\s+|=))?(?P<url>(?:git|hg|svn|bzr)(?:\+|://)\S*@(?P<ref>[^@#\s]+)#egg=(?P<name>[^&;\s]+)[^;\s]*)(?:\s*;.*)?$",
    )
    .expect("valid VCS requirement regex")
});

/// Whether a line looks like a VCS requirement.
pub fn is_vcs(line: &str) -> bool {
    VCS_PREFIX.is_match(line.trim())
}

/// Extract the name and ref of a VCS requirement.
///
/// Returns `None` when the line is not a VCS requirement or lacks the
/// `@<ref>#egg=<name>` suffix.
pub fn extract(line: &str) -> Option<VcsRequirement> {
    let caps = VCS_REQUIREMENT.captures(line.trim())?;
    Some(VcsRequirement {
        name: caps["name"].to_string(),
        reference: caps["ref"].to_string(),
        url: caps["url"].to_string(),
        editable: caps.name("editable").is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_vcs() {
        assert!(is_vcs("git+https://github.com/org/repo.git@abc#egg=repo"));
        assert!(is_vcs("-e git+ssh://host/repo"));
        assert!(is_vcs("--editable=hg+https://host/repo"));
        assert!(is_vcs("svn://host/repo"));
        assert!(is_vcs("bzr+lp:project"));
        assert!(!is_vcs("Django==1.2.3"));
        assert!(!is_vcs("gitpython==3.1"));
        assert!(!is_vcs("-r git.txt"));
    }

    #[test]
    fn test_extract_editable_ssh() {
        let vcs = extract("-e git+ssh://host/repo@deadbeef#egg=foo").unwrap();
        assert_eq!(vcs.name, "foo");
        assert_eq!(vcs.reference, "deadbeef");
        assert_eq!(vcs.url, "git+ssh://host/repo@deadbeef#egg=foo");
        assert!(vcs.editable);
    }

    #[test]
    fn test_extract_user_in_url() {
        let vcs = extract("git+ssh://git@github.com/org/repo.git@v1.0#egg=repo").unwrap();
        assert_eq!(vcs.reference, "v1.0");
        assert_eq!(vcs.name, "repo");
        assert!(!vcs.editable);
    }

    #[test]
    fn test_extract_with_subdirectory() {
        let vcs = extract("git+https://host/mono.git@main#egg=pkg&subdirectory=pkg").unwrap();
        assert_eq!(vcs.name, "pkg");
        assert_eq!(vcs.reference, "main");
    }

    #[test]
    fn test_extract_without_ref_or_egg() {
        assert!(extract("git+https://host/repo.git#egg=repo").is_none());
        assert!(extract("git+https://host/repo.git@abc").is_none());
        assert!(extract("Django==1.2.3").is_none());
    }

    #[test]
    fn test_extract_with_environment_marker() {
        let vcs = extract("git+https://h/r.git@v1#egg=r ; python_version < '3'").unwrap();
        assert_eq!(vcs.name, "r");
        assert_eq!(vcs.reference, "v1");
        assert_eq!(vcs.url, "git+https://h/r.git@v1#egg=r");

        let vcs = extract("git+https://h/r.git@v1#egg=r;python_version<'3'").unwrap();
        assert_eq!(vcs.name, "r");
        assert_eq!(vcs.url, "git+https://h/r.git@v1#egg=r");
    }
}
