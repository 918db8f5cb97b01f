//! Error types for requirement parsing and change detection.
//!
//! Parse errors are kept distinct from source errors so callers can decide
//! whether a failure should abort (graph construction) or degrade to a coarse
//! comparison (revision-to-revision diffing).

use thiserror::Error;

/// Categories of errors, used by callers to pick a recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A manifest line could not be normalized
    Parse,
    /// A manifest does not exist in the requested source
    NotFound,
    /// Filesystem error
    Io,
    /// An external command (git) failed
    Command,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Parse => "Malformed requirements file",
            Self::NotFound => "Requirements file not found",
            Self::Io => "Filesystem error",
            Self::Command => "External command failed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Parse => "Fix the offending line; constraint files and VCS URLs without @ref#egg=name are not supported",
            Self::NotFound => "Check the include path, it is resolved relative to the including file",
            Self::Io => "Check file permissions and that the repository path exists",
            Self::Command => "Check that git is installed and the revision exists",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while reading, parsing or resolving manifests.
#[derive(Debug, Error)]
pub enum Error {
    /// A manifest line cannot be normalized
    #[error("{}line {line}: {message}", path_prefix(.path))]
    Parse {
        /// Manifest the line belongs to, when known
        path: Option<String>,
        /// Line number of the logical line (1-indexed)
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Manifest not present in the content source
    #[error("requirements file not found: {0}")]
    NotFound(String),

    /// Command execution failed
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error without a manifest path attached.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            path: None,
            line,
            message: message.into(),
        }
    }

    /// Attach the manifest path to a parse error; other errors pass through.
    pub fn in_manifest(self, manifest: &str) -> Self {
        match self {
            Error::Parse {
                path: None,
                line,
                message,
            } => Error::Parse {
                path: Some(manifest.to_string()),
                line,
                message,
            },
            other => other,
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse { .. } => ErrorCategory::Parse,
            Error::NotFound(_) => ErrorCategory::NotFound,
            Error::Io(_) => ErrorCategory::Io,
            Error::CommandFailed { .. } => ErrorCategory::Command,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error came from the requirement parser.
    pub fn is_parse(&self) -> bool {
        self.category() == ErrorCategory::Parse
    }
}

fn path_prefix(path: &Option<String>) -> String {
    path.as_ref().map(|p| format!("{p}: ")).unwrap_or_default()
}

/// Result type for requirement operations.
pub type Result<T> = std::result::Result<T, Error>;
