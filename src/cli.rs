use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reqdeploy")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Reinstall only the pip requirements files that changed", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ./reqdeploy.toml or ~/.config/reqdeploy/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the include graph of the requirements files
    Tree(TreeArgs),

    /// Print the normalized requirements of a file
    Normalize {
        /// Requirements file to read
        file: PathBuf,
    },

    /// Compare two requirements files on disk
    Compare {
        /// Old version of the file
        old: PathBuf,
        /// New version of the file
        new: PathBuf,
    },

    /// Show which requirements files need reinstalling between two revisions
    Changed(ChangedArgs),

    /// Install the requirements files that changed between two revisions
    Deploy(DeployArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct TreeArgs {
    /// Read files at this git revision instead of the working tree
    #[arg(long)]
    pub rev: Option<String>,

    /// Root requirements files (default: from config)
    pub roots: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct RevisionArgs {
    /// Revision currently deployed
    #[arg(long = "from", value_name = "REV")]
    pub from: String,

    /// Revision being deployed
    #[arg(long = "to", value_name = "REV", default_value = "HEAD")]
    pub to: String,
}

#[derive(clap::Args)]
pub struct ChangedArgs {
    #[command(flatten)]
    pub revisions: RevisionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub revisions: RevisionArgs,

    /// Reinstall every root file even if nothing changed
    #[arg(long)]
    pub force: bool,

    /// Upgrade pip itself before installing
    #[arg(long)]
    pub update_pip: bool,

    /// Show what would be installed without running pip
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "reqdeploy",
            "-vv",
            "deploy",
            "--from",
            "abc1234",
            "--update-pip",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Deploy(args) => {
                assert_eq!(args.revisions.from, "abc1234");
                assert_eq!(args.revisions.to, "HEAD");
                assert!(args.update_pip);
                assert!(args.dry_run);
                assert!(!args.force);
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn test_changed_requires_from() {
        assert!(Cli::try_parse_from(["reqdeploy", "changed"]).is_err());
    }
}
