mod cli;
mod commands;
mod config;
mod paths;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::DeployConfig;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: DeployConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "reqdeploy", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: DeployConfig::load(cli.config.as_deref())?,
    };

    let result = match cli.command {
        Command::Tree(args) => commands::tree::run(&ctx, args),
        Command::Normalize { file } => commands::normalize::run(&ctx, &file),
        Command::Compare { old, new } => commands::compare::run(&ctx, &old, &new),
        Command::Changed(args) => commands::changed::run(&ctx, args),
        Command::Deploy(args) => commands::deploy::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    };

    if let Err(e) = &result {
        report(e);
    }
    result
}

/// Print advice for errors raised by the requirements library
fn report(error: &anyhow::Error) {
    let Some(err) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<reqkit::Error>())
    else {
        return;
    };

    let category = err.category();
    ui::error(category.description());
    if let reqkit::Error::CommandFailed { stderr, .. } = err
        && !stderr.is_empty()
    {
        ui::dim(stderr);
    }
    ui::dim(category.advice());
}
