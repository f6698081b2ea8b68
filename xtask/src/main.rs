use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the docrule test suite through cargo nextest
    Test {
        #[arg(long)]
        profile: Option<String>,
        /// Only run tests whose name contains this filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Run tests and review pending insta snapshots
    Snapshots {
        /// Accept all pending snapshots without the interactive review
        #[arg(long)]
        accept: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test { profile, filter } => run_tests(profile, filter)?,
        Commands::Snapshots { accept } => review_snapshots(accept)?,
    }
    Ok(())
}

fn run_tests(profile: Option<String>, filter: Option<String>) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["nextest", "run", "-p", "docrule"]);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if let Some(filter) = filter {
        cmd.arg(filter);
    }
    run(cmd, "cargo nextest run")
}

fn review_snapshots(accept: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["insta", "test", "-p", "docrule"]);
    if accept {
        cmd.arg("--accept");
    } else {
        cmd.arg("--review");
    }
    run(cmd, "cargo insta test")
}

fn run(mut cmd: Command, label: &str) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
