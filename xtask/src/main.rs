use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for labwalk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc, smoke
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Walk to the door headless and verify the run replays identically
    Smoke {
        /// Frames to simulate
        #[arg(long, default_value = "600")]
        ticks: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
            run_smoke(600)?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
        Commands::Smoke { ticks } => run_smoke(ticks)?,
    }

    Ok(())
}

/// Run `cargo <args>` and fail with `what` if it exits unsuccessfully.
fn cargo(args: &[&str], what: &str) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "cargo fmt check")
}

fn run_clippy() -> Result<()> {
    cargo(
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        "cargo clippy",
    )
}

fn run_tests() -> Result<()> {
    cargo(&["test", "--workspace"], "cargo test")
}

fn run_doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"], "cargo doc")
}

fn run_build() -> Result<()> {
    cargo(&["build", "--workspace"], "cargo build")
}

fn run_smoke(ticks: u64) -> Result<()> {
    let ticks = ticks.to_string();
    cargo(
        &[
            "run",
            "--quiet",
            "-p",
            "labwalk-cli",
            "--",
            "simulate",
            "--ticks",
            &ticks,
            "--hold",
            "w",
            "--verify",
        ],
        "headless smoke run",
    )
}
