use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for morphsphere")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run the displacement benchmark in release mode
    Bench,
    /// Drive the headless loop over the bundled demo track
    Demo {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
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
            run_deny()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Deny => run_deny()?,
        Commands::Doc => run_doc()?,
        Commands::Build => cargo("cargo build", &["build", "--workspace"])?,
        Commands::Bench => cargo(
            "cargo bench (displacement)",
            &[
                "bench",
                "-p",
                "morphsphere-scene",
                "--bench",
                "bench_displacement",
            ],
        )?,
        Commands::Demo { ticks } => {
            let ticks = ticks.to_string();
            cargo(
                "morphsphere-cli run (demo track)",
                &[
                    "run",
                    "-p",
                    "morphsphere-cli",
                    "--",
                    "run",
                    "--file",
                    "demos/state.json",
                    "--ticks",
                    &ticks,
                ],
            )?
        }
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{step} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn run_tests() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn run_deny() -> Result<()> {
    cargo(
        "cargo deny check (licenses bans sources)",
        &["deny", "check", "licenses", "bans", "sources"],
    )
}

fn run_doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}
