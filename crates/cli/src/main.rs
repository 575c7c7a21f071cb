use std::path::PathBuf;
use std::process;

use checkdeps_core::{check, AppConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "checkdeps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find undeclared and unused (or all) imports in Python files")]
#[command(long_about = "Scans Python files or directory trees for import statements and checks \
    them against the dependencies declared in the project's pyproject.toml (PEP-631 [project] \
    tables and [tool.poetry] tables are both understood). Undeclared imports are reported with \
    a leading '!', declared-but-unused dependencies with a leading '+'.\n\n\
    The manifest is located by searching upward from the common root of the given paths; \
    standard-library modules never count as missing.")]
pub struct Args {
    /// Python source files or directories to analyse
    #[arg(required = true)]
    pub file_name: Vec<PathBuf>,

    /// Include dev dependencies
    #[arg(long)]
    pub include_dev: bool,

    /// Show every import of a package
    #[arg(short, long)]
    pub verbose: bool,

    /// Show all imports (including correct ones)
    #[arg(long = "all")]
    pub show_all: bool,

    /// Comma separated list of requirements known to be missing.
    /// Assume they are part of the requirements
    #[arg(long, default_value = "")]
    pub missing: String,

    /// Comma separated list of requirements known to not be imported.
    /// Assume they are not part of the requirements
    #[arg(long, default_value = "")]
    pub extra: String,

    /// Explicit pyproject.toml file or directory to resolve it from,
    /// instead of searching upward from the common root of the inputs
    #[arg(long)]
    pub pyproject: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let cfg = AppConfig::new()
        .with_include_dev(args.include_dev)
        .with_verbose(args.verbose)
        .with_show_all(args.show_all)
        .with_known_missing(split_list(&args.missing))
        .with_known_extra(split_list(&args.extra));

    match check(&args.file_name, args.pyproject.as_deref(), &cfg) {
        Ok(report) => {
            for line in &report.lines {
                println!("{line}");
            }
            process::exit(report.exit_status);
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            log::error!("{err:#}");
            process::exit(1);
        }
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}
