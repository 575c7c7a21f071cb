//! Core library for checkdeps
//!
//! Scans Python source files for import statements and classifies each one
//! against the dependencies declared in the project's `pyproject.toml`:
//! declared, undeclared ("missing"), or declared-but-unused ("extra").
//!
//! # Features
//!
//! - Manifest discovery by upward search from the common root of the inputs
//! - PEP-631 `[project]` and `[tool.poetry]` manifest dialects
//! - Recursive import extraction (tree-sitter), including imports nested in
//!   function, class, conditional and exception-handler bodies
//! - Python standard-library registry so builtins never count as missing
//! - `known-missing` / `known-extra` overrides from the manifest's
//!   `[tool.checkdeps]` table or the command line
//! - Exit-status bitmask aggregation for CI use
//!
//! # Example
//!
//! ```no_run
//! use checkdeps_core::{check, AppConfig};
//! use std::path::PathBuf;
//!
//! let cfg = AppConfig::new().with_verbose(true);
//! let report = check(&[PathBuf::from("src")], None, &cfg).unwrap();
//! for line in &report.lines {
//!     println!("{line}");
//! }
//! std::process::exit(report.exit_status);
//! ```

pub mod builtins;
pub mod checker;
pub mod config;
pub mod manifest;
pub mod models;
pub mod parser;
pub mod scanner;

// Re-exports for convenience
pub use checker::{
    check, CheckReport, ERR_EXTRA_DEPENDENCY, ERR_MISSING_DEPENDENCY, ERR_NO_PYPROJECT,
};
pub use config::{AppConfig, Reporter};
pub use manifest::{find_pyproject, ManifestError, PyProject, PYPROJECT_FILE};
pub use models::{package_name, Dependency, PyImport};
pub use parser::{ParseError, PythonParser};
pub use scanner::{collect_files, scan_file};
