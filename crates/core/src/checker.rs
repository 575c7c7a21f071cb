use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::error;

use crate::builtins::builtin_modules;
use crate::config::AppConfig;
use crate::manifest::{ManifestError, PyProject};
use crate::models::{package_name, Dependency};
use crate::scanner::{collect_files, scan_file};

/// Exit-status bit: at least one undeclared import was found.
pub const ERR_MISSING_DEPENDENCY: i32 = 2;
/// Exit-status bit: at least one declared dependency is unused.
pub const ERR_EXTRA_DEPENDENCY: i32 = 4;
/// Exit-status bit: no manifest reachable from the common input root.
pub const ERR_NO_PYPROJECT: i32 = 8;

/// Output lines and the aggregated exit bitmask of one run.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub lines: Vec<String>,
    pub exit_status: i32,
}

impl CheckReport {
    fn failed(exit_status: i32) -> Self {
        Self {
            lines: Vec::new(),
            exit_status,
        }
    }
}

/// Run the whole pipeline over `paths`: resolve the manifest from the
/// common root (or from `pyproject` when given), scan every file, classify
/// every import, and report declared-but-unused dependencies.
///
/// A missing manifest is fatal for the run but reported through the exit
/// bitmask; malformed manifests and type errors propagate as hard errors.
pub fn check(
    paths: &[PathBuf],
    pyproject: Option<&Path>,
    cfg: &AppConfig,
) -> Result<CheckReport, ManifestError> {
    let start = match pyproject {
        Some(path) => path.to_path_buf(),
        None => match common_path(paths) {
            Some(path) => path,
            None => {
                error!("could not determine a common root for the input paths");
                return Ok(CheckReport::failed(ERR_NO_PYPROJECT));
            }
        },
    };

    let manifest = match PyProject::discover(&start, cfg.include_dev) {
        Ok(manifest) => manifest,
        Err(err @ ManifestError::NotFound(_)) => {
            error!("{err}");
            return Ok(CheckReport::failed(ERR_NO_PYPROJECT));
        }
        Err(err) => return Err(err),
    };

    let dependencies = manifest.dependencies()?;
    let mut allowed = dependencies.clone();
    allowed.extend(builtin_modules());
    allowed.extend(cfg.known_missing.iter().cloned());
    allowed.extend(manifest.known_missing()?);

    let mut reporter = cfg.reporter();
    let mut used: HashSet<String> = HashSet::new();
    let mut lines = Vec::new();
    let mut exit_status = 0;

    for file in collect_files(paths) {
        for (status, import) in scan_file(&file, &allowed) {
            if status != Dependency::Ok {
                exit_status |= ERR_MISSING_DEPENDENCY;
            }
            used.insert(package_name(&import.module));
            if let Some(line) = reporter.format_import(&file, status, &import.module, import.line)
            {
                lines.push(line);
            }
        }
    }

    let manifest_extra = manifest.known_extra()?;
    let mut unused: Vec<&String> = dependencies
        .iter()
        .filter(|dep| {
            !used.contains(*dep)
                && !cfg.known_extra.contains(*dep)
                && !manifest_extra.contains(*dep)
        })
        .collect();
    unused.sort();

    if !unused.is_empty() {
        exit_status |= ERR_EXTRA_DEPENDENCY;
        if cfg.verbose {
            lines.push(String::new());
            lines.push("### Dependencies in config file not used in application:".to_string());
            lines.push(format!("# Config file: {}", manifest.file.display()));
        }
        for dep in unused {
            lines.push(reporter.format_unused(dep));
        }
    }

    Ok(CheckReport { lines, exit_status })
}

/// Longest shared ancestor of the resolved input paths; `None` for an empty
/// input list.
fn common_path(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut iter = paths.iter();
    let mut common = resolve(iter.next()?);
    for path in iter {
        common = shared_prefix(&common, &resolve(path))?;
    }
    Some(common)
}

fn resolve(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn shared_prefix(a: &Path, b: &Path) -> Option<PathBuf> {
    let shared: PathBuf = a
        .components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();
    if shared.as_os_str().is_empty() {
        None
    } else {
        Some(shared)
    }
}
