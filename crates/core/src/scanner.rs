use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::error;
use walkdir::WalkDir;

use crate::models::{package_name, Dependency, PyImport};
use crate::parser::PythonParser;

/// File extension picked up when recursing into directories.
const PY_EXTENSION: &str = "py";

/// Expand files and directories into the list of source files to scan.
///
/// Directories recurse to every `*.py`; plain files are taken as given. A
/// file reachable through several inputs, or through a symlink alias, is
/// visited only once.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let p = entry.path();
                if p.extension().and_then(|e| e.to_str()) != Some(PY_EXTENSION) {
                    continue;
                }
                push_once(p, &mut visited, &mut files);
            }
        } else {
            push_once(path, &mut visited, &mut files);
        }
    }
    files
}

fn push_once(path: &Path, visited: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if visited.insert(resolved) {
        files.push(path.to_path_buf());
    }
}

/// Parse one file and classify each discovered import against `allowed`.
///
/// An unreadable or syntactically broken file is logged and yields nothing;
/// it never aborts the run.
pub fn scan_file(path: &Path, allowed: &HashSet<String>) -> Vec<(Dependency, PyImport)> {
    let source = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!("could not read {}: {err}", path.display());
            return Vec::new();
        }
    };
    let mut parser = match PythonParser::new() {
        Ok(parser) => parser,
        Err(err) => {
            error!("{err}");
            return Vec::new();
        }
    };
    let imports = match parser.parse(&source) {
        Ok(imports) => imports,
        Err(err) => {
            error!("could not parse {}: {err}", path.display());
            return Vec::new();
        }
    };
    imports
        .into_iter()
        .map(|import| {
            let status = if allowed.contains(&package_name(&import.module)) {
                Dependency::Ok
            } else {
                Dependency::Unavailable
            };
            (status, import)
        })
        .collect()
}
