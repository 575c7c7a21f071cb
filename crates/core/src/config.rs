use std::collections::HashSet;
use std::path::Path;

use crate::models::{package_name, Dependency};

/// Behavioral switches for one run.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Count poetry dev/group dependencies as declared
    pub include_dev: bool,
    /// Report every occurrence with its source location
    pub verbose: bool,
    /// Also report correctly declared imports
    pub show_all: bool,
    /// User-supplied names assumed to be declared
    pub known_missing: HashSet<String>,
    /// User-supplied declared names assumed to be intentionally unused
    pub known_extra: HashSet<String>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_dev(mut self, include_dev: bool) -> Self {
        self.include_dev = include_dev;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Names assumed to be declared. Empty entries are dropped.
    pub fn with_known_missing<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.known_missing = clean_names(names);
        self
    }

    /// Declared names assumed unused. Empty entries are dropped.
    pub fn with_known_extra<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.known_extra = clean_names(names);
        self
    }

    /// Formatter bound to this run's switches, with a fresh dedup cache.
    pub fn reporter(&self) -> Reporter {
        Reporter {
            verbose: self.verbose,
            show_all: self.show_all,
            seen: HashSet::new(),
        }
    }
}

fn clean_names<I>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().filter(|name| !name.is_empty()).collect()
}

/// Renders classified imports and unused dependencies as output lines.
///
/// In non-verbose mode each package is reported at most once per run, no
/// matter how many files or lines reference it; verbose mode keeps every
/// occurrence since each carries a distinct location.
pub struct Reporter {
    verbose: bool,
    show_all: bool,
    seen: HashSet<String>,
}

impl Reporter {
    /// Zero or one line for a classified import occurrence. `Extra` never
    /// reaches this formatter.
    pub fn format_import(
        &mut self,
        path: &Path,
        status: Dependency,
        module: &str,
        line: usize,
    ) -> Option<String> {
        if self.verbose {
            if status == Dependency::Unavailable || self.show_all {
                return Some(format!(
                    "{}{} {}:{} {}",
                    status.glyph(),
                    status.label(),
                    path.display(),
                    line,
                    module
                ));
            }
            return None;
        }
        let package = package_name(module);
        // Cache before the emit condition: a package never produces a
        // second line, even when the first occurrence was suppressed.
        if !self.seen.insert(package.clone()) {
            return None;
        }
        if status == Dependency::Unavailable || self.show_all {
            return Some(format!("{} {}", status.glyph(), package));
        }
        None
    }

    /// One line for a declared dependency never imported by the scanned
    /// files. Inputs are already distinct; no dedup here.
    pub fn format_unused(&self, package: &str) -> String {
        let status = Dependency::Extra;
        if self.verbose {
            format!("{}{} {}", status.glyph(), status.label(), package)
        } else {
            format!("{} {}", status.glyph(), package)
        }
    }
}
