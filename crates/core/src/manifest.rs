use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;
use toml::Value;

use crate::models::package_name;

/// Conventional manifest file name searched for in each ancestor directory.
pub const PYPROJECT_FILE: &str = "pyproject.toml";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("could not find pyproject.toml within {0} or its parents")]
    NotFound(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("expected {expected} at `{key}` in {path}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        path: PathBuf,
    },
}

/// Locate `pyproject.toml` in `start` or the nearest ancestor that has one.
pub fn find_pyproject(start: &Path) -> Result<PathBuf, ManifestError> {
    for dir in start.ancestors() {
        let candidate = dir.join(PYPROJECT_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ManifestError::NotFound(start.to_path_buf()))
}

/// A parsed `pyproject.toml` and the dependency sets derived from it.
///
/// Two manifest dialects are recognized: a PEP-631 `[project]` table with a
/// `dependencies` specifier list, and a `[tool.poetry]` table with
/// dependency maps. All derived sets hold canonical package names (hyphens
/// normalized to underscores).
#[derive(Debug, Clone)]
pub struct PyProject {
    /// Backing manifest file
    pub file: PathBuf,
    doc: Value,
    include_dev: bool,
}

impl PyProject {
    /// Search upward from `start` and load the first manifest found.
    pub fn discover(start: &Path, include_dev: bool) -> Result<Self, ManifestError> {
        let file = find_pyproject(start)?;
        Self::load(&file, include_dev)
    }

    pub fn load(file: &Path, include_dev: bool) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(file).map_err(|source| ManifestError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let doc = text.parse::<Value>().map_err(|source| ManifestError::Parse {
            path: file.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: file.to_path_buf(),
            doc,
            include_dev,
        })
    }

    /// Declared runtime (and, with the include-dev flag, development)
    /// dependencies for whichever dialect the manifest uses. An unrecognized
    /// dialect is not an error: it logs a warning and declares nothing.
    pub fn dependencies(&self) -> Result<HashSet<String>, ManifestError> {
        if self.nested("project.dependencies")?.is_some() {
            return self.pep631_dependencies();
        }
        if self.nested("tool.poetry")?.is_some() {
            return self.poetry_dependencies();
        }
        warn!("no dependencies found in {}", self.file.display());
        Ok(HashSet::new())
    }

    /// Packages that may be imported without being declared: the project's
    /// own name (either dialect's name field) plus the manifest's
    /// `known-missing` override list.
    pub fn known_missing(&self) -> Result<HashSet<String>, ManifestError> {
        let mut known: HashSet<String> = self
            .string_list("tool.checkdeps.known-missing")?
            .iter()
            .map(|name| package_name(name))
            .collect();
        for key in ["project.name", "tool.poetry.name"] {
            if let Some(name) = self.string_value(key)? {
                known.insert(package_name(&name));
            }
        }
        known.retain(|name| !name.is_empty());
        Ok(known)
    }

    /// Declared dependencies known to be unused in source, from the
    /// manifest's `known-extra` override list.
    pub fn known_extra(&self) -> Result<HashSet<String>, ManifestError> {
        Ok(self
            .string_list("tool.checkdeps.known-extra")?
            .iter()
            .map(|name| package_name(name))
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// PEP-631 dialect: the literal `project.dependencies` specifier list
    /// plus every `project.optional-dependencies` group.
    fn pep631_dependencies(&self) -> Result<HashSet<String>, ManifestError> {
        let mut deps: HashSet<String> = self
            .string_list("project.dependencies")?
            .iter()
            .map(|spec| canonical_specifier(spec))
            .collect();
        if let Some(groups) = self.nested("project.optional-dependencies")? {
            let key = "project.optional-dependencies";
            let table = as_table(groups, key, &self.file)?;
            for (group, value) in table {
                let specs = as_string_array(value, &format!("{key}.{group}"), &self.file)?;
                deps.extend(specs.iter().map(|spec| canonical_specifier(spec)));
            }
        }
        Ok(deps)
    }

    /// Poetry dialect: the key sets of the dependency tables, without the
    /// `python` pseudo-dependency.
    fn poetry_dependencies(&self) -> Result<HashSet<String>, ManifestError> {
        let mut deps = self.table_keys("tool.poetry.dependencies")?;
        if self.include_dev {
            deps.extend(self.table_keys("tool.poetry.group.dev.dependencies")?);
            deps.extend(self.table_keys("tool.poetry.dev-dependencies")?);
        }
        Ok(deps
            .into_iter()
            .filter(|name| name != "python")
            .map(|name| package_name(&name))
            .collect())
    }

    /// Descend a dot-separated key path through the manifest tree. An absent
    /// segment yields `None`; a present segment of the wrong shape is a type
    /// error.
    fn nested(&self, keys: &str) -> Result<Option<&Value>, ManifestError> {
        let mut current = &self.doc;
        let mut walked = String::new();
        for segment in keys.split('.') {
            let table = current
                .as_table()
                .ok_or_else(|| ManifestError::TypeMismatch {
                    key: walked.clone(),
                    expected: "a table",
                    path: self.file.clone(),
                })?;
            match table.get(segment) {
                Some(value) => current = value,
                None => return Ok(None),
            }
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);
        }
        Ok(Some(current))
    }

    /// String list at `keys`; absent resolves to an empty list.
    fn string_list(&self, keys: &str) -> Result<Vec<String>, ManifestError> {
        match self.nested(keys)? {
            Some(value) => as_string_array(value, keys, &self.file),
            None => Ok(Vec::new()),
        }
    }

    /// Key set of the table at `keys`; absent resolves to an empty set.
    fn table_keys(&self, keys: &str) -> Result<Vec<String>, ManifestError> {
        match self.nested(keys)? {
            Some(value) => Ok(as_table(value, keys, &self.file)?
                .keys()
                .cloned()
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// String at `keys`; absent resolves to `None`.
    fn string_value(&self, keys: &str) -> Result<Option<String>, ManifestError> {
        match self.nested(keys)? {
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| ManifestError::TypeMismatch {
                    key: keys.to_string(),
                    expected: "a string",
                    path: self.file.clone(),
                }),
            None => Ok(None),
        }
    }
}

fn as_table<'a>(
    value: &'a Value,
    key: &str,
    path: &Path,
) -> Result<&'a toml::value::Table, ManifestError> {
    value.as_table().ok_or_else(|| ManifestError::TypeMismatch {
        key: key.to_string(),
        expected: "a table",
        path: path.to_path_buf(),
    })
}

fn as_string_array(value: &Value, key: &str, path: &Path) -> Result<Vec<String>, ManifestError> {
    let items = value.as_array().ok_or_else(|| ManifestError::TypeMismatch {
        key: key.to_string(),
        expected: "an array of strings",
        path: path.to_path_buf(),
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ManifestError::TypeMismatch {
                    key: key.to_string(),
                    expected: "an array of strings",
                    path: path.to_path_buf(),
                })
        })
        .collect()
}

/// Trim a dependency specifier to its bare package name: the leading run of
/// alphanumeric, `-` and `_` characters (dropping version constraints such
/// as `>=1.0`), hyphens normalized to underscores.
fn canonical_specifier(spec: &str) -> String {
    spec.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .replace('-', "_")
}
