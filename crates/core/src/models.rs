/// Classification of a single import occurrence or declared dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// Imported but declared nowhere
    Unavailable,
    /// Declared but never imported
    Extra,
    /// Imported and declared
    Ok,
}

impl Dependency {
    /// Single-character marker at the start of every output line.
    pub fn glyph(self) -> char {
        match self {
            Dependency::Unavailable => '!',
            Dependency::Extra => '+',
            Dependency::Ok => ' ',
        }
    }

    /// Long status name appended to the glyph in verbose output.
    pub fn label(self) -> &'static str {
        match self {
            Dependency::Unavailable => "NA",
            Dependency::Extra => "EXTRA",
            Dependency::Ok => "OK",
        }
    }
}

/// A single absolute import discovered in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyImport {
    /// Dotted module path as written (`a.b.c`)
    pub module: String,
    /// Line of the owning import statement, 1-based
    pub line: usize,
}

/// Installable package name for a module path or dependency name: the first
/// dotted segment with hyphens normalized to underscores. `a.b` and `a.c`
/// both reduce to package `a`.
pub fn package_name(module: &str) -> String {
    module.split('.').next().unwrap_or(module).replace('-', "_")
}
