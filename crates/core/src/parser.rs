use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::models::PyImport;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to initialize python grammar: {0}")]
    Init(String),
    #[error("syntax error")]
    Syntax,
}

/// Extracts absolute imports from Python source via tree-sitter.
///
/// Relative imports (`from . import x`) are never yielded: they resolve
/// within the project and can never be missing. A source whose tree contains
/// error nodes is rejected outright so the caller can skip the file.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::Init(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Collect every absolute import in `source`, in statement order.
    pub fn parse(&mut self, source: &str) -> Result<Vec<PyImport>, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::Syntax)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax);
        }
        let mut imports = Vec::new();
        collect_imports(&root, source, &mut imports);
        Ok(imports)
    }
}

/// Walk every node so imports nested in function, class, conditional and
/// exception-handler bodies are found too. Each dotted name of a plain
/// `import` yields its own entry; all entries carry the statement's line.
fn collect_imports(node: &Node, source: &str, imports: &mut Vec<PyImport>) {
    match node.kind() {
        "import_statement" => {
            let line = node.start_position().row + 1;
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "dotted_name" => imports.push(PyImport {
                        module: node_text(&child, source),
                        line,
                    }),
                    "aliased_import" => {
                        if let Some(name) = child.child_by_field_name("name") {
                            imports.push(PyImport {
                                module: node_text(&name, source),
                                line,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let module = match node.child_by_field_name("module_name") {
                Some(name) if name.kind() == "relative_import" => return,
                Some(name) => node_text(&name, source),
                None => String::new(),
            };
            imports.push(PyImport {
                module,
                line: node.start_position().row + 1,
            });
        }
        // `from __future__ import ...` has its own node kind
        "future_import_statement" => imports.push(PyImport {
            module: "__future__".to_string(),
            line: node.start_position().row + 1,
        }),
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_imports(&child, source, imports);
            }
        }
    }
}

fn node_text(node: &Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(source: &str) -> Vec<String> {
        let mut parser = PythonParser::new().unwrap();
        parser
            .parse(source)
            .unwrap()
            .into_iter()
            .map(|import| import.module)
            .collect()
    }

    #[test]
    fn test_plain_import() {
        assert_eq!(modules("import foo"), ["foo"]);
    }

    #[test]
    fn test_aliased_import() {
        assert_eq!(modules("import foo as bar"), ["foo"]);
    }

    #[test]
    fn test_from_import() {
        assert_eq!(modules("from foo import bar"), ["foo"]);
        assert_eq!(modules("from foo import bar as baz"), ["foo"]);
        assert_eq!(modules("from foo import bar, baz"), ["foo"]);
    }

    #[test]
    fn test_from_import_wildcard() {
        assert_eq!(modules("from os.path import *"), ["os.path"]);
    }

    #[test]
    fn test_relative_imports_skipped() {
        assert!(modules("from . import bar").is_empty());
        assert!(modules("from .internal import bar").is_empty());
        assert!(modules("from ..pkg.sub import baz").is_empty());
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(modules("import foo\nimport bar"), ["foo", "bar"]);
    }

    #[test]
    fn test_dotted_import() {
        assert_eq!(modules("import foo.bar"), ["foo.bar"]);
    }

    #[test]
    fn test_multiple_names_share_statement_line() {
        let mut parser = PythonParser::new().unwrap();
        let imports = parser.parse("import foo, bar.baz").unwrap();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, "foo");
        assert_eq!(imports[1].module, "bar.baz");
        assert!(imports.iter().all(|import| import.line == 1));
    }

    #[test]
    fn test_import_in_class_body() {
        assert_eq!(modules("class X:\n    import foo"), ["foo"]);
    }

    #[test]
    fn test_import_in_function_body() {
        assert_eq!(modules("def x():\n    import foo"), ["foo"]);
    }

    #[test]
    fn test_import_in_conditional_and_handler_bodies() {
        let source = "try:\n    import a\nexcept ImportError:\n    import b\nelse:\n    import c\nfinally:\n    import d\n";
        assert_eq!(modules(source), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_future_import() {
        assert_eq!(
            modules("from __future__ import annotations"),
            ["__future__"]
        );
    }

    #[test]
    fn test_line_numbers() {
        let mut parser = PythonParser::new().unwrap();
        let imports = parser.parse("x = 1\nimport foo\n\nimport bar\n").unwrap();
        assert_eq!(imports[0].line, 2);
        assert_eq!(imports[1].line, 4);
    }

    #[test]
    fn test_syntax_error() {
        let mut parser = PythonParser::new().unwrap();
        assert!(matches!(
            parser.parse("def broken(:\n"),
            Err(ParseError::Syntax)
        ));
    }

    #[test]
    fn test_no_imports() {
        assert!(modules("x = 42\n").is_empty());
    }
}
