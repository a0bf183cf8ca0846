use crate::models::{GuardContext, ImportRecord};
use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to initialize parser: {0}")]
    InitError(String),
    #[error("Failed to parse source code: {0}")]
    SyntaxError(String),
}

/// Extracts import records from Python source text.
///
/// Operates purely on the static syntax tree; nothing is evaluated. Imports
/// under `try`/`except ImportError` blocks and `if TYPE_CHECKING:` blocks
/// are tagged with their guard context rather than dropped, since the
/// decision whether to count them is downstream policy.
pub struct PythonImportParser {
    parser: Parser,
}

impl PythonImportParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::InitError(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source text and return every import occurrence in document
    /// order, or a syntax error for a file that is not valid Python.
    pub fn parse(&mut self, source: &str) -> Result<Vec<ImportRecord>, ParserError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParserError::SyntaxError("parser produced no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            return Err(ParserError::SyntaxError(format!(
                "invalid syntax near line {line}"
            )));
        }

        let mut imports = Vec::new();
        self.traverse_node(&root, source, GuardContext::Unconditional, &mut imports);
        Ok(imports)
    }

    fn traverse_node(
        &self,
        node: &Node,
        source: &str,
        guard: GuardContext,
        imports: &mut Vec<ImportRecord>,
    ) {
        match node.kind() {
            "import_statement" => {
                self.parse_import_statement(node, source, guard, imports);
            }
            "import_from_statement" => {
                self.parse_import_from_statement(node, source, guard, imports);
            }
            "future_import_statement" => {
                // `from __future__ import ...` has its own node kind.
                let names = self.collect_import_names(node, source);
                imports.push(ImportRecord {
                    module: "__future__".to_string(),
                    names: names.into_iter().map(|(n, _)| n).collect(),
                    is_wildcard: false,
                    alias: None,
                    level: 0,
                    is_dynamic: false,
                    line: node.start_position().row + 1,
                    column: node.start_position().column,
                    guard,
                });
            }
            "try_statement" if catches_import_error(node, source) => {
                // Everything under the statement inherits the guard, the
                // fallback imports in the except/else blocks included.
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.traverse_node(&child, source, GuardContext::TryExceptGuarded, imports);
                }
            }
            "if_statement" if is_type_checking_condition(node, source) => {
                // Only the consequence block is type-checking-only; elif /
                // else branches run at normal runtime.
                if let Some(consequence) = node.child_by_field_name("consequence") {
                    self.traverse_node(
                        &consequence,
                        source,
                        GuardContext::TypeCheckingGuarded,
                        imports,
                    );
                }
                let mut cursor = node.walk();
                for child in node.children_by_field_name("alternative", &mut cursor) {
                    self.traverse_node(&child, source, guard, imports);
                }
            }
            "call" => {
                if let Some(record) = self.parse_dynamic_import(node, source, guard) {
                    imports.push(record);
                }
                // A dynamic-import site can sit anywhere inside an expression,
                // e.g. print(__import__(name)), so the arguments are walked
                // either way.
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.traverse_node(&child, source, guard, imports);
                }
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.traverse_node(&child, source, guard, imports);
                }
            }
        }
    }

    /// Recognize `importlib.import_module(...)` and `__import__(...)` call
    /// sites. A single string-literal argument is recorded as a regular
    /// absolute import; anything computed is flagged dynamic so the
    /// classifier reports it unresolved instead of guessing.
    fn parse_dynamic_import(
        &self,
        node: &Node,
        source: &str,
        guard: GuardContext,
    ) -> Option<ImportRecord> {
        let function = node.child_by_field_name("function")?;
        let function_text = node_text(&function, source);
        if function_text != "importlib.import_module" && function_text != "__import__" {
            return None;
        }

        let arguments = node.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let first_arg = arguments
            .children(&mut cursor)
            .find(|c| c.is_named() && c.kind() != "comment")?;

        let module = if first_arg.kind() == "string" {
            string_literal_content(&first_arg, source)
        } else {
            None
        };

        let is_dynamic = module.is_none();
        Some(ImportRecord {
            module: module.unwrap_or_default(),
            names: vec![],
            is_wildcard: false,
            alias: None,
            level: 0,
            is_dynamic,
            line: node.start_position().row + 1,
            column: node.start_position().column,
            guard,
        })
    }

    /// Parse `import x, y.z` or `import x as alias`: one record per target.
    fn parse_import_statement(
        &self,
        node: &Node,
        source: &str,
        guard: GuardContext,
        imports: &mut Vec<ImportRecord>,
    ) {
        for (module, alias) in self.collect_import_names(node, source) {
            imports.push(ImportRecord {
                module,
                names: vec![],
                is_wildcard: false,
                alias,
                level: 0,
                is_dynamic: false,
                line: node.start_position().row + 1,
                column: node.start_position().column,
                guard,
            });
        }
    }

    /// Parse `from x import y, z`, `from . import x`, `from ..x import *`.
    fn parse_import_from_statement(
        &self,
        node: &Node,
        source: &str,
        guard: GuardContext,
        imports: &mut Vec<ImportRecord>,
    ) {
        let mut module = String::new();
        let mut level = 0usize;
        let mut names = Vec::new();
        let mut alias = None;
        let mut is_wildcard = false;
        let mut saw_module = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    if saw_module {
                        names.push(node_text(&child, source));
                    } else {
                        module = node_text(&child, source);
                        saw_module = true;
                    }
                }
                "relative_import" => {
                    let (lvl, path) = self.parse_relative_import(&child, source);
                    level = lvl;
                    module = path;
                    saw_module = true;
                }
                "aliased_import" => {
                    let (name, al) = self.parse_aliased_import(&child, source);
                    names.push(name);
                    if al.is_some() {
                        alias = al;
                    }
                }
                "wildcard_import" => {
                    is_wildcard = true;
                }
                _ => {}
            }
        }

        if saw_module {
            imports.push(ImportRecord {
                module,
                names,
                is_wildcard,
                alias,
                level,
                is_dynamic: false,
                line: node.start_position().row + 1,
                column: node.start_position().column,
                guard,
            });
        }
    }

    /// Collect `(name, alias)` pairs from the dotted/aliased children of an
    /// import statement.
    fn collect_import_names(&self, node: &Node, source: &str) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" => out.push((node_text(&child, source), None)),
                "aliased_import" => out.push(self.parse_aliased_import(&child, source)),
                _ => {}
            }
        }
        out
    }

    /// Split a relative import prefix into (dot count, trailing module path).
    fn parse_relative_import(&self, node: &Node, source: &str) -> (usize, String) {
        let mut level = 0;
        let mut module = String::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_prefix" => {
                    level = node_text(&child, source).chars().filter(|c| *c == '.').count();
                }
                "dotted_name" => {
                    module = node_text(&child, source);
                }
                _ => {}
            }
        }

        (level, module)
    }

    /// Parse `x as y` into (name, alias).
    fn parse_aliased_import(&self, node: &Node, source: &str) -> (String, Option<String>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .map(|n| node_text(&n, source));
        (name, alias)
    }
}

fn node_text(node: &Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

/// The content of a plain string literal. F-strings with interpolations
/// are computed values, not literals.
fn string_literal_content(node: &Node, source: &str) -> Option<String> {
    let mut content = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_content" => content = Some(node_text(&child, source)),
            "interpolation" => return None,
            _ => {}
        }
    }
    content
}

fn first_error_line(root: &Node) -> Option<usize> {
    let mut cursor = root.walk();
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    None
}

/// True when any `except` clause of the try statement names ImportError or
/// ModuleNotFoundError.
fn catches_import_error(node: &Node, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "except_clause" {
            continue;
        }
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            if part.kind() == "block" {
                continue;
            }
            if exception_names_import_error(&part, source) {
                return true;
            }
        }
    }
    false
}

/// Walk an exception expression (bare name, dotted name, tuple, `as` binding)
/// comparing each named exception class exactly. A lookalike such as
/// MyImportErrorShim must not count.
fn exception_names_import_error(node: &Node, source: &str) -> bool {
    match node.kind() {
        "identifier" => {
            let text = &source[node.byte_range()];
            text == "ImportError" || text == "ModuleNotFoundError"
        }
        "attribute" => node
            .child_by_field_name("attribute")
            .map(|attr| {
                let text = &source[attr.byte_range()];
                text == "ImportError" || text == "ModuleNotFoundError"
            })
            .unwrap_or(false),
        _ => {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .any(|child| exception_names_import_error(&child, source));
            found
        }
    }
}

/// True for `if TYPE_CHECKING:` and `if typing.TYPE_CHECKING:`.
fn is_type_checking_condition(node: &Node, source: &str) -> bool {
    match node.child_by_field_name("condition") {
        Some(condition) => {
            let text = source[condition.byte_range()].trim();
            text == "TYPE_CHECKING" || text.ends_with(".TYPE_CHECKING")
        }
        None => false,
    }
}
