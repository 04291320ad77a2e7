//! C# parser with tree-sitter integration.
//!
//! The concrete syntax tree is reduced to the declaration nodes the
//! extractor consumes. Member bodies are never entered, so parameters of
//! lambdas and local functions cannot leak into a member's signature.

use tree_sitter::Node;

use crate::core::errors::{Result, TestforgeError};
use crate::lang::common::{NodeKind, SourceParser, SyntaxNode, SyntaxTree};
use crate::lang::registry::{create_parser_for_language, get_tree_sitter_language};

const LANGUAGE_KEY: &str = "cs";

/// Keywords that can appear as bare tokens in a declaration's modifier list
const MODIFIER_KEYWORDS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "abstract",
    "sealed",
    "virtual",
    "override",
    "readonly",
    "async",
    "extern",
    "partial",
    "unsafe",
    "new",
];

const OTHER_TYPE_KINDS: &[&str] = &[
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
    "enum_declaration",
];

/// C# source parser
#[derive(Debug, Clone)]
pub struct CSharpParser {
    reject_syntax_errors: bool,
}

impl CSharpParser {
    /// Create a new C# parser
    pub fn new(reject_syntax_errors: bool) -> Result<Self> {
        // Fail at construction rather than on the first document
        get_tree_sitter_language(LANGUAGE_KEY)?;
        Ok(Self {
            reject_syntax_errors,
        })
    }

    /// Parse C# source code into a declaration tree
    pub fn parse_source(&self, source: &str) -> Result<SyntaxTree> {
        let mut parser = create_parser_for_language(LANGUAGE_KEY)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| TestforgeError::parse(LANGUAGE_KEY, "Failed to parse C# source code"))?;

        let root = tree.root_node();
        if self.reject_syntax_errors && root.has_error() {
            let (line, column) = first_error_position(root).unwrap_or((1, 1));
            return Err(TestforgeError::parse_at(
                LANGUAGE_KEY,
                "source contains syntax errors",
                line,
                column,
            ));
        }

        let mut unit = SyntaxNode::new(NodeKind::CompilationUnit, "");
        unit.children = collect_declarations(root, source);
        Ok(SyntaxTree::new(unit))
    }
}

impl SourceParser for CSharpParser {
    fn language(&self) -> &str {
        LANGUAGE_KEY
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree> {
        self.parse_source(source)
    }
}

/// Collect the declarations below `node`, skipping non-declaration layers.
///
/// A file-scoped namespace adopts every declaration that follows it in the
/// same container.
fn collect_declarations(node: Node, source: &str) -> Vec<SyntaxNode> {
    let mut declarations = Vec::new();
    let mut file_scope: Option<SyntaxNode> = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "file_scoped_namespace_declaration" {
            if let Some(previous) = file_scope.take() {
                declarations.push(previous);
            }
            let mut namespace = SyntaxNode::new(NodeKind::Namespace, declared_name(child, source));
            namespace.children = collect_declarations(child, source);
            file_scope = Some(namespace);
            continue;
        }

        let target = match file_scope.as_mut() {
            Some(namespace) => &mut namespace.children,
            None => &mut declarations,
        };

        match declaration_for(child, source) {
            Some(declaration) => target.push(declaration),
            // ERROR nodes and plain syntax layers may still hold declarations
            None => target.extend(collect_declarations(child, source)),
        }
    }

    if let Some(namespace) = file_scope {
        declarations.push(namespace);
    }

    declarations
}

fn declaration_for(node: Node, source: &str) -> Option<SyntaxNode> {
    let kind = node.kind();
    let declaration = match kind {
        "namespace_declaration" => {
            let mut ns = SyntaxNode::new(NodeKind::Namespace, declared_name(node, source));
            ns.children = collect_declarations(node, source);
            ns
        }
        "class_declaration" => {
            let mut class = SyntaxNode::new(NodeKind::Class, declared_name(node, source));
            class.modifiers = modifiers(node, source);
            class.children = collect_declarations(node, source);
            class
        }
        _ if OTHER_TYPE_KINDS.contains(&kind) => {
            let mut other = SyntaxNode::new(NodeKind::OtherType, declared_name(node, source));
            other.modifiers = modifiers(node, source);
            other.children = collect_declarations(node, source);
            other
        }
        "constructor_declaration" => {
            let mut ctor = SyntaxNode::new(NodeKind::Constructor, declared_name(node, source));
            ctor.modifiers = modifiers(node, source);
            ctor.children = parameters(node, source);
            ctor
        }
        "method_declaration" => {
            let mut method = SyntaxNode::new(NodeKind::Method, declared_name(node, source));
            method.modifiers = modifiers(node, source);
            method.type_text = node
                .child_by_field_name("returns")
                .or_else(|| node.child_by_field_name("type"))
                .map(|ty| normalized_text(ty, source));
            method.children = parameters(node, source);
            method
        }
        _ => return None,
    };

    Some(declaration)
}

fn declared_name(node: Node, source: &str) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        return normalized_text(name, source);
    }

    let mut cursor = node.walk();
    let fallback = node
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "identifier" | "qualified_name"))
        .map(|child| normalized_text(child, source))
        .unwrap_or_default();
    fallback
}

fn modifiers(node: Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    let found: Vec<String> = node
        .children(&mut cursor)
        .filter_map(|child| {
            if child.kind() == "modifier" {
                Some(normalized_text(child, source))
            } else if !child.is_named() && MODIFIER_KEYWORDS.contains(&child.kind()) {
                Some(child.kind().to_string())
            } else {
                None
            }
        })
        .collect();
    found
}

fn parameters(node: Node, source: &str) -> Vec<SyntaxNode> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut cursor = list.walk();
    let params: Vec<SyntaxNode> = list
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "parameter")
        .filter_map(|param| {
            let type_text = param.child_by_field_name("type")?;
            Some(
                SyntaxNode::new(NodeKind::Parameter, declared_name(param, source))
                    .with_type(normalized_text(type_text, source)),
            )
        })
        .collect();
    params
}

/// Node text with every whitespace run collapsed to one space
fn normalized_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// 1-based position of the first error or missing node, in document order
fn first_error_position(root: Node) -> Option<(usize, usize)> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            return Some((position.row + 1, position.column + 1));
        }

        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}
