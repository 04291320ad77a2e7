//! Common syntax-tree abstractions shared by parsers and the extractor.
//!
//! Parsers turn raw text into an owned [`SyntaxTree`] holding only the
//! declaration nodes the extractor cares about. The tree is position
//! independent: queries are purely structural (children, descendants).

use crate::core::errors::Result;

/// Kinds of declaration nodes exposed by a parsed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a parsed document
    CompilationUnit,
    /// Namespace declaration (block or file-scoped)
    Namespace,
    /// Class declaration
    Class,
    /// Any other type declaration (struct, interface, record, enum)
    OtherType,
    /// Constructor declaration
    Constructor,
    /// Method declaration
    Method,
    /// Parameter of a constructor or method
    Parameter,
}

/// Owned declaration node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Declaration kind
    pub kind: NodeKind,
    /// Identifier as written (dotted path for namespaces)
    pub name: String,
    /// Return type for methods, declared type for parameters
    pub type_text: Option<String>,
    /// Modifier keywords attached directly to the declaration
    pub modifiers: Vec<String>,
    /// Nested declarations in document order
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a node with no modifiers, type or children
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            type_text: None,
            modifiers: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the type text, builder style
    pub fn with_type(mut self, type_text: impl Into<String>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    /// Add a modifier, builder style
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Add a child, builder style
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Direct children
    pub fn children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter()
    }

    /// Direct children of one kind
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// All nodes below this one, pre-order, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All nodes of one kind below this one, in document order
    pub fn descendants_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.descendants().filter(move |node| node.kind == kind)
    }

    /// Whether a modifier keyword is attached directly to this declaration
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// Pre-order iterator over the descendants of a [`SyntaxNode`]
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse push keeps document order on pop
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A successfully parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    /// Wrap a root node; its kind should be [`NodeKind::CompilationUnit`]
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    /// Root of the tree
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }
}

/// Source parser consumed by the extraction stage.
///
/// Implementations must be shareable across worker threads; the pipeline
/// calls `parse` concurrently for independent documents.
pub trait SourceParser: Send + Sync {
    /// Language key of this parser
    fn language(&self) -> &str;

    /// Parse raw text into a declaration tree
    fn parse(&self, source: &str) -> Result<SyntaxTree>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxNode {
        SyntaxNode::new(NodeKind::CompilationUnit, "").with_child(
            SyntaxNode::new(NodeKind::Namespace, "Outer")
                .with_child(
                    SyntaxNode::new(NodeKind::Class, "A")
                        .with_child(SyntaxNode::new(NodeKind::Method, "Run")),
                )
                .with_child(
                    SyntaxNode::new(NodeKind::Namespace, "Inner")
                        .with_child(SyntaxNode::new(NodeKind::Class, "B")),
                ),
        )
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let root = sample();
        let names: Vec<_> = root.descendants().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "A", "Run", "Inner", "B"]);
    }

    #[test]
    fn test_descendants_of_kind_flatten_nesting() {
        let root = sample();
        let namespaces: Vec<_> = root
            .descendants_of_kind(NodeKind::Namespace)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(namespaces, vec!["Outer", "Inner"]);

        let outer = root.children().next().unwrap();
        let classes: Vec<_> = outer
            .descendants_of_kind(NodeKind::Class)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(classes, vec!["A", "B"]);
    }

    #[test]
    fn test_has_modifier() {
        let node = SyntaxNode::new(NodeKind::Method, "Run")
            .with_modifier("public")
            .with_modifier("static");
        assert!(node.has_modifier("public"));
        assert!(!node.has_modifier("private"));
    }
}
