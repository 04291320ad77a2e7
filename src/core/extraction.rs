//! Structural extraction: declaration tree → [`SourceUnit`].
//!
//! The extractor applies the public-surface filter and shapes raw
//! declarations into the generation-ready model. It never fails on a tree
//! that was successfully parsed; empty results are valid values and the
//! caller decides what to do with them.

use tracing::debug;

use crate::core::config::{ConstructorVisibility, ExtractionConfig};
use crate::core::model::{ClassInfo, MemberSignature, NamespaceInfo, Parameter, SourceUnit};
use crate::lang::common::{NodeKind, SyntaxNode, SyntaxTree};

/// Modifier that marks a declaration as externally accessible
pub const PUBLIC_MODIFIER: &str = "public";

/// Builds [`SourceUnit`]s from parsed declaration trees
#[derive(Debug, Clone, Default)]
pub struct StructuralExtractor {
    constructor_visibility: ConstructorVisibility,
}

impl StructuralExtractor {
    /// Create an extractor with default rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from configuration
    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self {
            constructor_visibility: config.constructor_visibility,
        }
    }

    /// Extract the public surface of one parsed document
    pub fn extract(&self, tree: &SyntaxTree) -> SourceUnit {
        let namespaces: Vec<NamespaceInfo> = tree
            .root()
            .descendants_of_kind(NodeKind::Namespace)
            .map(|ns| self.extract_namespace(ns))
            .collect();

        debug!(
            namespaces = namespaces.len(),
            classes = namespaces.iter().map(|ns| ns.classes.len()).sum::<usize>(),
            "extracted source unit"
        );

        SourceUnit::new(namespaces)
    }

    fn extract_namespace(&self, node: &SyntaxNode) -> NamespaceInfo {
        NamespaceInfo {
            name: node.name.clone(),
            classes: node
                .descendants_of_kind(NodeKind::Class)
                .map(|class| self.extract_class(class))
                .collect(),
        }
    }

    fn extract_class(&self, node: &SyntaxNode) -> ClassInfo {
        let methods = node
            .descendants_of_kind(NodeKind::Method)
            .filter(|method| method.has_modifier(PUBLIC_MODIFIER))
            .map(|method| signature(method, method.type_text.clone()))
            .collect();

        let constructors = node
            .descendants_of_kind(NodeKind::Constructor)
            .filter(|ctor| self.constructor_is_public(node, ctor))
            .map(|ctor| signature(ctor, None))
            .collect();

        ClassInfo {
            name: node.name.clone(),
            methods,
            constructors,
        }
    }

    fn constructor_is_public(&self, class: &SyntaxNode, ctor: &SyntaxNode) -> bool {
        match self.constructor_visibility {
            ConstructorVisibility::Declaration => ctor.has_modifier(PUBLIC_MODIFIER),
            ConstructorVisibility::EnclosingClass => class.has_modifier(PUBLIC_MODIFIER),
        }
    }
}

fn signature(node: &SyntaxNode, return_type: Option<String>) -> MemberSignature {
    MemberSignature {
        name: node.name.clone(),
        parameters: node
            .children_of_kind(NodeKind::Parameter)
            .map(|param| {
                Parameter::new(
                    param.name.clone(),
                    param.type_text.clone().unwrap_or_default(),
                )
            })
            .collect(),
        return_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn method(name: &str, ret: &str, modifier: &str) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Method, name)
            .with_modifier(modifier)
            .with_type(ret)
    }

    fn param(name: &str, ty: &str) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Parameter, name).with_type(ty)
    }

    fn tree(namespaces: Vec<SyntaxNode>) -> SyntaxTree {
        let mut root = SyntaxNode::new(NodeKind::CompilationUnit, "");
        root.children = namespaces;
        SyntaxTree::new(root)
    }

    #[test]
    fn test_extracts_expected_shape() {
        let class = SyntaxNode::new(NodeKind::Class, "MyClass")
            .with_modifier("public")
            .with_child(SyntaxNode::new(NodeKind::Constructor, "MyClass").with_modifier("public"))
            .with_child(method("PublicVoidMethod1", "void", "public"))
            .with_child(
                method("PublicVoidMethod2", "void", "public")
                    .with_child(param("d", "decimal"))
                    .with_child(param("os", "OperatingSystem")),
            );
        let unit = StructuralExtractor::new().extract(&tree(vec![SyntaxNode::new(
            NodeKind::Namespace,
            "UnitTest.Files",
        )
        .with_child(class)]));

        let expected = SourceUnit::new(vec![NamespaceInfo::new("UnitTest.Files").with_class(
            ClassInfo::new("MyClass")
                .with_constructor(MemberSignature::constructor("MyClass"))
                .with_method(MemberSignature::method("PublicVoidMethod1", "void"))
                .with_method(
                    MemberSignature::method("PublicVoidMethod2", "void")
                        .with_parameter("d", "decimal")
                        .with_parameter("os", "OperatingSystem"),
                ),
        )]);
        assert_eq!(unit, expected);
    }

    #[test]
    fn test_non_public_members_are_dropped() {
        let class = SyntaxNode::new(NodeKind::Class, "Service")
            .with_modifier("public")
            .with_child(SyntaxNode::new(NodeKind::Constructor, "Service").with_modifier("private"))
            .with_child(method("Visible", "int", "public"))
            .with_child(method("Helper", "int", "private"))
            .with_child(method("Shared", "int", "internal"));
        let unit = StructuralExtractor::new().extract(&tree(vec![
            SyntaxNode::new(NodeKind::Namespace, "App").with_child(class),
        ]));

        let class = &unit.namespaces[0].classes[0];
        assert!(class.constructors.is_empty());
        assert_eq!(
            class.methods.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            vec!["Visible"]
        );
    }

    #[test]
    fn test_enclosing_class_rule_for_constructors() {
        let public_class = SyntaxNode::new(NodeKind::Class, "Open")
            .with_modifier("public")
            .with_child(SyntaxNode::new(NodeKind::Constructor, "Open").with_modifier("private"));
        let internal_class = SyntaxNode::new(NodeKind::Class, "Closed")
            .with_modifier("internal")
            .with_child(SyntaxNode::new(NodeKind::Constructor, "Closed").with_modifier("public"));

        let extractor = StructuralExtractor::with_config(&ExtractionConfig {
            constructor_visibility: ConstructorVisibility::EnclosingClass,
            ..ExtractionConfig::default()
        });
        let unit = extractor.extract(&tree(vec![SyntaxNode::new(NodeKind::Namespace, "App")
            .with_child(public_class)
            .with_child(internal_class)]));

        let classes = &unit.namespaces[0].classes;
        assert_eq!(classes[0].constructors.len(), 1);
        assert!(classes[1].constructors.is_empty());
    }

    #[test]
    fn test_class_without_public_members_is_kept() {
        let class = SyntaxNode::new(NodeKind::Class, "Quiet")
            .with_child(method("Helper", "void", "private"));
        let unit = StructuralExtractor::new().extract(&tree(vec![
            SyntaxNode::new(NodeKind::Namespace, "App").with_child(class),
        ]));

        let class = &unit.namespaces[0].classes[0];
        assert_eq!(class.name, "Quiet");
        assert!(class.methods.is_empty());
        assert!(class.constructors.is_empty());
    }

    #[test]
    fn test_repeated_and_nested_namespaces_are_not_merged() {
        let unit = StructuralExtractor::new().extract(&tree(vec![
            SyntaxNode::new(NodeKind::Namespace, "App")
                .with_child(SyntaxNode::new(NodeKind::Namespace, "App.Inner")),
            SyntaxNode::new(NodeKind::Namespace, "App"),
        ]));

        let names: Vec<_> = unit.namespaces.iter().map(|ns| ns.name.as_str()).collect();
        assert_eq!(names, vec!["App", "App.Inner", "App"]);
    }

    #[test]
    fn test_no_namespaces_yields_empty_unit() {
        let unit = StructuralExtractor::new().extract(&tree(vec![SyntaxNode::new(
            NodeKind::Class,
            "Global",
        )
        .with_modifier("public")]));
        assert!(unit.is_empty());
    }
}
