//! NUnit/Moq test scaffold generation.
//!
//! [`ScaffoldGenerator`] turns one [`SourceUnit`] into one
//! [`GeneratedArtifact`]. Output only depends on the unit and the configured
//! indent, so identical units always produce identical text.

use tracing::debug;

use crate::core::config::GenerationConfig;
use crate::core::errors::{Result, TestforgeError};
use crate::core::model::{ClassInfo, GeneratedArtifact, MemberSignature, SourceUnit};
use crate::generate::defaults::DefaultValueTable;
use crate::generate::naming::{is_mockable_type, private_field_name};
use crate::generate::templates;

/// Line buffer with an explicit nesting depth.
///
/// Every appended line is prefixed with one indent unit per open block.
#[derive(Debug)]
struct CodeWriter<'a> {
    indent: &'a str,
    depth: usize,
    buffer: String,
}

impl<'a> CodeWriter<'a> {
    fn new(indent: &'a str) -> Self {
        Self {
            indent,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.buffer.push_str(self.indent);
        }
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    /// Blank separator lines carry no indentation
    fn blank(&mut self) {
        self.buffer.push('\n');
    }

    fn open_block(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    fn close_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.buffer
    }
}

/// A constructor dependency of the class under test
#[derive(Debug)]
struct Dependency<'a> {
    field: String,
    type_name: &'a str,
    mocked: bool,
}

impl Dependency<'_> {
    fn argument(&self) -> String {
        if self.mocked {
            templates::mock_object(&self.field)
        } else {
            self.field.clone()
        }
    }
}

/// Generates one test scaffold per source unit
#[derive(Debug, Clone, Default)]
pub struct ScaffoldGenerator {
    config: GenerationConfig,
}

impl ScaffoldGenerator {
    /// Create a generator with default formatting
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from configuration
    pub fn with_config(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Generate the scaffold for a unit.
    ///
    /// The artifact is named after the first class of the unit. A unit
    /// without any class cannot name an artifact and is rejected.
    pub fn generate(&self, unit: &SourceUnit) -> Result<GeneratedArtifact> {
        let first_namespace = unit
            .namespaces
            .first()
            .ok_or_else(|| TestforgeError::generation("source unit has no namespace"))?;
        let first_class = unit.classes().next().ok_or_else(|| {
            TestforgeError::generation(format!(
                "namespace '{}' declares no class to name the scaffold after",
                first_namespace.name
            ))
        })?;

        let mut out = CodeWriter::new(&self.config.indent);

        for import in templates::BOILERPLATE_IMPORTS {
            out.line(templates::import(import));
        }
        for namespace in &unit.namespaces {
            out.line(templates::import(&namespace.name));
        }
        out.blank();

        out.open_block(templates::wrapper_namespace(&first_namespace.name));
        let mut classes = unit.classes().peekable();
        while let Some(class) = classes.next() {
            self.write_class(&mut out, class);
            if classes.peek().is_some() {
                out.blank();
            }
        }
        out.close_block();

        debug!(
            artifact = %first_class.name,
            classes = unit.class_count(),
            "generated scaffold"
        );

        Ok(GeneratedArtifact::new(first_class.name.clone(), out.finish()))
    }

    fn write_class(&self, out: &mut CodeWriter<'_>, class: &ClassInfo) {
        let subject = private_field_name(&class.name);
        let dependencies = constructor_dependencies(class);

        out.open_block(templates::test_class(&class.name));

        out.line(templates::field(&class.name, &subject));
        for dependency in &dependencies {
            if dependency.mocked {
                out.line(templates::field(
                    &templates::mock_type(dependency.type_name),
                    &dependency.field,
                ));
            } else {
                out.line(templates::initialized_field(
                    dependency.type_name,
                    &dependency.field,
                    DefaultValueTable::lookup(dependency.type_name),
                ));
            }
        }
        out.blank();

        out.line(templates::SETUP_ATTRIBUTE);
        out.open_block(templates::SETUP_SIGNATURE);
        if class.primary_constructor().is_some() {
            for dependency in dependencies.iter().filter(|d| d.mocked) {
                out.line(templates::mock_instantiation(
                    &dependency.field,
                    dependency.type_name,
                ));
            }
            let arguments: Vec<String> = dependencies.iter().map(Dependency::argument).collect();
            out.line(templates::construction(&subject, &class.name, &arguments));
        }
        out.close_block();

        for method in &class.methods {
            out.blank();
            write_test(out, &subject, method);
        }

        out.close_block();
    }
}

fn constructor_dependencies(class: &ClassInfo) -> Vec<Dependency<'_>> {
    class
        .primary_constructor()
        .map(|ctor| {
            ctor.parameters
                .iter()
                .map(|param| Dependency {
                    field: private_field_name(&param.name),
                    type_name: param.type_name.as_str(),
                    mocked: is_mockable_type(&param.type_name),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn write_test(out: &mut CodeWriter<'_>, subject: &str, method: &MemberSignature) {
    out.line(templates::TEST_ATTRIBUTE);
    out.open_block(templates::test_method(&method.name));

    // Arrange
    for param in &method.parameters {
        out.line(templates::local(
            &param.type_name,
            &param.name,
            DefaultValueTable::lookup(&param.type_name),
        ));
    }
    if !method.parameters.is_empty() {
        out.blank();
    }

    // Act
    let arguments: Vec<String> = method.parameters.iter().map(|p| p.name.clone()).collect();
    let return_type = method
        .return_type
        .as_deref()
        .filter(|_| method.returns_value());
    match return_type {
        Some(ret) => out.line(templates::captured_invocation(
            ret,
            subject,
            &method.name,
            &arguments,
        )),
        None => out.line(templates::invocation(subject, &method.name, &arguments)),
    }
    out.blank();

    // Assert
    if let Some(ret) = return_type {
        out.line(templates::expected(ret, DefaultValueTable::lookup(ret)));
        out.line(templates::EQUALITY_ASSERT);
    }
    out.line(templates::NOT_IMPLEMENTED_ASSERT);

    out.close_block();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::NamespaceInfo;
    use pretty_assertions::assert_eq;

    fn my_class_unit() -> SourceUnit {
        SourceUnit::new(vec![NamespaceInfo::new("UnitTest.Files").with_class(
            ClassInfo::new("MyClass")
                .with_constructor(MemberSignature::constructor("MyClass"))
                .with_method(MemberSignature::method("PublicVoidMethod1", "void"))
                .with_method(
                    MemberSignature::method("PublicVoidMethod2", "void")
                        .with_parameter("d", "decimal")
                        .with_parameter("os", "OperatingSystem"),
                ),
        )])
    }

    #[test]
    fn test_generates_expected_layout() {
        let artifact = ScaffoldGenerator::new().generate(&my_class_unit()).unwrap();
        assert_eq!(artifact.name, "MyClass");

        let expected = "\
using System;
using System.Collections.Generic;
using System.Linq;
using System.Text;
using NUnit.Framework;
using Moq;
using UnitTest.Files;

namespace UnitTest.Files.Tests
{
    public class MyClassTests
    {
        private MyClass _myClass;

        [SetUp]
        public void SetUp()
        {
            _myClass = new MyClass();
        }

        [Test]
        public void PublicVoidMethod1Test()
        {
            _myClass.PublicVoidMethod1();

            Assert.Fail(\"autogenerated\");
        }

        [Test]
        public void PublicVoidMethod2Test()
        {
            decimal d = 0;
            OperatingSystem os = null;

            _myClass.PublicVoidMethod2(d, os);

            Assert.Fail(\"autogenerated\");
        }
    }
}
";
        assert_eq!(artifact.content, expected);
    }

    #[test]
    fn test_mock_heuristic_for_constructor_dependencies() {
        let unit = SourceUnit::new(vec![NamespaceInfo::new("Shop").with_class(
            ClassInfo::new("OrderService").with_constructor(
                MemberSignature::constructor("OrderService")
                    .with_parameter("repository", "IOrderRepository")
                    .with_parameter("retries", "int")
                    .with_parameter("clock", "Clock"),
            ),
        )]);

        let content = ScaffoldGenerator::new().generate(&unit).unwrap().content;

        assert!(content.contains("        private Mock<IOrderRepository> _repository;\n"));
        assert!(content.contains("        private int _retries = 0;\n"));
        assert!(content.contains("        private Clock _clock = null;\n"));
        assert!(!content.contains("IOrderRepository _repository ="));
        assert!(content.contains("            _repository = new Mock<IOrderRepository>();\n"));
        assert!(content.contains(
            "            _orderService = new OrderService(_repository.Object, _retries, _clock);\n"
        ));
    }

    #[test]
    fn test_value_returning_method_asserts_on_result() {
        let unit = SourceUnit::new(vec![NamespaceInfo::new("Math").with_class(
            ClassInfo::new("Calculator").with_method(
                MemberSignature::method("Add", "int")
                    .with_parameter("a", "int")
                    .with_parameter("b", "int"),
            ),
        )]);

        let content = ScaffoldGenerator::new().generate(&unit).unwrap().content;

        assert!(content.contains("            int actual = _calculator.Add(a, b);\n"));
        assert!(content.contains("            int expected = 0;\n"));
        assert!(content.contains("            Assert.That(actual, Is.EqualTo(expected));\n"));
        // no constructor, so setup has nothing to build
        assert!(!content.contains("new Calculator("));
    }

    #[test]
    fn test_every_class_is_emitted_but_first_names_artifact() {
        let unit = SourceUnit::new(vec![
            NamespaceInfo::new("Empty"),
            NamespaceInfo::new("A").with_class(ClassInfo::new("Alpha")),
            NamespaceInfo::new("B").with_class(ClassInfo::new("Beta")),
        ]);

        let artifact = ScaffoldGenerator::new().generate(&unit).unwrap();
        assert_eq!(artifact.name, "Alpha");
        assert!(artifact.content.contains("namespace Empty.Tests\n"));
        assert!(artifact.content.contains("using A;\nusing B;\n"));
        assert!(artifact.content.contains("public class AlphaTests"));
        assert!(artifact.content.contains("public class BetaTests"));
    }

    #[test]
    fn test_unit_without_classes_is_rejected() {
        let unit = SourceUnit::new(vec![NamespaceInfo::new("Nothing")]);
        let err = ScaffoldGenerator::new().generate(&unit).unwrap_err();
        assert!(matches!(err, TestforgeError::Generation { .. }));

        let err = ScaffoldGenerator::new()
            .generate(&SourceUnit::default())
            .unwrap_err();
        assert!(matches!(err, TestforgeError::Generation { .. }));
    }

    #[test]
    fn test_identical_units_generate_identical_text() {
        let generator = ScaffoldGenerator::new();
        let first = generator.generate(&my_class_unit()).unwrap();
        let second = generator.generate(&my_class_unit()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_indent_is_applied_per_level() {
        let generator = ScaffoldGenerator::with_config(GenerationConfig {
            indent: "\t".to_string(),
        });
        let content = generator.generate(&my_class_unit()).unwrap().content;
        assert!(content.contains("\n\tpublic class MyClassTests\n"));
        assert!(content.contains("\n\t\t\t_myClass = new MyClass();\n"));
    }
}
