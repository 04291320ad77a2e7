//! Fixed NUnit/Moq text fragments emitted by the scaffold generator.

/// Imports emitted at the top of every scaffold
pub const BOILERPLATE_IMPORTS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Text",
    "NUnit.Framework",
    "Moq",
];

pub const SETUP_ATTRIBUTE: &str = "[SetUp]";
pub const SETUP_SIGNATURE: &str = "public void SetUp()";
pub const TEST_ATTRIBUTE: &str = "[Test]";
pub const NOT_IMPLEMENTED_ASSERT: &str = "Assert.Fail(\"autogenerated\");";
pub const EQUALITY_ASSERT: &str = "Assert.That(actual, Is.EqualTo(expected));";

/// Suffix of the wrapper namespace and of each generated class and test
pub const TESTS_SUFFIX: &str = "Tests";
pub const TEST_METHOD_SUFFIX: &str = "Test";

pub fn import(namespace: &str) -> String {
    format!("using {namespace};")
}

pub fn wrapper_namespace(namespace: &str) -> String {
    format!("namespace {namespace}.{TESTS_SUFFIX}")
}

pub fn test_class(class_name: &str) -> String {
    format!("public class {class_name}{TESTS_SUFFIX}")
}

pub fn test_method(method_name: &str) -> String {
    format!("public void {method_name}{TEST_METHOD_SUFFIX}()")
}

pub fn mock_type(type_name: &str) -> String {
    format!("Mock<{type_name}>")
}

/// Argument expression passing a mock's underlying object
pub fn mock_object(field: &str) -> String {
    format!("{field}.Object")
}

pub fn field(type_name: &str, name: &str) -> String {
    format!("private {type_name} {name};")
}

pub fn initialized_field(type_name: &str, name: &str, literal: &str) -> String {
    format!("private {type_name} {name} = {literal};")
}

pub fn local(type_name: &str, name: &str, literal: &str) -> String {
    format!("{type_name} {name} = {literal};")
}

pub fn mock_instantiation(field: &str, type_name: &str) -> String {
    format!("{field} = new {}();", mock_type(type_name))
}

pub fn construction(field: &str, class_name: &str, arguments: &[String]) -> String {
    format!("{field} = new {class_name}({});", arguments.join(", "))
}

pub fn invocation(target: &str, method: &str, arguments: &[String]) -> String {
    format!("{target}.{method}({});", arguments.join(", "))
}

pub fn captured_invocation(
    return_type: &str,
    target: &str,
    method: &str,
    arguments: &[String],
) -> String {
    format!(
        "{return_type} actual = {}",
        invocation(target, method, arguments)
    )
}

pub fn expected(return_type: &str, literal: &str) -> String {
    format!("{return_type} expected = {literal};")
}
