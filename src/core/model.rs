//! Structural model of a source file's public surface.
//!
//! A [`SourceUnit`] is built once per input document by the
//! [`StructuralExtractor`](crate::core::extraction::StructuralExtractor) and
//! then handed downstream by value. Nothing in this module is mutated after
//! extraction; the builders exist only for the extractor and for tests.

use serde::{Deserialize, Serialize};

/// Root of one extracted input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Namespaces in declaration order; names may repeat.
    pub namespaces: Vec<NamespaceInfo>,
}

impl SourceUnit {
    /// Create a unit from its namespaces
    pub fn new(namespaces: Vec<NamespaceInfo>) -> Self {
        Self { namespaces }
    }

    /// True when the unit carries no namespace and must not be generated from
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Every class of every namespace, flattened in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.namespaces.iter().flat_map(|ns| ns.classes.iter())
    }

    /// Total number of classes across all namespaces
    pub fn class_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.classes.len()).sum()
    }
}

/// A namespace declaration and the classes it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Dotted namespace path exactly as written
    pub name: String,
    /// Classes declared (at any depth) below this namespace
    pub classes: Vec<ClassInfo>,
}

impl NamespaceInfo {
    /// Create a namespace with no classes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
        }
    }

    /// Append a class, builder style
    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.push(class);
        self
    }
}

/// A class and the members that passed the public-surface filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class identifier
    pub name: String,
    /// Public methods in declaration order
    pub methods: Vec<MemberSignature>,
    /// Retained constructors in declaration order
    pub constructors: Vec<MemberSignature>,
}

impl ClassInfo {
    /// Create a class with no members
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Append a method, builder style
    pub fn with_method(mut self, method: MemberSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Append a constructor, builder style
    pub fn with_constructor(mut self, constructor: MemberSignature) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// The constructor used to build the object under test, if any
    pub fn primary_constructor(&self) -> Option<&MemberSignature> {
        self.constructors.first()
    }
}

/// One parameter of a member signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter identifier
    pub name: String,
    /// Declared type text as written
    pub type_name: String,
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Signature of a method or constructor.
///
/// Constructors never carry a return type; methods always do, and `"void"`
/// is a present value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    /// Bare member name
    pub name: String,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Declared return type, absent for constructors
    pub return_type: Option<String>,
}

impl MemberSignature {
    /// Create a method signature
    pub fn method(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: Some(return_type.into()),
        }
    }

    /// Create a constructor signature
    pub fn constructor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
        }
    }

    /// Append a parameter, builder style
    pub fn with_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, type_name));
        self
    }

    /// True when invoking the member yields a value worth asserting on
    pub fn returns_value(&self) -> bool {
        self.return_type
            .as_deref()
            .is_some_and(|ty| ty.trim() != "void")
    }
}

/// Generated scaffold: suggested base name plus full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Base name before the test-file suffix is applied
    pub name: String,
    /// Full generated text
    pub content: String,
}

impl GeneratedArtifact {
    /// Create an artifact
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
