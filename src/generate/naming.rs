//! Naming conventions applied to generated code.

/// Private field name for an identifier: underscore prefix, first letter
/// lower-cased (`MyClass` → `_myClass`).
pub fn private_field_name(identifier: &str) -> String {
    let mut chars = identifier.chars();
    let mut name = String::with_capacity(identifier.len() + 1);
    name.push('_');
    if let Some(first) = chars.next() {
        name.extend(first.to_lowercase());
        name.push_str(chars.as_str());
    }
    name
}

/// Interface-naming heuristic used to decide whether a dependency is mocked.
///
/// Purely lexical: any type name starting with `I` qualifies.
pub fn is_mockable_type(type_name: &str) -> bool {
    type_name.trim_start().starts_with('I')
}
