//! Zero-value literals for primitive type names.

/// Literal used for every type without a value-type default
pub const NO_VALUE: &str = "null";

/// Primitive types with a known zero value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Char,
    String,
    Object,
}

impl PrimitiveType {
    /// Every primitive, in keyword-table order
    pub const ALL: [PrimitiveType; 15] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::SByte,
        PrimitiveType::Int16,
        PrimitiveType::UInt16,
        PrimitiveType::Int32,
        PrimitiveType::UInt32,
        PrimitiveType::Int64,
        PrimitiveType::UInt64,
        PrimitiveType::Single,
        PrimitiveType::Double,
        PrimitiveType::Decimal,
        PrimitiveType::Char,
        PrimitiveType::String,
        PrimitiveType::Object,
    ];

    /// Language keyword spelling
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "bool",
            PrimitiveType::Byte => "byte",
            PrimitiveType::SByte => "sbyte",
            PrimitiveType::Int16 => "short",
            PrimitiveType::UInt16 => "ushort",
            PrimitiveType::Int32 => "int",
            PrimitiveType::UInt32 => "uint",
            PrimitiveType::Int64 => "long",
            PrimitiveType::UInt64 => "ulong",
            PrimitiveType::Single => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "string",
            PrimitiveType::Object => "object",
        }
    }

    /// Canonical full type name
    pub fn canonical_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "System.Boolean",
            PrimitiveType::Byte => "System.Byte",
            PrimitiveType::SByte => "System.SByte",
            PrimitiveType::Int16 => "System.Int16",
            PrimitiveType::UInt16 => "System.UInt16",
            PrimitiveType::Int32 => "System.Int32",
            PrimitiveType::UInt32 => "System.UInt32",
            PrimitiveType::Int64 => "System.Int64",
            PrimitiveType::UInt64 => "System.UInt64",
            PrimitiveType::Single => "System.Single",
            PrimitiveType::Double => "System.Double",
            PrimitiveType::Decimal => "System.Decimal",
            PrimitiveType::Char => "System.Char",
            PrimitiveType::String => "System.String",
            PrimitiveType::Object => "System.Object",
        }
    }

    /// Zero-value literal
    pub fn zero_literal(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "false",
            PrimitiveType::Char => "'\\0'",
            PrimitiveType::String | PrimitiveType::Object => NO_VALUE,
            _ => "0",
        }
    }

    /// Resolve a type name written as a keyword, a canonical name, or the
    /// canonical name without its `System.` prefix
    pub fn resolve(type_name: &str) -> Option<Self> {
        let name = type_name.trim();
        let bare = name.strip_prefix("System.").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|ty| ty.keyword() == name || &ty.canonical_name()["System.".len()..] == bare)
    }
}

/// Maps type names to the literal used to initialise arranged values.
///
/// The table is total: unknown, user-defined and composite type names map
/// to [`NO_VALUE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueTable;

impl DefaultValueTable {
    /// Zero-value literal for a type name
    pub fn lookup(type_name: &str) -> &'static str {
        PrimitiveType::resolve(type_name)
            .map(PrimitiveType::zero_literal)
            .unwrap_or(NO_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keyword_literals() {
        assert_eq!(DefaultValueTable::lookup("bool"), "false");
        assert_eq!(DefaultValueTable::lookup("int"), "0");
        assert_eq!(DefaultValueTable::lookup("ulong"), "0");
        assert_eq!(DefaultValueTable::lookup("decimal"), "0");
        assert_eq!(DefaultValueTable::lookup("float"), "0");
        assert_eq!(DefaultValueTable::lookup("char"), "'\\0'");
        assert_eq!(DefaultValueTable::lookup("string"), "null");
        assert_eq!(DefaultValueTable::lookup("object"), "null");
    }

    #[test]
    fn test_canonical_spellings_resolve() {
        assert_eq!(DefaultValueTable::lookup("System.Int32"), "0");
        assert_eq!(DefaultValueTable::lookup("Boolean"), "false");
        assert_eq!(
            PrimitiveType::resolve(" short ").map(PrimitiveType::canonical_name),
            Some("System.Int16")
        );
    }

    #[test]
    fn test_unknown_types_have_no_value() {
        assert_eq!(DefaultValueTable::lookup("OperatingSystem"), NO_VALUE);
        assert_eq!(DefaultValueTable::lookup("int?"), NO_VALUE);
        assert_eq!(DefaultValueTable::lookup("List<int>"), NO_VALUE);
        assert_eq!(DefaultValueTable::lookup(""), NO_VALUE);
        assert_eq!(PrimitiveType::resolve("Customer"), None);
    }

    #[test]
    fn test_every_primitive_round_trips_through_keyword() {
        for ty in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::resolve(ty.keyword()), Some(ty));
            assert_eq!(PrimitiveType::resolve(ty.canonical_name()), Some(ty));
        }
    }

    proptest! {
        #[test]
        fn lookup_is_total(name in "\\PC*") {
            let literal = DefaultValueTable::lookup(&name);
            prop_assert!(!literal.is_empty());
        }
    }
}
