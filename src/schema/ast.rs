// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed ROS .msg message definitions.

use crate::core::{BagError, FieldValue, Result};

/// Primitive and complex kinds a message field can take.
///
/// `byte` is an alias for `Int8` and `char` an alias for `UInt8`, matching
/// the classic ROS1 serialization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean (1 byte, nonzero is true)
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Length-prefixed UTF-8 string
    String,
    /// Instant since the Unix epoch (u32 sec + u32 nsec)
    Time,
    /// Elapsed span (u32 sec + u32 nsec)
    Duration,
    /// Reference to a nested message definition
    Complex,
}

impl FieldKind {
    /// Parse a primitive kind from a type token.
    ///
    /// Returns `None` for anything that is not a primitive; callers treat
    /// such tokens as complex references.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(FieldKind::Bool),
            "int8" | "byte" => Some(FieldKind::Int8),
            "int16" => Some(FieldKind::Int16),
            "int32" => Some(FieldKind::Int32),
            "int64" => Some(FieldKind::Int64),
            "uint8" | "char" => Some(FieldKind::UInt8),
            "uint16" => Some(FieldKind::UInt16),
            "uint32" => Some(FieldKind::UInt32),
            "uint64" => Some(FieldKind::UInt64),
            "float32" => Some(FieldKind::Float32),
            "float64" => Some(FieldKind::Float64),
            "string" => Some(FieldKind::String),
            "time" => Some(FieldKind::Time),
            "duration" => Some(FieldKind::Duration),
            _ => None,
        }
    }

    /// Wire width in bytes, if fixed.
    ///
    /// `string` (length-prefixed) and `complex` have no fixed width.
    pub const fn wire_width(self) -> Option<usize> {
        match self {
            FieldKind::Bool | FieldKind::Int8 | FieldKind::UInt8 => Some(1),
            FieldKind::Int16 | FieldKind::UInt16 => Some(2),
            FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Float32 => Some(4),
            FieldKind::Int64 | FieldKind::UInt64 | FieldKind::Float64 => Some(8),
            FieldKind::Time | FieldKind::Duration => Some(8),
            FieldKind::String | FieldKind::Complex => None,
        }
    }

    /// Canonical name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt8 => "uint8",
            FieldKind::UInt16 => "uint16",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::String => "string",
            FieldKind::Time => "time",
            FieldKind::Duration => "duration",
            FieldKind::Complex => "complex",
        }
    }
}

/// Array shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// Not an array
    Scalar,
    /// Fixed-length array `T[N]`, N >= 1; no length prefix on the wire
    Fixed(usize),
    /// Dynamic array `T[]`; u32 length prefix on the wire
    Dynamic,
}

impl ArrayKind {
    /// Whether this field occupies an array slot.
    pub const fn is_array(self) -> bool {
        !matches!(self, ArrayKind::Scalar)
    }
}

/// One field of a message definition, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Field name as written in the definition
    pub name: String,
    /// Semantic kind
    pub kind: FieldKind,
    /// Array shape
    pub array: ArrayKind,
    /// Decoded constant; constant fields never consume wire bytes
    pub const_value: Option<FieldValue>,
    /// Resolved index into the primary definition's `nested` set
    pub complex: Option<usize>,
    /// Raw type token for complex references (diagnostics and resolution)
    pub type_name: Option<String>,
}

impl FieldDefinition {
    /// Create a primitive field definition.
    pub fn primitive(name: impl Into<String>, kind: FieldKind, array: ArrayKind) -> Self {
        Self {
            name: name.into(),
            kind,
            array,
            const_value: None,
            complex: None,
            type_name: None,
        }
    }

    /// Create a complex field definition referencing `type_name`.
    pub fn complex(name: impl Into<String>, type_name: impl Into<String>, array: ArrayKind) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Complex,
            array,
            const_value: None,
            complex: None,
            type_name: Some(type_name.into()),
        }
    }
}

/// A parsed message definition: the primary field list plus the flat set of
/// nested definitions the primary (and the nested entries themselves) may
/// reference.
///
/// Complex references are stored as indices into `nested` rather than
/// pointers, so the structure stays acyclic and cheaply cloneable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDefinition {
    /// Fully-qualified type, e.g. `std_msgs/Header`. Optional for the
    /// primary definition, always present for nested entries.
    pub msg_type: Option<String>,
    /// Ordered field list
    pub fields: Vec<FieldDefinition>,
    /// Nested definitions, in the order they appeared in the source text
    pub nested: Vec<MessageDefinition>,
}

impl MessageDefinition {
    /// Look up a nested definition by suffix match on its type.
    ///
    /// A reference like `Header` matches a nested type `std_msgs/Header`.
    /// Ties are broken by the first match in declaration order.
    pub fn nested_by_suffix(&self, reference: &str) -> Option<usize> {
        self.nested.iter().position(|def| {
            def.msg_type
                .as_deref()
                .is_some_and(|t| t.ends_with(reference))
        })
    }

    /// Bind every complex-typed field (in the primary and in each nested
    /// definition) to its nested definition by suffix match.
    ///
    /// Fails with [`BagError::DefinitionParse`] if any reference stays
    /// unresolved.
    pub fn resolve(&mut self) -> Result<()> {
        let types: Vec<Option<String>> = self.nested.iter().map(|d| d.msg_type.clone()).collect();

        let find = |reference: &str| -> Option<usize> {
            types
                .iter()
                .position(|t| t.as_deref().is_some_and(|t| t.ends_with(reference)))
        };

        let bind = |field: &mut FieldDefinition| -> Result<()> {
            if field.kind != FieldKind::Complex {
                return Ok(());
            }
            let reference = field.type_name.as_deref().unwrap_or_default();
            match find(reference) {
                Some(idx) => {
                    field.complex = Some(idx);
                    Ok(())
                }
                None => Err(BagError::definition(
                    "msg schema",
                    format!(
                        "unresolved complex type '{reference}' for field '{}'",
                        field.name
                    ),
                )),
            }
        };

        for field in &mut self.fields {
            bind(field)?;
        }
        for def in &mut self.nested {
            for field in &mut def.fields {
                bind(field)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_from_str() {
        assert_eq!(FieldKind::try_from_str("int32"), Some(FieldKind::Int32));
        assert_eq!(FieldKind::try_from_str("float64"), Some(FieldKind::Float64));
        assert_eq!(FieldKind::try_from_str("time"), Some(FieldKind::Time));
        assert_eq!(FieldKind::try_from_str("Header"), None);
    }

    #[test]
    fn test_byte_and_char_aliases() {
        assert_eq!(FieldKind::try_from_str("byte"), Some(FieldKind::Int8));
        assert_eq!(FieldKind::try_from_str("char"), Some(FieldKind::UInt8));
    }

    #[test]
    fn test_wire_width() {
        assert_eq!(FieldKind::Bool.wire_width(), Some(1));
        assert_eq!(FieldKind::Int16.wire_width(), Some(2));
        assert_eq!(FieldKind::UInt32.wire_width(), Some(4));
        assert_eq!(FieldKind::Float64.wire_width(), Some(8));
        assert_eq!(FieldKind::Time.wire_width(), Some(8));
        assert_eq!(FieldKind::String.wire_width(), None);
        assert_eq!(FieldKind::Complex.wire_width(), None);
    }

    #[test]
    fn test_array_kind() {
        assert!(!ArrayKind::Scalar.is_array());
        assert!(ArrayKind::Fixed(3).is_array());
        assert!(ArrayKind::Dynamic.is_array());
    }

    fn nested_def(msg_type: &str) -> MessageDefinition {
        MessageDefinition {
            msg_type: Some(msg_type.to_string()),
            fields: vec![FieldDefinition::primitive(
                "x",
                FieldKind::Float64,
                ArrayKind::Scalar,
            )],
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_nested_by_suffix() {
        let def = MessageDefinition {
            msg_type: Some("geometry_msgs/PoseStamped".to_string()),
            fields: Vec::new(),
            nested: vec![nested_def("std_msgs/Header"), nested_def("geometry_msgs/Pose")],
        };

        assert_eq!(def.nested_by_suffix("Header"), Some(0));
        assert_eq!(def.nested_by_suffix("std_msgs/Header"), Some(0));
        assert_eq!(def.nested_by_suffix("Pose"), Some(1));
        assert_eq!(def.nested_by_suffix("Twist"), None);
    }

    #[test]
    fn test_suffix_tie_breaks_by_first_match() {
        let def = MessageDefinition {
            msg_type: None,
            fields: Vec::new(),
            nested: vec![nested_def("pkg_a/Point"), nested_def("pkg_b/Point")],
        };
        assert_eq!(def.nested_by_suffix("Point"), Some(0));
    }

    #[test]
    fn test_resolve_binds_indices() {
        let mut def = MessageDefinition {
            msg_type: None,
            fields: vec![
                FieldDefinition::complex("header", "Header", ArrayKind::Scalar),
                FieldDefinition::primitive("count", FieldKind::UInt32, ArrayKind::Scalar),
            ],
            nested: vec![nested_def("std_msgs/Header")],
        };

        def.resolve().unwrap();
        assert_eq!(def.fields[0].complex, Some(0));
        assert_eq!(def.fields[1].complex, None);
    }

    #[test]
    fn test_resolve_nested_references() {
        let mut inner = nested_def("geometry_msgs/PoseStamped");
        inner
            .fields
            .push(FieldDefinition::complex("pose", "Pose", ArrayKind::Scalar));

        let mut def = MessageDefinition {
            msg_type: None,
            fields: vec![FieldDefinition::complex(
                "stamped",
                "PoseStamped",
                ArrayKind::Scalar,
            )],
            nested: vec![inner, nested_def("geometry_msgs/Pose")],
        };

        def.resolve().unwrap();
        assert_eq!(def.fields[0].complex, Some(0));
        // the nested definition's own complex field binds into the same flat set
        assert_eq!(def.nested[0].fields[1].complex, Some(1));
    }

    #[test]
    fn test_resolve_unresolved_is_error() {
        let mut def = MessageDefinition {
            msg_type: None,
            fields: vec![FieldDefinition::complex("p", "Missing", ArrayKind::Scalar)],
            nested: Vec::new(),
        };

        let err = def.resolve().unwrap_err();
        assert!(matches!(err, BagError::DefinitionParse { .. }));
        assert!(err.to_string().contains("Missing"));
    }
}
