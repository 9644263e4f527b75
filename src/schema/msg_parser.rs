// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG format parser using Pest.
//!
//! Parses the textual `.msg` grammar carried in bag connection records:
//! - Field lists for the root message
//! - Dependency blocks with "MSG: TypeName" headers
//! - Array types: T[] (dynamic) or T[n] (fixed)
//! - Nested types: package/MessageName, resolved by suffix
//! - Constants: `<type> NAME = value` (scalar primitives only)
//! - Comments (# style) and separator lines (=====)
//!
//! The grammar splits the text into blocks and field lines; field and
//! constant parsing is string-level on the atomic line tokens.

use pest::Parser;
use pest_derive::Parser;

use crate::core::{BagError, FieldValue, Result};
use crate::schema::ast::{ArrayKind, FieldDefinition, FieldKind, MessageDefinition};

/// Pest parser for ROS .msg definition text.
#[derive(Parser)]
#[grammar = "schema/msg.pest"] // Path relative to src/ directory
struct MsgGrammar;

/// Parse a `.msg` definition into a resolved [`MessageDefinition`].
///
/// `msg_type` is the fully-qualified type of the primary message as
/// declared by the connection record (e.g. `std_msgs/Int32`); it is
/// attached to the primary definition when present.
pub fn parse_definition(msg_type: Option<&str>, text: &str) -> Result<MessageDefinition> {
    let pairs = MsgGrammar::parse(Rule::schema, text)
        .map_err(|e| BagError::definition("msg schema", e.to_string()))?;

    let mut definition = MessageDefinition {
        msg_type: msg_type.map(str::to_string),
        fields: Vec::new(),
        nested: Vec::new(),
    };

    for pair in pairs {
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::EOI => {}
                Rule::root_msg => {
                    for field_item in item.into_inner() {
                        if let Some(field) = parse_msg_line(field_item.as_str())? {
                            definition.fields.push(field);
                        }
                    }
                }
                Rule::dependency_msg => {
                    let mut inner = item.into_inner();

                    let header = inner.next().ok_or_else(|| {
                        BagError::definition("msg schema", "dependency block without header")
                    })?;
                    let nested_type = parse_dependency_header(header.as_str())?;

                    let mut nested = MessageDefinition {
                        msg_type: Some(nested_type),
                        fields: Vec::new(),
                        nested: Vec::new(),
                    };
                    for field_item in inner {
                        if let Some(field) = parse_msg_line(field_item.as_str())? {
                            nested.fields.push(field);
                        }
                    }
                    definition.nested.push(nested);
                }
                _ => {}
            }
        }
    }

    definition.resolve()?;
    Ok(definition)
}

/// Extract the nested type from a "MSG: <package>/<Name>" line.
///
/// The type is the last whitespace-separated token on the line.
fn parse_dependency_header(line: &str) -> Result<String> {
    let stripped = line.trim().strip_prefix("MSG:").unwrap_or(line).trim();
    stripped
        .split_whitespace()
        .next_back()
        .map(str::to_string)
        .ok_or_else(|| BagError::definition("msg schema", "missing type in MSG introducer"))
}

/// Parse one field declaration line into a [`FieldDefinition`].
///
/// Returns `Ok(None)` when the line is empty after comment stripping.
fn parse_msg_line(raw: &str) -> Result<Option<FieldDefinition>> {
    // Trailing '#' comments are stripped for every line, including string
    // constants.
    let line = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (type_expr, rest) = match line.find(|c: char| c.is_whitespace()) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => {
            return Err(BagError::definition(
                "msg schema",
                format!("field declaration '{line}' is missing a name"),
            ))
        }
    };

    let (kind, array, type_name) = parse_type_expr(type_expr)?;

    // Split off a constant assignment if present. The first '=' separates
    // the name from the value; the value itself may contain '='.
    let (name, const_text) = match rest.find('=') {
        Some(eq) => (rest[..eq].trim_end(), Some(rest[eq + 1..].trim())),
        None => (rest, None),
    };

    if name.is_empty() || name.split_whitespace().count() != 1 {
        return Err(BagError::definition(
            "msg schema",
            format!("invalid field name in declaration '{line}'"),
        ));
    }

    let const_value = match const_text {
        Some(text) => Some(parse_constant(name, kind, array, text)?),
        None => None,
    };

    let mut field = match type_name {
        Some(reference) => FieldDefinition::complex(name, reference, array),
        None => FieldDefinition::primitive(name, kind, array),
    };
    field.const_value = const_value;
    Ok(Some(field))
}

/// Parse a type expression: base token plus optional `[N]` / `[]` suffix.
///
/// Returns the kind, array shape, and (for complex references) the raw
/// type token.
fn parse_type_expr(type_expr: &str) -> Result<(FieldKind, ArrayKind, Option<String>)> {
    let (base, array) = match type_expr.find('[') {
        Some(bracket) => {
            let base = &type_expr[..bracket];
            let suffix = &type_expr[bracket..];

            let inner = suffix
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .ok_or_else(|| {
                    BagError::definition(
                        "msg schema",
                        format!("malformed array suffix in '{type_expr}'"),
                    )
                })?;

            let array = if inner.is_empty() {
                ArrayKind::Dynamic
            } else {
                let n: usize = inner.parse().map_err(|_| {
                    BagError::definition(
                        "msg schema",
                        format!("invalid array length '{inner}' in '{type_expr}'"),
                    )
                })?;
                if n == 0 {
                    return Err(BagError::definition(
                        "msg schema",
                        format!("fixed array length must be >= 1 in '{type_expr}'"),
                    ));
                }
                ArrayKind::Fixed(n)
            };
            (base, array)
        }
        None => (type_expr, ArrayKind::Scalar),
    };

    if base.is_empty() {
        return Err(BagError::definition(
            "msg schema",
            format!("missing base type in '{type_expr}'"),
        ));
    }

    match FieldKind::try_from_str(base) {
        Some(kind) => Ok((kind, array, None)),
        None => Ok((FieldKind::Complex, array, Some(base.to_string()))),
    }
}

/// Parse a constant value according to the field kind.
///
/// Constants are only permitted on scalar primitive fields other than
/// `time`/`duration`.
fn parse_constant(
    name: &str,
    kind: FieldKind,
    array: ArrayKind,
    text: &str,
) -> Result<FieldValue> {
    if array.is_array() {
        return Err(BagError::definition(
            "msg schema",
            format!("constant '{name}' is not permitted on an array field"),
        ));
    }

    let invalid = |what: &str| {
        BagError::definition(
            "msg schema",
            format!("invalid {what} constant '{text}' for field '{name}'"),
        )
    };

    match kind {
        FieldKind::Bool => {
            let v: i64 = text.parse().map_err(|_| invalid("bool"))?;
            Ok(FieldValue::Bool(v != 0))
        }
        FieldKind::Int8 => Ok(FieldValue::Int8(text.parse().map_err(|_| invalid("int8"))?)),
        FieldKind::Int16 => Ok(FieldValue::Int16(
            text.parse().map_err(|_| invalid("int16"))?,
        )),
        FieldKind::Int32 => Ok(FieldValue::Int32(
            text.parse().map_err(|_| invalid("int32"))?,
        )),
        FieldKind::Int64 => Ok(FieldValue::Int64(
            text.parse().map_err(|_| invalid("int64"))?,
        )),
        FieldKind::UInt8 => Ok(FieldValue::UInt8(
            text.parse().map_err(|_| invalid("uint8"))?,
        )),
        FieldKind::UInt16 => Ok(FieldValue::UInt16(
            text.parse().map_err(|_| invalid("uint16"))?,
        )),
        FieldKind::UInt32 => Ok(FieldValue::UInt32(
            text.parse().map_err(|_| invalid("uint32"))?,
        )),
        FieldKind::UInt64 => Ok(FieldValue::UInt64(
            text.parse().map_err(|_| invalid("uint64"))?,
        )),
        FieldKind::Float32 => Ok(FieldValue::Float32(
            text.parse().map_err(|_| invalid("float32"))?,
        )),
        FieldKind::Float64 => Ok(FieldValue::Float64(
            text.parse().map_err(|_| invalid("float64"))?,
        )),
        FieldKind::String => Ok(FieldValue::String(text.to_string())),
        FieldKind::Time | FieldKind::Duration | FieldKind::Complex => Err(BagError::definition(
            "msg schema",
            format!(
                "constant '{name}' is not permitted on a {} field",
                kind.name()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_field() {
        let def = parse_definition(Some("test/Msg"), "int32 value").unwrap();
        assert_eq!(def.msg_type.as_deref(), Some("test/Msg"));
        assert_eq!(def.fields.len(), 1);
        assert_eq!(def.fields[0].name, "value");
        assert_eq!(def.fields[0].kind, FieldKind::Int32);
        assert_eq!(def.fields[0].array, ArrayKind::Scalar);
    }

    #[test]
    fn test_parse_multiple_fields_keep_order() {
        let def = parse_definition(None, "int32 x\nfloat64 y\nstring label\n").unwrap();
        let names: Vec<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "label"]);
    }

    #[test]
    fn test_parse_dynamic_array() {
        let def = parse_definition(None, "uint8[] pixels").unwrap();
        assert_eq!(def.fields[0].kind, FieldKind::UInt8);
        assert_eq!(def.fields[0].array, ArrayKind::Dynamic);
    }

    #[test]
    fn test_parse_fixed_array() {
        let def = parse_definition(None, "float32[3] position").unwrap();
        assert_eq!(def.fields[0].kind, FieldKind::Float32);
        assert_eq!(def.fields[0].array, ArrayKind::Fixed(3));
    }

    #[test]
    fn test_fixed_array_length_zero_is_error() {
        let err = parse_definition(None, "float32[0] position").unwrap_err();
        assert!(matches!(err, BagError::DefinitionParse { .. }));
    }

    #[test]
    fn test_malformed_array_suffix_is_error() {
        assert!(parse_definition(None, "int32[ x").is_err());
        assert!(parse_definition(None, "int32[3 x").is_err());
        assert!(parse_definition(None, "int32[a] x").is_err());
    }

    #[test]
    fn test_byte_char_aliases() {
        let def = parse_definition(None, "byte b\nchar c").unwrap();
        assert_eq!(def.fields[0].kind, FieldKind::Int8);
        assert_eq!(def.fields[1].kind, FieldKind::UInt8);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# leading comment\n\nint32 x  # trailing comment\n\n# another\nuint8 y\n";
        let def = parse_definition(None, text).unwrap();
        assert_eq!(def.fields.len(), 2);
        assert_eq!(def.fields[0].name, "x");
        assert_eq!(def.fields[1].name, "y");
    }

    #[test]
    fn test_nested_block_resolution() {
        let text = "\
Header header
uint32 seq
================================================================================
MSG: std_msgs/Header
time stamp
string frame_id
";
        let def = parse_definition(Some("test/Stamped"), text).unwrap();
        assert_eq!(def.fields.len(), 2);
        assert_eq!(def.fields[0].kind, FieldKind::Complex);
        assert_eq!(def.fields[0].complex, Some(0));
        assert_eq!(def.nested.len(), 1);
        assert_eq!(def.nested[0].msg_type.as_deref(), Some("std_msgs/Header"));
        assert_eq!(def.nested[0].fields.len(), 2);
    }

    #[test]
    fn test_nested_block_without_separator() {
        let text = "Header header\nMSG: std_msgs/Header\ntime stamp\n";
        let def = parse_definition(None, text).unwrap();
        assert_eq!(def.nested.len(), 1);
        assert_eq!(def.fields[0].complex, Some(0));
    }

    #[test]
    fn test_cross_references_between_nested_blocks() {
        let text = "\
geometry_msgs/PoseStamped[] poses
===
MSG: geometry_msgs/PoseStamped
Header header
Pose pose
===
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
===
MSG: geometry_msgs/Pose
float64 x
float64 y
";
        let def = parse_definition(Some("nav_msgs/Path"), text).unwrap();
        assert_eq!(def.fields[0].array, ArrayKind::Dynamic);
        assert_eq!(def.fields[0].complex, Some(0));
        assert_eq!(def.nested[0].fields[0].complex, Some(1)); // Header
        assert_eq!(def.nested[0].fields[1].complex, Some(2)); // Pose
    }

    #[test]
    fn test_unresolved_reference_is_error() {
        let err = parse_definition(None, "Missing thing\n").unwrap_err();
        assert!(err.to_string().contains("unresolved complex type"));
    }

    #[test]
    fn test_int_constant() {
        let def = parse_definition(None, "int32 STATE = -1\nint32 x\n").unwrap();
        assert_eq!(def.fields[0].const_value, Some(FieldValue::Int32(-1)));
        assert_eq!(def.fields[1].const_value, None);
    }

    #[test]
    fn test_constant_without_spaces() {
        let def = parse_definition(None, "uint8 DEBUG=1").unwrap();
        assert_eq!(def.fields[0].name, "DEBUG");
        assert_eq!(def.fields[0].const_value, Some(FieldValue::UInt8(1)));
    }

    #[test]
    fn test_bool_constant() {
        let def = parse_definition(None, "bool YES = 1\nbool NO = 0").unwrap();
        assert_eq!(def.fields[0].const_value, Some(FieldValue::Bool(true)));
        assert_eq!(def.fields[1].const_value, Some(FieldValue::Bool(false)));
    }

    #[test]
    fn test_float_constant_with_exponent() {
        let def = parse_definition(None, "float64 EPS = -1.5e-3").unwrap();
        assert_eq!(def.fields[0].const_value, Some(FieldValue::Float64(-1.5e-3)));
    }

    #[test]
    fn test_string_constant_verbatim() {
        let def = parse_definition(None, "string GREETING =  hello world  ").unwrap();
        assert_eq!(
            def.fields[0].const_value,
            Some(FieldValue::String("hello world".to_string()))
        );
    }

    #[test]
    fn test_string_constant_trailing_comment_stripped() {
        let def = parse_definition(None, "string NAME = value # not part of it").unwrap();
        assert_eq!(
            def.fields[0].const_value,
            Some(FieldValue::String("value".to_string()))
        );
    }

    #[test]
    fn test_string_constant_keeps_inner_equals() {
        let def = parse_definition(None, "string EXPR = a=b").unwrap();
        assert_eq!(
            def.fields[0].const_value,
            Some(FieldValue::String("a=b".to_string()))
        );
    }

    #[test]
    fn test_constant_on_array_is_error() {
        let err = parse_definition(None, "int32[] X = 1").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_constant_on_time_is_error() {
        assert!(parse_definition(None, "time T = 1").is_err());
        assert!(parse_definition(None, "duration D = 1").is_err());
    }

    #[test]
    fn test_unconvertible_constant_is_error() {
        assert!(parse_definition(None, "int8 X = 200").is_err());
        assert!(parse_definition(None, "uint8 X = -1").is_err());
        assert!(parse_definition(None, "float32 X = abc").is_err());
        assert!(parse_definition(None, "bool X = maybe").is_err());
    }

    #[test]
    fn test_missing_field_name_is_error() {
        assert!(parse_definition(None, "int32\n").is_err());
    }

    #[test]
    fn test_empty_definition() {
        let def = parse_definition(None, "").unwrap();
        assert!(def.fields.is_empty());
        assert!(def.nested.is_empty());
    }

    #[test]
    fn test_definition_without_trailing_newline() {
        let def = parse_definition(None, "int32 x").unwrap();
        assert_eq!(def.fields.len(), 1);
    }

    #[test]
    fn test_trailing_separator_lines() {
        let def = parse_definition(None, "int32 x\n===\n\n").unwrap();
        assert_eq!(def.fields.len(), 1);
        assert!(def.nested.is_empty());
    }

    #[test]
    fn test_suffix_tie_first_block_wins() {
        let text = "\
Point p
===
MSG: pkg_a/Point
float64 x
===
MSG: pkg_b/Point
float32 y
";
        let def = parse_definition(None, text).unwrap();
        assert_eq!(def.fields[0].complex, Some(0));
    }

    #[test]
    fn test_realistic_imu_definition() {
        let text = "\
# Inertial measurement sample
Header header
geometry_msgs/Quaternion orientation
float64[9] orientation_covariance
geometry_msgs/Vector3 angular_velocity
float64[9] angular_velocity_covariance

================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id

================================================================================
MSG: geometry_msgs/Quaternion
float64 x
float64 y
float64 z
float64 w

================================================================================
MSG: geometry_msgs/Vector3
float64 x
float64 y
float64 z
";
        let def = parse_definition(Some("sensor_msgs/Imu"), text).unwrap();
        assert_eq!(def.fields.len(), 5);
        assert_eq!(def.nested.len(), 3);
        assert_eq!(def.fields[0].complex, Some(0));
        assert_eq!(def.fields[1].complex, Some(1));
        assert_eq!(def.fields[3].complex, Some(2));
        assert_eq!(def.fields[2].array, ArrayKind::Fixed(9));
    }
}
