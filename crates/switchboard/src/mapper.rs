//! Mapping from declared argument types to platform option kinds.

use std::fmt;

use switchboard_contract::OptionKind;
use thiserror::Error;

/// Declared type of one argument field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// Owned text.
    String,
    /// Signed integer.
    Integer,
    /// Unsigned integer.
    UnsignedInteger,
    /// Boolean flag.
    Boolean,
    /// Floating-point number.
    Float,
    /// Platform user entity.
    User,
    /// Guild channel entity.
    Channel,
    /// Guild role entity.
    Role,
    /// Uploaded file entity.
    Attachment,
    /// Value that may be omitted by the caller.
    Optional(Box<DeclaredType>),
    /// Type without an option-kind mapping, carried by name for error reporting.
    Unsupported(String),
}

impl DeclaredType {
    /// Wraps `inner` in one level of optionality.
    pub fn optional(inner: DeclaredType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Whether the outermost layer is optional.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Integer => f.write_str("integer"),
            Self::UnsignedInteger => f.write_str("unsigned integer"),
            Self::Boolean => f.write_str("bool"),
            Self::Float => f.write_str("float"),
            Self::User => f.write_str("User"),
            Self::Channel => f.write_str("Channel"),
            Self::Role => f.write_str("Role"),
            Self::Attachment => f.write_str("Attachment"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Result of mapping a [`DeclaredType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedKind {
    /// Platform option kind.
    pub kind: OptionKind,
    /// Whether the source type was unsigned, which requires a `min_value` of zero.
    pub unsigned: bool,
}

/// The declared type has no option-kind mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported argument type `{type_name}`")]
pub struct UnsupportedType {
    /// Name of the unsupported type.
    pub type_name: String,
}

/// Maps a declared type to its option kind, unwrapping every optional layer.
///
/// # Errors
///
/// Returns [`UnsupportedType`] when the innermost type has no mapping.
pub fn map_type(declared: &DeclaredType) -> Result<MappedKind, UnsupportedType> {
    let (kind, unsigned) = match declared {
        DeclaredType::Optional(inner) => return map_type(inner),
        DeclaredType::String => (OptionKind::String, false),
        DeclaredType::Integer => (OptionKind::Integer, false),
        DeclaredType::UnsignedInteger => (OptionKind::Integer, true),
        DeclaredType::Boolean => (OptionKind::Boolean, false),
        DeclaredType::Float => (OptionKind::Number, false),
        DeclaredType::User => (OptionKind::User, false),
        DeclaredType::Channel => (OptionKind::Channel, false),
        DeclaredType::Role => (OptionKind::Role, false),
        DeclaredType::Attachment => (OptionKind::Attachment, false),
        DeclaredType::Unsupported(name) => {
            return Err(UnsupportedType {
                type_name: name.clone(),
            })
        }
    };
    Ok(MappedKind { kind, unsigned })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_supported_type() {
        let cases = [
            (DeclaredType::String, OptionKind::String),
            (DeclaredType::Integer, OptionKind::Integer),
            (DeclaredType::UnsignedInteger, OptionKind::Integer),
            (DeclaredType::Boolean, OptionKind::Boolean),
            (DeclaredType::Float, OptionKind::Number),
            (DeclaredType::User, OptionKind::User),
            (DeclaredType::Channel, OptionKind::Channel),
            (DeclaredType::Role, OptionKind::Role),
            (DeclaredType::Attachment, OptionKind::Attachment),
        ];
        for (declared, kind) in cases {
            assert_eq!(map_type(&declared).expect("mapped").kind, kind);
        }
    }

    #[test]
    fn only_unsigned_integers_are_flagged() {
        assert!(map_type(&DeclaredType::UnsignedInteger).expect("mapped").unsigned);
        assert!(!map_type(&DeclaredType::Integer).expect("mapped").unsigned);
        assert!(!map_type(&DeclaredType::Float).expect("mapped").unsigned);
    }

    #[test]
    fn nested_optionals_unwrap_to_inner_kind() {
        let declared = DeclaredType::optional(DeclaredType::optional(
            DeclaredType::UnsignedInteger,
        ));
        assert_eq!(
            map_type(&declared).expect("mapped"),
            MappedKind {
                kind: OptionKind::Integer,
                unsigned: true,
            }
        );
    }

    #[test]
    fn unsupported_type_fails_even_when_optional() {
        let declared =
            DeclaredType::optional(DeclaredType::Unsupported("HashMap<String, u8>".to_string()));
        let err = map_type(&declared).expect_err("should fail");
        assert_eq!(err.type_name, "HashMap<String, u8>");
    }
}
