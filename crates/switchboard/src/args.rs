//! Static description of a handler's argument shape and the typed values marshalled into it.
//!
//! A slash handler's third parameter is a plain struct implementing [`CommandArgs`]. The struct
//! describes its fields once through [`ArgField`] builders and rebuilds itself from the
//! [`ArgValues`] produced by the marshaller:
//!
//! ```
//! use switchboard::{ArgField, ArgValues, CommandArgs, SwitchboardError};
//!
//! struct GreetArgs {
//!     name: String,
//!     count: i64,
//!     note: Option<String>,
//! }
//!
//! impl CommandArgs for GreetArgs {
//!     fn fields() -> Vec<ArgField> {
//!         vec![
//!             ArgField::of::<String>("name").description("Who to greet"),
//!             ArgField::of::<i64>("count")
//!                 .description("How many times")
//!                 .default_value("5"),
//!             ArgField::of::<Option<String>>("note").description("Optional note"),
//!         ]
//!     }
//!
//!     fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError> {
//!         Ok(Self {
//!             name: values.take("name")?,
//!             count: values.take("count")?,
//!             note: values.take("note")?,
//!         })
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use switchboard_contract::{Attachment, Channel, Role, User};

use crate::{error::SwitchboardError, mapper::DeclaredType};

/// One marshalled argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Optional field left unset.
    Absent,
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// Floating-point value.
    Number(f64),
    /// Resolved user.
    User(User),
    /// Resolved channel.
    Channel(Channel),
    /// Resolved role.
    Role(Role),
    /// Resolved attachment.
    Attachment(Attachment),
}

impl ArgValue {
    /// Stand-in value of `declared`, used to exercise an argument shape at registration.
    pub(crate) fn placeholder(declared: &DeclaredType) -> Self {
        match declared {
            DeclaredType::String => Self::String(String::new()),
            DeclaredType::Integer | DeclaredType::UnsignedInteger => Self::Integer(0),
            DeclaredType::Boolean => Self::Boolean(false),
            DeclaredType::Float => Self::Number(0.0),
            DeclaredType::User => Self::User(User {
                id: String::new(),
                username: String::new(),
                global_name: None,
                bot: false,
            }),
            DeclaredType::Channel => Self::Channel(Channel {
                id: String::new(),
                name: None,
                guild_id: None,
            }),
            DeclaredType::Role => Self::Role(Role {
                id: String::new(),
                name: String::new(),
                color: 0,
                position: 0,
            }),
            DeclaredType::Attachment => Self::Attachment(Attachment {
                id: String::new(),
                filename: String::new(),
                url: String::new(),
                size: 0,
                content_type: None,
            }),
            DeclaredType::Optional(_) | DeclaredType::Unsupported(_) => Self::Absent,
        }
    }
}

/// Rust type usable as an argument field.
pub trait ArgType: Sized {
    /// Declared type reported to the schema deriver.
    fn declared_type() -> DeclaredType;

    /// Extracts the value, returning `None` when it does not fit this type.
    fn from_arg(value: ArgValue) -> Option<Self>;
}

impl ArgType for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::String
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for i64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Integer
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for i32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Integer
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => i32::try_from(value).ok(),
            _ => None,
        }
    }
}

impl ArgType for u64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::UnsignedInteger
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }
}

impl ArgType for u32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::UnsignedInteger
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => u32::try_from(value).ok(),
            _ => None,
        }
    }
}

impl ArgType for bool {
    fn declared_type() -> DeclaredType {
        DeclaredType::Boolean
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for f64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Float
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Number(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for User {
    fn declared_type() -> DeclaredType {
        DeclaredType::User
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::User(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for Channel {
    fn declared_type() -> DeclaredType {
        DeclaredType::Channel
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Channel(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for Role {
    fn declared_type() -> DeclaredType {
        DeclaredType::Role
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Role(value) => Some(value),
            _ => None,
        }
    }
}

impl ArgType for Attachment {
    fn declared_type() -> DeclaredType {
        DeclaredType::Attachment
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Attachment(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: ArgType> ArgType for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::optional(T::declared_type())
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        match value {
            ArgValue::Absent => Some(None),
            value => T::from_arg(value).map(Some),
        }
    }
}

/// Static description of one argument field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgField {
    name: String,
    declared: DeclaredType,
    description: Option<String>,
    default: Option<String>,
}

impl ArgField {
    /// Describes a field of Rust type `T`.
    pub fn of<T: ArgType>(name: impl Into<String>) -> Self {
        Self::new(name, T::declared_type())
    }

    /// Describes a field from an explicit declared type.
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            description: None,
            default: None,
        }
    }

    /// Sets the picker description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Sets the default literal used when the option is omitted.
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Field name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Option name sent to the platform.
    pub fn option_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Declared field type.
    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    /// Declared description, if any.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared default literal, if any.
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Marshalled argument values keyed by lowercase option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgValues {
    values: BTreeMap<String, ArgValue>,
}

impl ArgValues {
    /// Creates an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under the lowercased `name`.
    pub fn insert(&mut self, name: &str, value: ArgValue) {
        self.values.insert(name.to_lowercase(), value);
    }

    /// Borrows the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(&name.to_lowercase())
    }

    /// Removes and converts the value stored under `name`. Missing entries read as
    /// [`ArgValue::Absent`].
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::ArgumentMismatch`] when the value does not fit `T`.
    pub fn take<T: ArgType>(&mut self, name: &str) -> Result<T, SwitchboardError> {
        let value = self
            .values
            .remove(&name.to_lowercase())
            .unwrap_or(ArgValue::Absent);
        T::from_arg(value).ok_or_else(|| SwitchboardError::ArgumentMismatch {
            field: name.to_string(),
            expected: T::declared_type().to_string(),
        })
    }

    /// Names of the values not taken yet, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Argument shape of a slash command handler.
pub trait CommandArgs: Sized {
    /// Fields in declaration order.
    fn fields() -> Vec<ArgField>;

    /// Rebuilds the shape from marshalled values.
    ///
    /// # Errors
    ///
    /// Returns an error when a value does not fit its field.
    fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError>;
}

impl CommandArgs for () {
    fn fields() -> Vec<ArgField> {
        Vec::new()
    }

    fn from_values(_values: &mut ArgValues) -> Result<Self, SwitchboardError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn option_fields_declare_optional_types() {
        let field = ArgField::of::<Option<u32>>("Limit");
        assert_eq!(
            field.declared(),
            &DeclaredType::optional(DeclaredType::UnsignedInteger)
        );
        assert_eq!(field.option_name(), "limit");
    }

    #[test]
    fn take_reads_missing_optional_as_none() {
        let mut values = ArgValues::new();
        let note: Option<String> = values.take("note").expect("take");
        assert_eq!(note, None);
    }

    #[test]
    fn take_wraps_present_optional() {
        let mut values = ArgValues::new();
        values.insert("Note", ArgValue::String("hi".to_string()));
        let note: Option<String> = values.take("note").expect("take");
        assert_eq!(note, Some("hi".to_string()));
        assert!(values.is_empty());
    }

    #[test]
    fn take_rejects_negative_unsigned() {
        let mut values = ArgValues::new();
        values.insert("limit", ArgValue::Integer(-1));
        let err = values.take::<u64>("limit").expect_err("should fail");
        assert_eq!(
            err,
            SwitchboardError::ArgumentMismatch {
                field: "limit".to_string(),
                expected: "unsigned integer".to_string(),
            }
        );
    }

    #[test]
    fn placeholders_fit_their_declared_type() {
        let mut values = ArgValues::new();
        values.insert("id", ArgValue::placeholder(&DeclaredType::UnsignedInteger));
        values.insert("who", ArgValue::placeholder(&DeclaredType::User));
        values.insert(
            "note",
            ArgValue::placeholder(&DeclaredType::optional(DeclaredType::String)),
        );
        assert_eq!(values.names().collect::<Vec<_>>(), vec!["id", "note", "who"]);

        assert_eq!(values.take::<u32>("id").expect("id"), 0);
        assert!(values.take::<User>("who").is_ok());
        assert_eq!(values.take::<Option<String>>("note").expect("note"), None);
        assert!(values.is_empty());
    }

    #[test]
    fn take_rejects_missing_required_value() {
        let mut values = ArgValues::new();
        assert!(matches!(
            values.take::<String>("name"),
            Err(SwitchboardError::ArgumentMismatch { .. })
        ));
    }
}
