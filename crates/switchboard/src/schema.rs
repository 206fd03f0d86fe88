//! Derivation of platform option schemas from a declared argument shape.

use std::collections::BTreeSet;

use switchboard_contract::CommandOptionSchema;

use crate::{
    args::{ArgField, CommandArgs},
    error::SwitchboardError,
    mapper::map_type,
};

const MAX_NAME_LEN: usize = 32;

/// Derives the ordered option list for `fields`.
///
/// Options follow declaration order. An option is required unless its field has a default
/// literal or an optional type, and unsigned fields carry a `min_value` of zero.
///
/// # Errors
///
/// Returns a derivation-class [`SwitchboardError`] for invalid or duplicate names, unsupported
/// field types, and missing descriptions when `require_descriptions` is set.
pub fn derive_options(
    fields: &[ArgField],
    require_descriptions: bool,
) -> Result<Vec<CommandOptionSchema>, SwitchboardError> {
    let mut seen = BTreeSet::new();
    let mut options = Vec::with_capacity(fields.len());

    for field in fields {
        let name = field.option_name();
        validate_name(&name)?;
        if !seen.insert(name.clone()) {
            return Err(SwitchboardError::DuplicateOption { name });
        }

        let mapped =
            map_type(field.declared()).map_err(|err| SwitchboardError::UnsupportedArgumentType {
                field: field.name().to_string(),
                type_name: err.type_name,
            })?;

        let description = match field.description_text() {
            Some(text) => text.to_string(),
            None if require_descriptions => {
                return Err(SwitchboardError::MissingDescription {
                    field: field.name().to_string(),
                })
            }
            None => String::new(),
        };

        options.push(CommandOptionSchema {
            name,
            kind: mapped.kind,
            description,
            required: !(field.default_literal().is_some() || field.declared().is_optional()),
            min_value: mapped.unsigned.then_some(0),
        });
    }

    Ok(options)
}

/// Derives the option list for the argument shape `A`.
///
/// # Errors
///
/// See [`derive_options`].
pub fn derive_schema<A: CommandArgs>(
    require_descriptions: bool,
) -> Result<Vec<CommandOptionSchema>, SwitchboardError> {
    derive_options(&A::fields(), require_descriptions)
}

/// Checks a slash command or option name against the platform's naming rules.
pub(crate) fn validate_name(name: &str) -> Result<(), SwitchboardError> {
    check_name(name, false)
}

/// Checks a context-menu command name, which may contain spaces.
pub(crate) fn validate_display_name(name: &str) -> Result<(), SwitchboardError> {
    check_name(name, true)
}

fn check_name(name: &str, allow_spaces: bool) -> Result<(), SwitchboardError> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.chars().count() > MAX_NAME_LEN {
        Some("name is longer than 32 characters")
    } else if !allow_spaces && name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SwitchboardError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use switchboard_contract::{Attachment, Channel, OptionKind, Role, User};

    use super::*;
    use crate::mapper::DeclaredType;

    fn option(name: &str, kind: OptionKind, required: bool) -> CommandOptionSchema {
        CommandOptionSchema {
            name: name.to_string(),
            kind,
            description: String::new(),
            required,
            min_value: None,
        }
    }

    #[test]
    fn derives_all_supported_kinds_in_declaration_order() {
        let fields = vec![
            ArgField::of::<String>("String"),
            ArgField::of::<i64>("Int"),
            ArgField::of::<bool>("Bool"),
            ArgField::of::<User>("User"),
            ArgField::of::<Channel>("Channel"),
            ArgField::of::<Role>("Role"),
            ArgField::of::<f64>("Float"),
            ArgField::of::<Attachment>("Attachment"),
        ];
        let options = derive_options(&fields, false).expect("derive");
        assert_eq!(
            options,
            vec![
                option("string", OptionKind::String, true),
                option("int", OptionKind::Integer, true),
                option("bool", OptionKind::Boolean, true),
                option("user", OptionKind::User, true),
                option("channel", OptionKind::Channel, true),
                option("role", OptionKind::Role, true),
                option("float", OptionKind::Number, true),
                option("attachment", OptionKind::Attachment, true),
            ]
        );
    }

    #[test]
    fn optional_and_defaulted_fields_are_not_required() {
        let fields = vec![
            ArgField::of::<String>("Required").description("This is a required arg"),
            ArgField::of::<i64>("Opt1")
                .description("This is an optional arg")
                .default_value("5"),
            ArgField::of::<Option<String>>("Opt2").description("This is an optional arg as well"),
        ];
        let options = derive_options(&fields, true).expect("derive");
        let required = options
            .iter()
            .map(|option| (option.name.as_str(), option.required))
            .collect::<Vec<_>>();
        assert_eq!(
            required,
            vec![("required", true), ("opt1", false), ("opt2", false)]
        );
        assert_eq!(options[2].kind, OptionKind::String);
        assert_eq!(options[1].description, "This is an optional arg");
    }

    #[test]
    fn only_unsigned_fields_carry_min_value() {
        let fields = vec![
            ArgField::of::<u64>("limit"),
            ArgField::of::<Option<u32>>("page"),
            ArgField::of::<i64>("offset"),
            ArgField::of::<f64>("ratio"),
        ];
        let options = derive_options(&fields, false).expect("derive");
        let bounds = options
            .iter()
            .map(|option| option.min_value)
            .collect::<Vec<_>>();
        assert_eq!(bounds, vec![Some(0), Some(0), None, None]);
    }

    #[test]
    fn missing_description_fails_when_required() {
        let fields = vec![ArgField::of::<String>("Example")];
        let err = derive_options(&fields, true).expect_err("should fail");
        assert_eq!(
            err,
            SwitchboardError::MissingDescription {
                field: "Example".to_string(),
            }
        );
    }

    #[test]
    fn unsupported_field_type_fails() {
        let fields = vec![ArgField::new(
            "Arg",
            DeclaredType::Unsupported("HashMap<String, Value>".to_string()),
        )
        .description("map")];
        let err = derive_options(&fields, true).expect_err("should fail");
        assert!(matches!(
            err,
            SwitchboardError::UnsupportedArgumentType { ref field, .. } if field == "Arg"
        ));
    }

    #[test]
    fn names_differing_only_in_case_collide() {
        let fields = vec![ArgField::of::<String>("Name"), ArgField::of::<String>("name")];
        let err = derive_options(&fields, false).expect_err("should fail");
        assert_eq!(
            err,
            SwitchboardError::DuplicateOption {
                name: "name".to_string(),
            }
        );
    }

    #[test]
    fn empty_shape_derives_no_options() {
        assert_eq!(derive_schema::<()>(true).expect("derive"), Vec::new());
    }

    #[test]
    fn derivation_is_deterministic() {
        let fields = vec![
            ArgField::of::<String>("b").description("b"),
            ArgField::of::<Option<i64>>("a").description("a"),
        ];
        assert_eq!(
            derive_options(&fields, true).expect("first"),
            derive_options(&fields, true).expect("second")
        );
    }

    #[test]
    fn rejects_names_with_whitespace_or_overlong() {
        assert!(validate_name("two words").is_err());
        assert!(validate_name(&"x".repeat(33)).is_err());
        assert!(validate_name("ok").is_ok());
        assert!(validate_display_name("Quote Message").is_ok());
        assert!(validate_display_name("   ").is_err());
    }
}
