//! Conversion of loosely-typed interaction options into typed argument values.

use std::collections::BTreeMap;

use serde_json::Value;
use switchboard_contract::{CommandData, Interaction, InteractionOption, Message, OptionKind};

use crate::{
    args::{ArgField, ArgValue, ArgValues},
    error::SwitchboardError,
    mapper::map_type,
    resolver::EntityResolver,
};

/// Builds the argument values for `fields` from the options received with `data`.
///
/// Received options are matched by lowercase name. An absent optional field stays
/// [`ArgValue::Absent`]; an absent non-optional field takes its parsed default literal.
///
/// # Errors
///
/// Returns a marshalling-class [`SwitchboardError`] when a received value has the wrong kind
/// or shape, an entity cannot be resolved, or a default cannot be produced. The error only
/// affects the current dispatch.
pub fn marshal<S: EntityResolver + ?Sized>(
    session: &S,
    interaction: &Interaction,
    data: &CommandData,
    fields: &[ArgField],
) -> Result<ArgValues, SwitchboardError> {
    let received = data
        .options
        .iter()
        .map(|option| (option.name.to_lowercase(), option))
        .collect::<BTreeMap<_, _>>();

    let mut values = ArgValues::new();
    for field in fields {
        let name = field.option_name();
        let mapped =
            map_type(field.declared()).map_err(|err| SwitchboardError::UnsupportedArgumentType {
                field: field.name().to_string(),
                type_name: err.type_name,
            })?;

        let value = match received.get(&name) {
            Some(option) if option.kind != mapped.kind => {
                return Err(SwitchboardError::OptionKindMismatch {
                    field: field.name().to_string(),
                    expected: mapped.kind,
                    received: option.kind,
                })
            }
            Some(option) => convert_option(session, interaction, data, field, option)?,
            None if field.declared().is_optional() => ArgValue::Absent,
            None => match field.default_literal() {
                Some(literal) => parse_default(field, mapped.kind, literal)?,
                None => {
                    return Err(SwitchboardError::MissingOption {
                        field: field.name().to_string(),
                    })
                }
            },
        };
        values.insert(&name, value);
    }

    Ok(values)
}

/// Resolves the target message of a message command.
///
/// # Errors
///
/// Returns [`SwitchboardError::MissingTarget`] when the interaction names no target or the
/// target was not resolved by the platform.
pub fn resolve_message(data: &CommandData) -> Result<Message, SwitchboardError> {
    data.target_id
        .as_ref()
        .and_then(|target| data.resolved.messages.get(target))
        .cloned()
        .ok_or_else(|| SwitchboardError::MissingTarget {
            command: data.name.clone(),
        })
}

fn convert_option<S: EntityResolver + ?Sized>(
    session: &S,
    interaction: &Interaction,
    data: &CommandData,
    field: &ArgField,
    option: &InteractionOption,
) -> Result<ArgValue, SwitchboardError> {
    let malformed = || SwitchboardError::InvalidOptionValue {
        field: field.name().to_string(),
        kind: option.kind,
    };

    let value = match option.kind {
        OptionKind::String => {
            let text = option.value.as_str().ok_or_else(malformed)?;
            ArgValue::String(text.to_string())
        }
        OptionKind::Integer => {
            ArgValue::Integer(integer_value(&option.value).ok_or_else(malformed)?)
        }
        OptionKind::Boolean => ArgValue::Boolean(option.value.as_bool().ok_or_else(malformed)?),
        OptionKind::Number => ArgValue::Number(option.value.as_f64().ok_or_else(malformed)?),
        OptionKind::User => {
            let id = option.value.as_str().ok_or_else(malformed)?;
            let user = data
                .resolved
                .users
                .get(id)
                .cloned()
                .or_else(|| session.user(id));
            ArgValue::User(user.ok_or_else(|| unresolved(field, option.kind, id))?)
        }
        OptionKind::Channel => {
            let id = option.value.as_str().ok_or_else(malformed)?;
            let channel = data
                .resolved
                .channels
                .get(id)
                .cloned()
                .or_else(|| session.channel(id));
            ArgValue::Channel(channel.ok_or_else(|| unresolved(field, option.kind, id))?)
        }
        OptionKind::Role => {
            let id = option.value.as_str().ok_or_else(malformed)?;
            let role = data
                .resolved
                .roles
                .get(id)
                .cloned()
                .or_else(|| session.role(interaction.guild_id.as_ref(), id));
            ArgValue::Role(role.ok_or_else(|| unresolved(field, option.kind, id))?)
        }
        // Attachments exist only in the interaction payload; sessions never cache them.
        OptionKind::Attachment => {
            let id = option.value.as_str().ok_or_else(malformed)?;
            let attachment = data.resolved.attachments.get(id).cloned();
            ArgValue::Attachment(attachment.ok_or_else(|| unresolved(field, option.kind, id))?)
        }
    };
    Ok(value)
}

/// Integers arrive as JSON numbers that may be encoded as floats; fractional parts truncate.
/// Values outside the `i64` range are rejected rather than saturated.
fn integer_value(value: &Value) -> Option<i64> {
    // 2^63 is exactly representable, so both bounds compare without rounding.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .map(f64::trunc)
            .filter(|float| (-LIMIT..LIMIT).contains(float))
            .map(|float| float as i64)
    })
}

fn unresolved(field: &ArgField, kind: OptionKind, id: &str) -> SwitchboardError {
    SwitchboardError::UnresolvedEntity {
        field: field.name().to_string(),
        kind,
        id: id.to_string(),
    }
}

fn parse_default(
    field: &ArgField,
    kind: OptionKind,
    literal: &str,
) -> Result<ArgValue, SwitchboardError> {
    let invalid = |reason: String| SwitchboardError::InvalidDefault {
        field: field.name().to_string(),
        literal: literal.to_string(),
        reason,
    };

    match kind {
        OptionKind::String => Ok(ArgValue::String(literal.to_string())),
        OptionKind::Integer => literal
            .parse::<i64>()
            .map(ArgValue::Integer)
            .map_err(|err| invalid(err.to_string())),
        OptionKind::Boolean => literal
            .parse::<bool>()
            .map(ArgValue::Boolean)
            .map_err(|err| invalid(err.to_string())),
        OptionKind::Number => literal
            .parse::<f64>()
            .map(ArgValue::Number)
            .map_err(|err| invalid(err.to_string())),
        OptionKind::User | OptionKind::Channel | OptionKind::Role | OptionKind::Attachment => {
            Err(SwitchboardError::UnsupportedDefaultType {
                field: field.name().to_string(),
                kind,
            })
        }
    }
}
