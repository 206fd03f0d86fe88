//! Registered command model and strongly-typed handler storage.

use std::{fmt, sync::Arc};

use switchboard_contract::{
    CommandOptionSchema, CommandSchema, CommandScope, CommandType, Interaction, Message,
};

use crate::{
    args::{ArgField, ArgValue, ArgValues, CommandArgs},
    error::SwitchboardError,
    schema::{derive_options, validate_display_name, validate_name},
};

/// Value returned by command handlers. The error text is reported as
/// [`SwitchboardError::Handler`].
pub type HandlerResult = Result<(), String>;

/// Type-erased slash handler: rebuilds the argument shape and invokes the user function.
pub(crate) type SlashInvoker<S> =
    Arc<dyn Fn(&S, &Interaction, ArgValues) -> Result<(), SwitchboardError> + Send + Sync>;

/// Message handler receiving the resolved target message.
pub(crate) type MessageInvoker<S> =
    Arc<dyn Fn(&S, &Interaction, Message) -> HandlerResult + Send + Sync>;

/// Handler storage, one variant per command kind.
pub(crate) enum CommandHandler<S> {
    /// Slash command with its argument shape and derived options.
    Slash {
        /// Argument fields in declaration order.
        fields: Vec<ArgField>,
        /// Options derived from `fields` at registration.
        options: Vec<CommandOptionSchema>,
        /// Handler invoked with the marshalled arguments.
        invoke: SlashInvoker<S>,
    },
    /// Message context-menu command.
    Message {
        /// Handler invoked with the target message.
        invoke: MessageInvoker<S>,
    },
}

impl<S> Clone for CommandHandler<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Slash {
                fields,
                options,
                invoke,
            } => Self::Slash {
                fields: fields.clone(),
                options: options.clone(),
                invoke: Arc::clone(invoke),
            },
            Self::Message { invoke } => Self::Message {
                invoke: Arc::clone(invoke),
            },
        }
    }
}

/// One registered command. Immutable once created.
pub struct Command<S> {
    name: String,
    description: String,
    scope: CommandScope,
    handler: CommandHandler<S>,
}

impl<S> Clone for Command<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            scope: self.scope.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<S> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("kind", &self.command_type())
            .field("options", &self.options())
            .finish_non_exhaustive()
    }
}

impl<S: 'static> Command<S> {
    /// Builds a slash command, deriving its options from `A` up front.
    pub(crate) fn slash<A, F>(
        name: String,
        description: String,
        scope: CommandScope,
        handler: F,
        require_descriptions: bool,
    ) -> Result<Self, SwitchboardError>
    where
        A: CommandArgs + 'static,
        F: Fn(&S, &Interaction, A) -> HandlerResult + Send + Sync + 'static,
    {
        let name = name.to_lowercase();
        validate_name(&name)?;
        let fields = A::fields();
        let options = derive_options(&fields, require_descriptions)?;
        check_shape::<A>(&name, &fields)?;

        let command_name = name.clone();
        let invoke: SlashInvoker<S> = Arc::new(
            move |session: &S, interaction: &Interaction, mut values: ArgValues| {
                let args = A::from_values(&mut values)?;
                check_all_read(&command_name, &values)?;
                handler(session, interaction, args).map_err(|message| SwitchboardError::Handler {
                    command: command_name.clone(),
                    message,
                })
            },
        );

        Ok(Self {
            name,
            description,
            scope: scope.normalized(),
            handler: CommandHandler::Slash {
                fields,
                options,
                invoke,
            },
        })
    }

    /// Builds a message context-menu command.
    pub(crate) fn message<F>(
        name: String,
        scope: CommandScope,
        handler: F,
    ) -> Result<Self, SwitchboardError>
    where
        F: Fn(&S, &Interaction, Message) -> HandlerResult + Send + Sync + 'static,
    {
        validate_display_name(&name)?;
        Ok(Self {
            name,
            description: String::new(),
            scope: scope.normalized(),
            handler: CommandHandler::Message {
                invoke: Arc::new(handler),
            },
        })
    }
}

/// Rebuilds `A` from stand-in values for every declared field. Each read must name a declared
/// field of a fitting type, and every declared field must be read.
fn check_shape<A: CommandArgs>(command: &str, fields: &[ArgField]) -> Result<(), SwitchboardError> {
    let mut values = ArgValues::new();
    for field in fields {
        values.insert(&field.option_name(), ArgValue::placeholder(field.declared()));
    }

    let mismatch = |field: String, reason: String| SwitchboardError::ShapeMismatch {
        command: command.to_string(),
        field,
        reason,
    };
    match A::from_values(&mut values) {
        Ok(_) => {}
        Err(SwitchboardError::ArgumentMismatch { field, expected }) => {
            let option_name = field.to_lowercase();
            let reason = match fields.iter().find(|f| f.option_name() == option_name) {
                Some(declared) => {
                    format!("read as {expected} but declared as {}", declared.declared())
                }
                None => "read but never declared".to_string(),
            };
            return Err(mismatch(field, reason));
        }
        Err(err) => {
            return Err(mismatch(
                std::any::type_name::<A>().to_string(),
                err.to_string(),
            ))
        }
    }
    check_all_read(command, &values)
}

fn check_all_read(command: &str, values: &ArgValues) -> Result<(), SwitchboardError> {
    match values.names().next() {
        Some(field) => Err(SwitchboardError::ShapeMismatch {
            command: command.to_string(),
            field: field.to_string(),
            reason: "declared but never read".to_string(),
        }),
        None => Ok(()),
    }
}

impl<S> Command<S> {
    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Registration scope.
    pub fn scope(&self) -> &CommandScope {
        &self.scope
    }

    /// Command type.
    pub fn command_type(&self) -> CommandType {
        match self.handler {
            CommandHandler::Slash { .. } => CommandType::ChatInput,
            CommandHandler::Message { .. } => CommandType::Message,
        }
    }

    /// Derived options. Always empty for message commands.
    pub fn options(&self) -> &[CommandOptionSchema] {
        match &self.handler {
            CommandHandler::Slash { options, .. } => options,
            CommandHandler::Message { .. } => &[],
        }
    }

    /// Handler storage.
    pub(crate) fn handler(&self) -> &CommandHandler<S> {
        &self.handler
    }

    /// Schema sent to the remote platform.
    pub fn to_schema(&self) -> CommandSchema {
        CommandSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            scope: self.scope.clone(),
            kind: self.command_type(),
            options: self.options().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use switchboard_contract::OptionKind;

    use super::*;
    use crate::resolver::NoopEntityResolver;

    struct TestArgs {
        _required: String,
        _opt1: i64,
        _opt2: Option<String>,
    }

    impl CommandArgs for TestArgs {
        fn fields() -> Vec<ArgField> {
            vec![
                ArgField::of::<String>("Required").description("This is a required arg"),
                ArgField::of::<i64>("Opt1")
                    .description("This is an optional arg")
                    .default_value("5"),
                ArgField::of::<Option<String>>("Opt2")
                    .description("This is an optional arg as well"),
            ]
        }

        fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError> {
            Ok(Self {
                _required: values.take("required")?,
                _opt1: values.take("opt1")?,
                _opt2: values.take("opt2")?,
            })
        }
    }

    fn test_handler(_: &NoopEntityResolver, _: &Interaction, _: TestArgs) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn slash_command_converts_to_schema() {
        let command = Command::slash(
            "test".to_string(),
            "This is a test command".to_string(),
            CommandScope::guild("1234567890"),
            test_handler,
            true,
        )
        .expect("command");

        assert_eq!(
            command.to_schema(),
            CommandSchema {
                name: "test".to_string(),
                description: "This is a test command".to_string(),
                scope: CommandScope::guild("1234567890"),
                kind: CommandType::ChatInput,
                options: vec![
                    CommandOptionSchema {
                        name: "required".to_string(),
                        kind: OptionKind::String,
                        description: "This is a required arg".to_string(),
                        required: true,
                        min_value: None,
                    },
                    CommandOptionSchema {
                        name: "opt1".to_string(),
                        kind: OptionKind::Integer,
                        description: "This is an optional arg".to_string(),
                        required: false,
                        min_value: None,
                    },
                    CommandOptionSchema {
                        name: "opt2".to_string(),
                        kind: OptionKind::String,
                        description: "This is an optional arg as well".to_string(),
                        required: false,
                        min_value: None,
                    },
                ],
            }
        );
    }

    #[test]
    fn message_command_has_no_options() {
        let command = Command::message(
            "Quote Message".to_string(),
            CommandScope::Global,
            |_: &NoopEntityResolver, _: &Interaction, _: Message| Ok(()),
        )
        .expect("command");
        let schema = command.to_schema();
        assert_eq!(schema.kind, CommandType::Message);
        assert!(schema.options.is_empty());
        assert_eq!(schema.name, "Quote Message");
    }

    struct Misread {
        _count: i64,
    }

    impl CommandArgs for Misread {
        fn fields() -> Vec<ArgField> {
            vec![ArgField::of::<i64>("count").description("How many")]
        }

        fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError> {
            Ok(Self {
                _count: values.take("cout")?,
            })
        }
    }

    struct Unread {
        _name: String,
    }

    impl CommandArgs for Unread {
        fn fields() -> Vec<ArgField> {
            vec![
                ArgField::of::<String>("name").description("Who"),
                ArgField::of::<Option<bool>>("loud").description("Shout"),
            ]
        }

        fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError> {
            Ok(Self {
                _name: values.take("name")?,
            })
        }
    }

    struct WrongType {
        _count: String,
    }

    impl CommandArgs for WrongType {
        fn fields() -> Vec<ArgField> {
            vec![ArgField::of::<i64>("count").description("How many")]
        }

        fn from_values(values: &mut ArgValues) -> Result<Self, SwitchboardError> {
            Ok(Self {
                _count: values.take("count")?,
            })
        }
    }

    fn register<A>() -> Result<Command<NoopEntityResolver>, SwitchboardError>
    where
        A: CommandArgs + 'static,
    {
        Command::slash(
            "count".to_string(),
            "Counts".to_string(),
            CommandScope::Global,
            |_: &NoopEntityResolver, _: &Interaction, _: A| Ok(()),
            true,
        )
    }

    #[test]
    fn reading_an_undeclared_name_fails_registration() {
        let err = register::<Misread>().expect_err("should fail");
        assert_eq!(
            err,
            SwitchboardError::ShapeMismatch {
                command: "count".to_string(),
                field: "cout".to_string(),
                reason: "read but never declared".to_string(),
            }
        );
        assert_eq!(err.class(), crate::error::ErrorClass::Derivation);
    }

    #[test]
    fn declared_field_never_read_fails_registration() {
        let err = register::<Unread>().expect_err("should fail");
        assert_eq!(
            err,
            SwitchboardError::ShapeMismatch {
                command: "count".to_string(),
                field: "loud".to_string(),
                reason: "declared but never read".to_string(),
            }
        );
        assert_eq!(err.class(), crate::error::ErrorClass::Derivation);
    }

    #[test]
    fn reading_a_field_as_another_type_fails_registration() {
        let err = register::<WrongType>().expect_err("should fail");
        assert!(matches!(
            err,
            SwitchboardError::ShapeMismatch { ref field, .. } if field == "count"
        ));
    }

    #[test]
    fn leftover_values_are_rejected_before_the_handler_runs() {
        let command = register::<TestArgs>().expect("command");
        let CommandHandler::Slash { invoke, .. } = command.handler() else {
            panic!("slash handler expected");
        };

        let mut values = ArgValues::new();
        values.insert("required", ArgValue::String("x".to_string()));
        values.insert("opt1", ArgValue::Integer(1));
        values.insert("opt2", ArgValue::Absent);
        values.insert("extra", ArgValue::Boolean(true));
        let interaction = Interaction {
            id: "1".to_string(),
            kind: switchboard_contract::InteractionKind::ApplicationCommand,
            guild_id: None,
            data: None,
        };

        let err = invoke(&NoopEntityResolver, &interaction, values).expect_err("leftover");
        assert!(matches!(
            err,
            SwitchboardError::ShapeMismatch { ref field, .. } if field == "extra"
        ));
    }

    #[test]
    fn empty_guild_scope_registers_as_global() {
        let scope: CommandScope =
            serde_json::from_str(r#"{"kind":"guild","guild_id":""}"#).expect("scope");
        let command = Command::message(
            "Quote Message".to_string(),
            scope,
            |_: &NoopEntityResolver, _: &Interaction, _: Message| Ok(()),
        )
        .expect("command");
        assert_eq!(command.scope(), &CommandScope::Global);

        let command = Command::slash(
            "ping".to_string(),
            "Ping".to_string(),
            CommandScope::Guild {
                guild_id: switchboard_contract::GuildId::new(""),
            },
            |_: &NoopEntityResolver, _: &Interaction, _: ()| Ok(()),
            true,
        )
        .expect("command");
        assert_eq!(command.scope(), &CommandScope::Global);
    }

    #[test]
    fn slash_names_are_lowercased_and_validated() {
        let command = Command::slash(
            "Ping".to_string(),
            "Ping".to_string(),
            CommandScope::Global,
            |_: &NoopEntityResolver, _: &Interaction, _: ()| Ok(()),
            true,
        )
        .expect("command");
        assert_eq!(command.name(), "ping");

        let err = Command::slash(
            "two words".to_string(),
            "bad".to_string(),
            CommandScope::Global,
            |_: &NoopEntityResolver, _: &Interaction, _: ()| Ok(()),
            true,
        )
        .expect_err("should fail");
        assert!(matches!(err, SwitchboardError::InvalidName { .. }));
    }
}
