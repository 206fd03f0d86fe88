//! Synchronization of the local registry with the remote platform.
//!
//! A deployment picks one [`ReconcileStrategy`]. Failures are reported with the scope and
//! command that triggered them; calls that already succeeded stay applied, and re-running
//! converges to the same end state.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use switchboard_contract::{CommandSchema, CommandScope};
use tracing::{debug, info};

use crate::{
    command::Command,
    config::ReconcileStrategy,
    error::{RemoteError, SwitchboardError},
    registry::CommandRegistry,
    remote::RemoteCommandClient,
};

/// One command touched by a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReconciledCommand {
    /// Command scope.
    pub scope: CommandScope,
    /// Command name.
    pub name: String,
}

impl ReconciledCommand {
    fn new(scope: &CommandScope, name: &str) -> Self {
        Self {
            scope: scope.clone(),
            name: name.to_string(),
        }
    }
}

/// What a reconciliation run changed, each list ordered by scope, then name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Scopes whose full remote state was reconciled. Empty for additive runs.
    pub touched: Vec<CommandScope>,
    /// Commands created or updated one by one.
    pub created: Vec<ReconciledCommand>,
    /// Remote commands deleted because they are no longer registered.
    pub deleted: Vec<ReconciledCommand>,
    /// Commands written through bulk overwrite.
    pub overwritten: Vec<ReconciledCommand>,
}

/// Pushes `registry` to the remote platform with `strategy`.
///
/// # Errors
///
/// Returns [`SwitchboardError::Reconcile`] for the first failed remote call. Earlier calls are
/// not rolled back.
pub async fn reconcile<S, C>(
    registry: &CommandRegistry<S>,
    client: &C,
    strategy: ReconcileStrategy,
) -> Result<ReconcileReport, SwitchboardError>
where
    C: RemoteCommandClient + ?Sized,
{
    debug!(?strategy, commands = registry.len(), "reconciling commands");
    match strategy {
        ReconcileStrategy::Additive => additive(registry, client).await,
        ReconcileStrategy::Full => full(registry, client).await,
        ReconcileStrategy::BulkOverwrite => bulk_overwrite(registry, client).await,
    }
}

async fn additive<S, C>(
    registry: &CommandRegistry<S>,
    client: &C,
) -> Result<ReconcileReport, SwitchboardError>
where
    C: RemoteCommandClient + ?Sized,
{
    let mut report = ReconcileReport::default();
    create_all(registry.iter(), client, &mut report).await?;
    Ok(report)
}

async fn full<S, C>(
    registry: &CommandRegistry<S>,
    client: &C,
) -> Result<ReconcileReport, SwitchboardError>
where
    C: RemoteCommandClient + ?Sized,
{
    let touched = touched_scopes(registry, client).await?;
    let mut report = ReconcileReport::default();

    for scope in &touched {
        let snapshot = client
            .list_commands(scope)
            .await
            .map_err(|source| remote_failure(scope, None, source))?;

        for remote in &snapshot.commands {
            let registered = registry
                .get(&remote.schema.name, scope)
                .is_some_and(|command| command.command_type() == remote.schema.kind);
            if registered {
                continue;
            }
            client
                .delete_command(scope, &remote.id)
                .await
                .map_err(|source| {
                    remote_failure(scope, Some(remote.schema.name.as_str()), source)
                })?;
            info!(
                scope = %scope,
                command = %remote.schema.name,
                id = remote.id.as_str(),
                "deleted remote command"
            );
            report
                .deleted
                .push(ReconciledCommand::new(scope, &remote.schema.name));
        }
    }

    create_all(registry.iter(), client, &mut report).await?;
    report.deleted.sort();
    report.touched = touched.into_iter().collect();
    Ok(report)
}

async fn bulk_overwrite<S, C>(
    registry: &CommandRegistry<S>,
    client: &C,
) -> Result<ReconcileReport, SwitchboardError>
where
    C: RemoteCommandClient + ?Sized,
{
    let touched = touched_scopes(registry, client).await?;
    let batches = touched
        .iter()
        .map(|scope| {
            let schemas = registry
                .in_scope(scope)
                .map(Command::to_schema)
                .collect::<Vec<CommandSchema>>();
            (scope, schemas)
        })
        .collect::<Vec<_>>();

    // Scopes hold disjoint remote state, so their overwrites run concurrently.
    try_join_all(batches.iter().map(|(scope, schemas)| async move {
        client
            .bulk_overwrite(scope, schemas)
            .await
            .map_err(|source| remote_failure(scope, None, source))?;
        info!(scope = %scope, commands = schemas.len(), "overwrote remote commands");
        Ok::<_, SwitchboardError>(())
    }))
    .await?;

    let overwritten = batches
        .iter()
        .flat_map(|(scope, schemas)| {
            schemas
                .iter()
                .map(move |schema| ReconciledCommand::new(scope, &schema.name))
        })
        .collect();
    Ok(ReconcileReport {
        touched: touched.into_iter().collect(),
        overwritten,
        ..ReconcileReport::default()
    })
}

async fn create_all<'r, S, C, I>(
    commands: I,
    client: &C,
    report: &mut ReconcileReport,
) -> Result<(), SwitchboardError>
where
    S: 'r,
    C: RemoteCommandClient + ?Sized,
    I: Iterator<Item = &'r Command<S>>,
{
    for command in commands {
        let schema = command.to_schema();
        let id = client
            .create_command(command.scope(), &schema)
            .await
            .map_err(|source| remote_failure(command.scope(), Some(command.name()), source))?;
        info!(
            scope = %command.scope(),
            command = %command.name(),
            id = id.as_str(),
            "created remote command"
        );
        report
            .created
            .push(ReconciledCommand::new(command.scope(), command.name()));
    }
    Ok(())
}

/// Global, every guild the client can reach, and every scope holding a local command.
async fn touched_scopes<S, C>(
    registry: &CommandRegistry<S>,
    client: &C,
) -> Result<BTreeSet<CommandScope>, SwitchboardError>
where
    C: RemoteCommandClient + ?Sized,
{
    let guilds = client
        .list_accessible_scopes()
        .await
        .map_err(|source| remote_failure(&CommandScope::Global, None, source))?;

    let mut scopes = registry.scopes();
    scopes.insert(CommandScope::Global);
    scopes.extend(
        guilds
            .iter()
            .map(|guild_id| CommandScope::from_guild_id(guild_id.as_str())),
    );
    Ok(scopes)
}

fn remote_failure(
    scope: &CommandScope,
    command: Option<&str>,
    source: RemoteError,
) -> SwitchboardError {
    SwitchboardError::Reconcile {
        scope: scope.clone(),
        command: command.map(str::to_string),
        source,
    }
}
