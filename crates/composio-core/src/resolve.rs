use crate::{
    backend::ConnectionSource,
    error::{CoreError, CoreResult},
    types::{AppName, ConnectedAccount, ConnectedAccountId, EntityId, ExecuteRequest},
};
use tracing::debug;

/// Pick the account an execution without an explicit connected account uses:
/// the most recently created active account of `entity_id` for `app`.
/// Equal creation times fall back to the latest update, then the greatest id.
pub fn select_latest_active<'a, I>(
    accounts: I,
    entity_id: &EntityId,
    app: &AppName,
) -> Option<&'a ConnectedAccount>
where
    I: IntoIterator<Item = &'a ConnectedAccount>,
{
    accounts
        .into_iter()
        .filter(|a| a.status.is_active())
        .filter(|a| &a.entity_id == entity_id && &a.app == app)
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.updated_at.cmp(&b.updated_at))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Resolve which connected account an execution request runs with.
pub async fn resolve_connected_account<S>(
    source: &S,
    request: &ExecuteRequest,
    app: &AppName,
) -> CoreResult<ConnectedAccount>
where
    S: ConnectionSource + ?Sized,
{
    resolve_account(
        source,
        &request.effective_entity_id(),
        request.connected_account_id.as_ref(),
        app,
    )
    .await
}

/// Credential rule behind [`resolve_connected_account`]: an explicit account
/// must exist, belong to `app` and be active; otherwise the latest active
/// account of `entity_id` for `app` is used.
pub async fn resolve_account<S>(
    source: &S,
    entity_id: &EntityId,
    connected_account_id: Option<&ConnectedAccountId>,
    app: &AppName,
) -> CoreResult<ConnectedAccount>
where
    S: ConnectionSource + ?Sized,
{
    if let Some(id) = connected_account_id {
        let account = source
            .get_account(id)
            .await?
            .ok_or_else(|| CoreError::ConnectedAccountNotFound(id.to_string()))?;

        if &account.app != app {
            return Err(CoreError::AppMismatch {
                id: id.to_string(),
                expected: app.to_string(),
                actual: account.app.to_string(),
            });
        }
        if !account.status.is_active() {
            return Err(CoreError::InactiveConnection {
                id: id.to_string(),
                status: account.status.to_string(),
            });
        }
        if &account.entity_id != entity_id {
            debug!(
                connected_account_id = %id,
                requested_entity = %entity_id,
                account_entity = %account.entity_id,
                "explicit connected account overrides entity"
            );
        }
        return Ok(account);
    }

    let accounts = source.list_accounts(entity_id, Some(app)).await?;
    let selected = select_latest_active(&accounts, entity_id, app)
        .cloned()
        .ok_or_else(|| CoreError::NoActiveConnection {
            entity_id: entity_id.to_string(),
            app: app.to_string(),
        })?;

    debug!(
        entity_id = %entity_id,
        app = %app,
        connected_account_id = %selected.id,
        candidates = accounts.len(),
        "resolved connected account"
    );
    Ok(selected)
}
