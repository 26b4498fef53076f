use crate::{
    db::connections,
    error::{AppError, AppResult, is_unique_violation},
    models::{Connection, ConnectionStatus, ConnectionStatusReport, ConnectionView, RespondAction, UserSummary},
    services::UserDirectory,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Pairwise relationship state between users: pending, accepted or rejected,
/// with at most one record per unordered pair.
#[derive(Debug, Clone)]
pub struct ConnectionLedger {
    pool: SqlitePool,
    directory: UserDirectory,
}

impl ConnectionLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            directory: UserDirectory::new(pool.clone()),
            pool,
        }
    }

    /// Ask `target` to connect. A previously rejected record for the pair is
    /// reopened in place with `requester` as the new initiator.
    pub async fn send_request(&self, requester: Uuid, target: Uuid) -> AppResult<Connection> {
        if requester == target {
            return Err(AppError::InvalidArgument("Cannot connect to yourself".to_string()));
        }
        if self.directory.lookup(&[requester, target]).await?.len() < 2 {
            return Err(AppError::NotFound("User"));
        }

        let now = Utc::now();
        match connections::get_connection_between(&self.pool, requester, target).await? {
            Some(existing) => match existing.status {
                ConnectionStatus::Pending => Err(AppError::DuplicateRequest),
                ConnectionStatus::Accepted => Err(AppError::AlreadyConnected),
                ConnectionStatus::Rejected => {
                    // a concurrent reopen can only have moved it to pending
                    let reopened = connections::reopen_rejected_connection(
                        &self.pool,
                        existing.id,
                        requester,
                        target,
                        now,
                    )
                    .await?
                    .ok_or(AppError::DuplicateRequest)?;

                    tracing::info!(
                        "Connection {} reopened: {} -> {}",
                        reopened.id, requester, target
                    );
                    Ok(reopened)
                }
            },
            None => match connections::create_pending_connection(&self.pool, requester, target, now).await {
                Ok(connection) => {
                    tracing::info!(
                        "Connection request {} sent: {} -> {}",
                        connection.id, requester, target
                    );
                    Ok(connection)
                }
                // lost the insert race against a request for the same pair
                Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateRequest),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Accept or reject a pending request. Only the recipient may respond.
    pub async fn respond(&self, request_id: Uuid, responder: Uuid, action: RespondAction) -> AppResult<Connection> {
        let connection = connections::get_connection_by_id(&self.pool, request_id)
            .await?
            .ok_or(AppError::NotFound("Connection request"))?;

        if connection.to_user != responder {
            return Err(AppError::Unauthorized("Unauthorized to respond to this request"));
        }
        if connection.status != ConnectionStatus::Pending {
            return Err(AppError::AlreadyProcessed);
        }

        let updated = connections::transition_status(
            &self.pool,
            request_id,
            ConnectionStatus::Pending,
            action.into(),
        )
        .await?
        .ok_or(AppError::AlreadyProcessed)?;

        tracing::info!("Connection request {} {}", updated.id, updated.status.as_str());
        Ok(updated)
    }

    /// Withdraw a pending request. Only the requester may cancel.
    pub async fn cancel(&self, request_id: Uuid, requester: Uuid) -> AppResult<()> {
        let connection = connections::get_connection_by_id(&self.pool, request_id)
            .await?
            .ok_or(AppError::NotFound("Connection request"))?;

        if connection.from_user != requester {
            return Err(AppError::Unauthorized("Unauthorized to cancel this request"));
        }
        if connection.status != ConnectionStatus::Pending {
            return Err(AppError::AlreadyProcessed);
        }

        if !connections::delete_connection_with_status(&self.pool, request_id, ConnectionStatus::Pending).await? {
            return Err(AppError::AlreadyProcessed);
        }

        tracing::info!("Connection request {} cancelled by {}", request_id, requester);
        Ok(())
    }

    /// Drop an accepted connection. Either party may remove it; messages are kept.
    pub async fn remove(&self, connection_id: Uuid, actor: Uuid) -> AppResult<()> {
        let connection = connections::get_connection_by_id(&self.pool, connection_id)
            .await?
            .ok_or(AppError::NotFound("Connection"))?;

        if connection.status != ConnectionStatus::Accepted {
            return Err(AppError::InvalidArgument("Can only remove accepted connections".to_string()));
        }
        if !connection.involves(actor) {
            return Err(AppError::Unauthorized("Unauthorized to remove this connection"));
        }

        if !connections::delete_connection_with_status(&self.pool, connection_id, ConnectionStatus::Accepted).await? {
            return Err(AppError::NotFound("Connection"));
        }

        tracing::info!("Connection {} removed by {}", connection_id, actor);
        Ok(())
    }

    /// Relationship between `viewer` and `other`, from `viewer`'s side.
    pub async fn status_between(&self, viewer: Uuid, other: Uuid) -> AppResult<ConnectionStatusReport> {
        if viewer == other {
            return Err(AppError::InvalidArgument("Cannot check connection with yourself".to_string()));
        }

        Ok(match connections::get_connection_between(&self.pool, viewer, other).await? {
            Some(connection) => ConnectionStatusReport::for_viewer(connection, viewer),
            None => ConnectionStatusReport::none(),
        })
    }

    /// Incoming requests awaiting `user`'s answer.
    pub async fn list_pending(&self, user: Uuid) -> AppResult<Vec<Connection>> {
        Ok(connections::get_incoming_pending(&self.pool, user).await?)
    }

    /// Requests `user` sent that are still unanswered.
    pub async fn list_sent(&self, user: Uuid) -> AppResult<Vec<Connection>> {
        Ok(connections::get_outgoing_pending(&self.pool, user).await?)
    }

    pub async fn list_accepted(&self, user: Uuid) -> AppResult<Vec<Connection>> {
        Ok(connections::get_accepted_for_user(&self.pool, user).await?)
    }

    /// Whether `a` and `b` currently hold an accepted connection.
    pub async fn are_connected(&self, a: Uuid, b: Uuid) -> AppResult<Option<Connection>> {
        Ok(connections::get_accepted_connection_between(&self.pool, a, b).await?)
    }

    /// Attach display projections of both parties.
    pub async fn expand(&self, connections: Vec<Connection>) -> AppResult<Vec<ConnectionView>> {
        let ids: Vec<Uuid> = connections
            .iter()
            .flat_map(|c| [c.from_user, c.to_user])
            .collect();
        let people = self.directory.lookup(&ids).await?;

        connections
            .into_iter()
            .map(|c| {
                let from_user = people.get(&c.from_user).ok_or(AppError::NotFound("User"))?;
                let to_user = people.get(&c.to_user).ok_or(AppError::NotFound("User"))?;
                Ok(ConnectionView {
                    id: c.id,
                    from_user: UserSummary::from(from_user),
                    to_user: UserSummary::from(to_user),
                    status: c.status,
                    created_at: c.created_at,
                })
            })
            .collect()
    }

    pub async fn expand_one(&self, connection: Connection) -> AppResult<ConnectionView> {
        self.expand(vec![connection])
            .await?
            .pop()
            .ok_or(AppError::NotFound("Connection"))
    }
}
