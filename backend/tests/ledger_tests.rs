//! Connection ledger tests
//!
//! Runs the request/accept/reject/cancel/remove workflow against an in-memory SQLite store.

mod common;

use common::{create_user, setup_test_db};
use prepconnect::{
    AppError,
    models::{ConnectionStatus, RespondAction},
    services::ConnectionLedger,
};
use uuid::Uuid;

async fn count_pair_records(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM connections")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_send_request_creates_pending_record() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let connection = ledger.send_request(ana.id, ben.id).await.unwrap();
    assert_eq!(connection.status, ConnectionStatus::Pending);
    assert_eq!(connection.from_user, ana.id);
    assert_eq!(connection.to_user, ben.id);

    let from_ana = ledger.status_between(ana.id, ben.id).await.unwrap();
    assert_eq!(from_ana.status, "pending");
    assert_eq!(from_ana.is_initiator, Some(true));

    let from_ben = ledger.status_between(ben.id, ana.id).await.unwrap();
    assert_eq!(from_ben.status, "pending");
    assert_eq!(from_ben.is_initiator, Some(false));
}

#[tokio::test]
async fn test_self_request_is_rejected() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;

    let result = ledger.send_request(ana.id, ana.id).await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    assert!(matches!(
        ledger.status_between(ana.id, ana.id).await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_request_to_unknown_user_fails() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;

    let result = ledger.send_request(ana.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound("User"))));
}

#[tokio::test]
async fn test_duplicate_requests_in_either_direction() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    ledger.send_request(ana.id, ben.id).await.unwrap();

    assert!(matches!(ledger.send_request(ana.id, ben.id).await, Err(AppError::DuplicateRequest)));
    assert!(matches!(ledger.send_request(ben.id, ana.id).await, Err(AppError::DuplicateRequest)));
    assert_eq!(count_pair_records(&pool).await, 1);
}

#[tokio::test]
async fn test_request_after_accept_reports_already_connected() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();
    ledger.respond(request.id, ben.id, RespondAction::Accepted).await.unwrap();

    assert!(matches!(ledger.send_request(ben.id, ana.id).await, Err(AppError::AlreadyConnected)));
    assert!(matches!(ledger.send_request(ana.id, ben.id).await, Err(AppError::AlreadyConnected)));
}

#[tokio::test]
async fn test_only_recipient_can_respond() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;
    let cara = create_user(&pool, "Cara").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();

    for outsider in [ana.id, cara.id] {
        let result = ledger.respond(request.id, outsider, RespondAction::Accepted).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
    assert_eq!(ledger.status_between(ana.id, ben.id).await.unwrap().status, "pending");

    let accepted = ledger.respond(request.id, ben.id, RespondAction::Accepted).await.unwrap();
    assert_eq!(accepted.status, ConnectionStatus::Accepted);
    assert_eq!(accepted.id, request.id);
    assert_eq!(accepted.created_at, request.created_at);
}

#[tokio::test]
async fn test_second_response_is_already_processed() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();
    ledger.respond(request.id, ben.id, RespondAction::Accepted).await.unwrap();

    let again = ledger.respond(request.id, ben.id, RespondAction::Rejected).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed)));
    assert_eq!(ledger.status_between(ana.id, ben.id).await.unwrap().status, "accepted");
}

#[tokio::test]
async fn test_respond_to_missing_request() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ben = create_user(&pool, "Ben").await;

    let result = ledger.respond(Uuid::new_v4(), ben.id, RespondAction::Accepted).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_rejected_request_reopens_in_place() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();
    ledger.respond(request.id, ben.id, RespondAction::Rejected).await.unwrap();
    assert_eq!(ledger.status_between(ana.id, ben.id).await.unwrap().status, "rejected");

    let reopened = ledger.send_request(ben.id, ana.id).await.unwrap();
    assert_eq!(reopened.id, request.id);
    assert_eq!(reopened.status, ConnectionStatus::Pending);
    assert_eq!(reopened.from_user, ben.id);
    assert_eq!(reopened.to_user, ana.id);
    assert!(reopened.created_at >= request.created_at);
    assert_eq!(count_pair_records(&pool).await, 1);

    // roles swapped: Ana now answers
    let result = ledger.respond(reopened.id, ben.id, RespondAction::Accepted).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    ledger.respond(reopened.id, ana.id, RespondAction::Accepted).await.unwrap();
}

#[tokio::test]
async fn test_cancel_rules() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();

    assert!(matches!(ledger.cancel(request.id, ben.id).await, Err(AppError::Unauthorized(_))));
    ledger.cancel(request.id, ana.id).await.unwrap();
    assert_eq!(ledger.status_between(ana.id, ben.id).await.unwrap().status, "none");
    assert!(matches!(ledger.cancel(request.id, ana.id).await, Err(AppError::NotFound(_))));

    let accepted = ledger.send_request(ana.id, ben.id).await.unwrap();
    ledger.respond(accepted.id, ben.id, RespondAction::Accepted).await.unwrap();
    assert!(matches!(ledger.cancel(accepted.id, ana.id).await, Err(AppError::AlreadyProcessed)));
}

#[tokio::test]
async fn test_remove_rules() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;
    let cara = create_user(&pool, "Cara").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();
    assert!(matches!(ledger.remove(request.id, ana.id).await, Err(AppError::InvalidArgument(_))));

    ledger.respond(request.id, ben.id, RespondAction::Accepted).await.unwrap();
    assert!(matches!(ledger.remove(request.id, cara.id).await, Err(AppError::Unauthorized(_))));

    // the recipient may remove as well as the initiator
    ledger.remove(request.id, ben.id).await.unwrap();
    let report = ledger.status_between(ana.id, ben.id).await.unwrap();
    assert_eq!(report.status, "none");
    assert!(report.connection.is_none());
    assert!(report.is_initiator.is_none());

    // the pair can start over
    ledger.send_request(ben.id, ana.id).await.unwrap();
}

#[tokio::test]
async fn test_filtered_views() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;
    let cara = create_user(&pool, "Cara").await;
    let dan = create_user(&pool, "Dan").await;

    let to_ben = ledger.send_request(ana.id, ben.id).await.unwrap();
    let from_cara = ledger.send_request(cara.id, ana.id).await.unwrap();
    let with_dan = ledger.send_request(dan.id, ana.id).await.unwrap();
    ledger.respond(with_dan.id, ana.id, RespondAction::Accepted).await.unwrap();

    let pending: Vec<_> = ledger.list_pending(ana.id).await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(pending, vec![from_cara.id]);

    let sent: Vec<_> = ledger.list_sent(ana.id).await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(sent, vec![to_ben.id]);

    let accepted_ana = ledger.list_accepted(ana.id).await.unwrap();
    let accepted_dan = ledger.list_accepted(dan.id).await.unwrap();
    assert_eq!(accepted_ana.len(), 1);
    assert_eq!(accepted_ana, accepted_dan);

    let views = ledger.expand(accepted_ana).await.unwrap();
    assert_eq!(views[0].from_user.name, "Dan");
    assert_eq!(views[0].to_user.email, "ana@example.com");
}

#[tokio::test]
async fn test_store_rejects_second_record_for_pair() {
    let pool = setup_test_db().await;
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;
    let now = chrono::Utc::now();

    prepconnect::db::connections::create_pending_connection(&pool, ana.id, ben.id, now)
        .await
        .unwrap();
    let err = prepconnect::db::connections::create_pending_connection(&pool, ben.id, ana.id, now)
        .await
        .unwrap_err();

    assert!(prepconnect::error::is_unique_violation(&err));
}

#[tokio::test]
async fn test_concurrent_opposite_requests_leave_one_record() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let (first, second) = tokio::join!(
        ledger.send_request(ana.id, ben.id),
        ledger.send_request(ben.id, ana.id)
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::DuplicateRequest)))
            .count(),
        1
    );
    assert_eq!(count_pair_records(&pool).await, 1);
    assert_eq!(ledger.status_between(ana.id, ben.id).await.unwrap().status, "pending");
}

#[tokio::test]
async fn test_concurrent_reopens_of_rejected_record() {
    let pool = setup_test_db().await;
    let ledger = ConnectionLedger::new(pool.clone());
    let ana = create_user(&pool, "Ana").await;
    let ben = create_user(&pool, "Ben").await;

    let request = ledger.send_request(ana.id, ben.id).await.unwrap();
    ledger.respond(request.id, ben.id, RespondAction::Rejected).await.unwrap();

    let (first, second) = tokio::join!(
        ledger.send_request(ana.id, ben.id),
        ledger.send_request(ben.id, ana.id)
    );

    let outcomes = [first, second];
    let reopened: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened[0].id, request.id);
    assert_eq!(reopened[0].status, ConnectionStatus::Pending);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::DuplicateRequest)))
            .count(),
        1
    );
    assert_eq!(count_pair_records(&pool).await, 1);
}
