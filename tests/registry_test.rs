//! Registry integration tests
//!
//! Cover the identity/role store, the support-chat registry and the
//! publication ledger against a real database.

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;
use DeskGenie::models::user::UserRole;
use DeskGenie::utils::errors::DeskGenieError;
use helpers::TestDatabase;

#[tokio::test]
#[serial]
async fn test_upsert_refreshes_handle_but_not_role() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let user = services.users.upsert(100, Some("old_name")).await.unwrap();
    assert_eq!(user.role, UserRole::User);

    services.users.set_role(100, UserRole::Staff).await.unwrap();

    // A fresh interaction with a renamed account.
    let user = services.users.upsert(100, Some("new_name")).await.unwrap();
    assert_eq!(user.username.as_deref(), Some("new_name"));
    assert_eq!(user.role, UserRole::Staff);
}

#[tokio::test]
#[serial]
async fn test_set_role_on_unknown_user_fails() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let err = services.users.set_role(424_242, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::UserNotFound { .. });
}

#[tokio::test]
#[serial]
async fn test_chat_reregistration_preserves_activation() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let chat = services.chats.register(-100, Some("Support")).await.unwrap();
    assert!(!chat.is_active);

    assert!(services.chats.set_active(-100, true, 1).await.unwrap());

    // The bot was re-added: the row, including activation, is untouched.
    let chat = services.chats.register(-100, Some("Support v2")).await.unwrap();
    assert!(chat.is_active);
    assert_eq!(chat.title.as_deref(), Some("Support"));
}

#[tokio::test]
#[serial]
async fn test_set_active_on_unknown_chat_is_a_noop() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    assert!(!services.chats.set_active(-999, true, 1).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_only_active_chats_are_broadcast_targets() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    services.chats.register(-101, Some("A")).await.unwrap();
    services.chats.register(-102, Some("B")).await.unwrap();
    services.chats.register(-103, Some("C")).await.unwrap();
    services.chats.set_active(-101, true, 1).await.unwrap();
    services.chats.set_active(-103, true, 1).await.unwrap();
    services.chats.set_active(-103, false, 1).await.unwrap();

    assert_eq!(services.chats.list_active_ids().await.unwrap(), vec![-101]);
}

#[tokio::test]
#[serial]
async fn test_publication_ledger_is_idempotent() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let ticket = services
        .tickets
        .create(DeskGenie::models::ticket::CreateTicketRequest {
            submitter_id: 100,
            submitter_username: None,
            text: Some("dup check".to_string()),
            media: vec![],
        })
        .await
        .unwrap();

    assert!(!services.publications.is_published(ticket.id, -100).await.unwrap());

    // First record wins, the replay is absorbed by the unique key.
    assert!(services.publications.record(ticket.id, -100, 555).await.unwrap());
    assert!(!services.publications.record(ticket.id, -100, 556).await.unwrap());

    assert!(services.publications.is_published(ticket.id, -100).await.unwrap());
    let rows = services.publications.list_for_ticket(ticket.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message_id, 555);

    // A different chat is a different ledger entry.
    assert!(services.publications.record(ticket.id, -200, 700).await.unwrap());
    assert_eq!(
        services.publications.list_for_ticket(ticket.id).await.unwrap().len(),
        2
    );
}
