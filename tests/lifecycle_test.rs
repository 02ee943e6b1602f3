//! Ticket lifecycle integration tests
//!
//! Exercise the `new -> accepted -> done` state machine against a real
//! database, including the concurrent-claim guarantee.

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;
use DeskGenie::config::settings::TicketPolicyConfig;
use DeskGenie::models::ticket::{CreateTicketRequest, MediaKind, NewMediaItem, TicketStatus};
use DeskGenie::models::user::UserRole;
use DeskGenie::services::TicketService;
use DeskGenie::utils::errors::DeskGenieError;
use helpers::TestDatabase;

fn text_request(submitter_id: i64, text: &str) -> CreateTicketRequest {
    CreateTicketRequest {
        submitter_id,
        submitter_username: Some("tester".to_string()),
        text: Some(text.to_string()),
        media: vec![],
    }
}

fn ticket_service(db: &TestDatabase, policy: TicketPolicyConfig) -> TicketService {
    let services = db.services();
    TicketService::new(services.tickets.clone(), services.audit.clone(), policy)
}

#[tokio::test]
#[serial]
async fn test_concurrent_claims_have_exactly_one_winner() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();
    let ticket = services
        .tickets
        .create(text_request(100, "printer on fire"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for staff_id in 200..210 {
        let repo = services.tickets.clone();
        let ticket_id = ticket.id;
        handles.push(tokio::spawn(async move {
            repo.claim_if_new(ticket_id, staff_id).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let after = services.tickets.find_by_id(ticket.id).await.unwrap().unwrap();
    assert_eq!(after.status, TicketStatus::Accepted);
    assert!(after.claimed_by.is_some());
}

#[tokio::test]
#[serial]
async fn test_full_lifecycle() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let service = ticket_service(&db, TicketPolicyConfig::default());

    let ticket = service.create(text_request(100, "vpn broken")).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::New);

    let claimed = service.claim(ticket.id, 200, UserRole::Staff).await.unwrap();
    assert_eq!(claimed.status, TicketStatus::Accepted);
    assert_eq!(claimed.claimed_by, Some(200));

    let resolved = service.resolve(ticket.id, 200, UserRole::Staff).await.unwrap();
    assert_eq!(resolved.status, TicketStatus::Done);

    // Re-resolving a done ticket is an explicit failure, never silence.
    let err = service.resolve(ticket.id, 200, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::InvalidTransition { .. });
}

#[tokio::test]
#[serial]
async fn test_plain_users_may_not_claim() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let service = ticket_service(&db, TicketPolicyConfig::default());
    let ticket = service.create(text_request(100, "help")).await.unwrap();

    let err = service.claim(ticket.id, 100, UserRole::User).await.unwrap_err();
    assert_matches!(err, DeskGenieError::PermissionDenied(_));

    let after = service.get(ticket.id).await.unwrap();
    assert_eq!(after.status, TicketStatus::New);
}

#[tokio::test]
#[serial]
async fn test_second_claim_is_already_claimed() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let service = ticket_service(&db, TicketPolicyConfig::default());
    let ticket = service.create(text_request(100, "help")).await.unwrap();

    service.claim(ticket.id, 200, UserRole::Staff).await.unwrap();
    let err = service.claim(ticket.id, 201, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::AlreadyClaimed { .. });
}

#[tokio::test]
#[serial]
async fn test_resolve_unclaimed_is_invalid_transition() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let service = ticket_service(&db, TicketPolicyConfig::default());
    let ticket = service.create(text_request(100, "help")).await.unwrap();

    let err = service.resolve(ticket.id, 200, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::InvalidTransition { .. });
}

#[tokio::test]
#[serial]
async fn test_missing_ticket_is_not_found() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let service = ticket_service(&db, TicketPolicyConfig::default());

    let err = service.claim(999_999, 200, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::TicketNotFound { .. });
}

#[tokio::test]
#[serial]
async fn test_claimant_policy_restricts_resolution() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let policy = TicketPolicyConfig {
        resolve_requires_claimant: true,
    };
    let service = ticket_service(&db, policy);
    let ticket = service.create(text_request(100, "help")).await.unwrap();
    service.claim(ticket.id, 200, UserRole::Staff).await.unwrap();

    // Another staff member is turned away...
    let err = service.resolve(ticket.id, 201, UserRole::Staff).await.unwrap_err();
    assert_matches!(err, DeskGenieError::PermissionDenied(_));

    // ...but the claimer goes through.
    let resolved = service.resolve(ticket.id, 200, UserRole::Staff).await.unwrap();
    assert_eq!(resolved.status, TicketStatus::Done);
}

#[tokio::test]
#[serial]
async fn test_media_kept_in_submission_order() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let request = CreateTicketRequest {
        submitter_id: 100,
        submitter_username: None,
        text: Some("screenshots attached".to_string()),
        media: vec![
            NewMediaItem {
                kind: MediaKind::Photo,
                file_id: "file-a".to_string(),
            },
            NewMediaItem {
                kind: MediaKind::Video,
                file_id: "file-b".to_string(),
            },
            NewMediaItem {
                kind: MediaKind::Photo,
                file_id: "file-c".to_string(),
            },
        ],
    };
    let ticket = services.tickets.create(request).await.unwrap();

    let media = services.tickets.media_for(ticket.id).await.unwrap();
    let file_ids: Vec<&str> = media.iter().map(|m| m.file_id.as_str()).collect();
    assert_eq!(file_ids, vec!["file-a", "file-b", "file-c"]);
    assert_eq!(media[1].kind, MediaKind::Video);
}

#[tokio::test]
#[serial]
async fn test_list_new_excludes_claimed_and_orders_oldest_first() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let services = db.services();

    let first = services.tickets.create(text_request(100, "first")).await.unwrap();
    let second = services.tickets.create(text_request(100, "second")).await.unwrap();
    let third = services.tickets.create(text_request(101, "third")).await.unwrap();

    services.tickets.claim_if_new(second.id, 200).await.unwrap();

    let open: Vec<i64> = services
        .tickets
        .list_new()
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(open, vec![first.id, third.id]);
}
