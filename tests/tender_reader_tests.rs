//! Integration tests for tender listing and lookups

use std::time::Duration;

use tenders::error::ErrorKind;
use tenders::models::TenderStatus;
use tenders::repositories::{NewTender, Page};
use tenders::seeds::{grant_responsibility, seed_employee};

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{road_repair, service_with_recorder, setup_seeded_db};

const DEADLINE: Duration = Duration::from_secs(5);

fn page(limit: u64, offset: u64) -> Page {
    Page { limit, offset }
}

fn names(tenders: &[tenders::models::tender::Model]) -> Vec<&str> {
    tenders.iter().map(|tender| tender.name.as_str()).collect()
}

#[tokio::test]
async fn list_orders_by_name_and_pages() {
    let (db, directory) = setup_seeded_db().await.unwrap();
    let (service, _) = service_with_recorder(db, DEADLINE);

    for (name, service_type) in [
        ("Cement", "Manufacture"),
        ("Asphalt", "Construction"),
        ("Bricks", "Delivery"),
        ("Drainage", "Construction"),
    ] {
        service
            .create_tender(NewTender {
                name: name.into(),
                service_type: service_type.into(),
                ..road_repair(&directory)
            })
            .await
            .unwrap();
    }

    let first = service.list_tenders(page(2, 0), &[]).await.unwrap();
    let second = service.list_tenders(page(2, 2), &[]).await.unwrap();
    let past_end = service.list_tenders(page(2, 10), &[]).await.unwrap();

    assert_eq!(names(&first), vec!["Asphalt", "Bricks"]);
    assert_eq!(names(&second), vec!["Cement", "Drainage"]);
    assert!(past_end.is_empty());

    let construction = service
        .list_tenders(page(10, 0), &["Construction".to_string()])
        .await
        .unwrap();
    assert_eq!(names(&construction), vec!["Asphalt", "Drainage"]);

    let none = service
        .list_tenders(page(10, 0), &["Catering".to_string()])
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn windows_beyond_bigint_are_bounded() {
    let (db, directory) = setup_seeded_db().await.unwrap();
    let (service, _) = service_with_recorder(db, DEADLINE);
    service.create_tender(road_repair(&directory)).await.unwrap();

    let past_end = service
        .list_tenders(page(5, u64::MAX), &[])
        .await
        .unwrap();
    assert!(past_end.is_empty());

    let all = service.list_tenders(page(u64::MAX, 0), &[]).await.unwrap();
    assert_eq!(names(&all), vec!["Road Repair"]);

    let mine = service
        .list_user_tenders(page(5, u64::MAX), "alice")
        .await
        .unwrap();
    assert!(mine.is_empty());
}

#[tokio::test]
async fn list_by_creator_only_returns_own_tenders() {
    let (db, directory) = setup_seeded_db().await.unwrap();
    let carol = seed_employee(db.as_ref(), "carol", None, None).await.unwrap();
    grant_responsibility(db.as_ref(), directory.organization.id, carol.id)
        .await
        .unwrap();
    let (service, _) = service_with_recorder(db, DEADLINE);

    service.create_tender(road_repair(&directory)).await.unwrap();
    service
        .create_tender(NewTender {
            name: "Snow Removal".into(),
            creator_username: "carol".into(),
            ..road_repair(&directory)
        })
        .await
        .unwrap();

    let alice = service.list_user_tenders(page(5, 0), "alice").await.unwrap();
    let carol = service.list_user_tenders(page(5, 0), "carol").await.unwrap();
    let bob = service.list_user_tenders(page(5, 0), "bob").await.unwrap();

    assert_eq!(names(&alice), vec!["Road Repair"]);
    assert_eq!(names(&carol), vec!["Snow Removal"]);
    assert!(bob.is_empty());

    let err = service
        .list_user_tenders(page(5, 0), "ghost")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserNotFound);
}

#[tokio::test]
async fn get_and_status_lookups() {
    let (db, directory) = setup_seeded_db().await.unwrap();
    let (service, _) = service_with_recorder(db, DEADLINE);
    let created = service.create_tender(road_repair(&directory)).await.unwrap();

    let fetched = service.get_tender(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.version, 1);

    assert_eq!(
        service.get_status(created.id, "bob").await.unwrap(),
        TenderStatus::Created
    );

    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        service.get_tender(missing).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.get_status(missing, "alice").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service
            .get_status(created.id, "ghost")
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::UserNotFound
    );
}

#[tokio::test]
async fn history_of_unknown_tender_is_not_found() {
    let (db, _) = setup_seeded_db().await.unwrap();
    let (service, _) = service_with_recorder(db, DEADLINE);

    let err = service
        .history(uuid::Uuid::new_v4(), "alice")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn ping_reaches_the_database() {
    let (db, _) = setup_seeded_db().await.unwrap();
    let (service, recorder) = service_with_recorder(db, DEADLINE);

    service.ping().await.unwrap();

    assert_eq!(recorder.completed.lock().unwrap().as_slice(), &["ping"]);
}
