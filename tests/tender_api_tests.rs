//! End-to-end tests for the Tenders API HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result as AnyhowResult};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tenders::config::AppConfig;
use tenders::seeds::DemoDirectory;
use tenders::server::{AppState, create_app};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{service_with_recorder, setup_seeded_db};

struct TestServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<AnyhowResult<()>>>,
}

impl TestServerHandle {
    fn new(shutdown_tx: oneshot::Sender<()>, join_handle: JoinHandle<AnyhowResult<()>>) -> Self {
        Self {
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        }
    }

    async fn shutdown(mut self) -> AnyhowResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.join_handle.take() {
            let result = handle.await.context("server task join failed")?;
            result?;
        }

        Ok(())
    }
}

impl Drop for TestServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Test helper to spawn a test server backed by a seeded in-memory database
async fn spawn_test_app() -> (String, DemoDirectory, TestServerHandle) {
    let (db, directory) = setup_seeded_db().await.unwrap();
    let config = Arc::new(AppConfig::default());
    let (service, _) = service_with_recorder(db, Duration::from_secs(5));

    let app = create_app(AppState { config, service });

    // Bind to a random port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_url = format!("http://{}", addr);

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let _ = ready_tx.send(());

        server.await.context("axum server error")
    });

    ready_rx.await.expect("server task to signal readiness");

    (
        server_url,
        directory,
        TestServerHandle::new(shutdown_tx, server_task),
    )
}

#[tokio::test]
async fn tender_lifecycle_over_http() {
    let (server_url, directory, handle) = spawn_test_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{server_url}/api/ping"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = client
        .post(format!("{server_url}/api/tenders/new"))
        .json(&json!({
            "name": "Road Repair",
            "description": "Resurfacing",
            "serviceType": "Construction",
            "organizationId": directory.organization.id,
            "creatorUsername": "alice",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let response = client
        .patch(format!("{server_url}/api/tenders/{id}/edit"))
        .query(&[("username", "alice")])
        .json(&json!({ "description": "Phase 2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let edited: Value = response.json().await.unwrap();
    assert_eq!(edited["version"], 2);

    let response = client
        .put(format!("{server_url}/api/tenders/{id}/status"))
        .query(&[("status", "PUBLISHED"), ("username", "alice")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let published: Value = response.json().await.unwrap();
    assert_eq!(published["version"], 3);
    assert_eq!(published["status"], "PUBLISHED");

    let response = client
        .put(format!("{server_url}/api/tenders/{id}/rollback/1"))
        .query(&[("username", "alice")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let restored: Value = response.json().await.unwrap();
    assert_eq!(restored["version"], 4);
    assert_eq!(restored["description"], "Resurfacing");
    assert_eq!(restored["status"], "CREATED");

    let response = client
        .get(format!("{server_url}/api/tenders/{id}/versions"))
        .query(&[("username", "bob")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history: Vec<Value> = response.json().await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[2]["status"], "PUBLISHED");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn errors_are_problem_json_with_trace_id() {
    let (server_url, _directory, handle) = spawn_test_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{server_url}/api/tenders/my"))
        .query(&[("username", "ghost")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let trace_header = response
        .headers()
        .get("x-trace-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "USER_NOT_FOUND");
    assert_eq!(body["trace_id"], trace_header);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn openapi_document_lists_tender_routes() {
    let (server_url, _directory, handle) = spawn_test_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{server_url}/openapi.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let document: Value = response.json().await.unwrap();
    let paths = document["paths"].as_object().unwrap();
    for path in [
        "/api/ping",
        "/api/tenders",
        "/api/tenders/new",
        "/api/tenders/my",
        "/api/tenders/{tender_id}/status",
        "/api/tenders/{tender_id}/edit",
        "/api/tenders/{tender_id}/rollback/{version}",
        "/api/tenders/{tender_id}/versions",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }

    handle.shutdown().await.unwrap();
}
