//! Drives the router in-process with a pinned clock, so date-dependent
//! behavior can be checked across several "days".

use async_trait::async_trait;
use chrono::NaiveDate;
use daily_cards::clock::{Clock, FixedClock};
use daily_cards::errors::StoreError;
use daily_cards::memory_store::MemoryStore;
use daily_cards::storage::StoredDocument;
use daily_cards::unlock::{UnlockMode, UnlockPolicy};
use daily_cards::{AppState, DocumentClient, DocumentStore, ProgressService, router};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Overview {
    start_date: String,
    active_day: u32,
}

/// A store that is reachable but never answers in time.
struct Unreachable;

#[async_trait]
impl DocumentStore for Unreachable {
    async fn get(&self, _path: &str) -> Result<Option<StoredDocument>, StoreError> {
        Err(StoreError::Timeout(20))
    }

    async fn put(
        &self,
        _path: &str,
        _bytes: &[u8],
        _expected_version: Option<&str>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Timeout(20))
    }

    async fn delete(&self, _path: &str, _version: &str) -> Result<(), StoreError> {
        Err(StoreError::Timeout(20))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn serve(store: Arc<dyn DocumentStore>, mode: UnlockMode, today: NaiveDate) -> String {
    let clock: Arc<dyn Clock> =
        Arc::new(FixedClock::at_noon(chrono_tz::Europe::Warsaw, today).unwrap());
    let service = ProgressService::new(DocumentClient::new(store), clock.clone(), 14);
    let policy = UnlockPolicy::new(mode, date(2026, 1, 1), 14);
    let app = router(AppState::new(service, policy, clock));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn progress(client: &Client, base: &str, uid: &str) -> Overview {
    client
        .get(format!("{base}/api/progress?uid={uid}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn per_user_epoch_is_the_first_page_visit() {
    let store = Arc::new(MemoryStore::new());
    let client = Client::new();
    let first_day = serve(store.clone(), UnlockMode::PerUser, date(2026, 3, 1)).await;
    let two_days_later = serve(store.clone(), UnlockMode::PerUser, date(2026, 3, 3)).await;

    let page = client
        .get(format!("{first_day}/?uid=visitor"))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);

    let later = progress(&client, &two_days_later, "visitor").await;
    assert_eq!(later.start_date, "2026-03-01");
    assert_eq!(later.active_day, 3);

    let stored = store.get("progress/visitor.json").await.unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&stored.bytes).unwrap();
    assert_eq!(doc["started_on"], "2026-03-01");
}

#[tokio::test]
async fn per_user_first_visit_through_api_is_kept() {
    let store = Arc::new(MemoryStore::new());
    let client = Client::new();
    let first_day = serve(store.clone(), UnlockMode::PerUser, date(2026, 3, 1)).await;
    let week_later = serve(store.clone(), UnlockMode::PerUser, date(2026, 3, 8)).await;

    let first = progress(&client, &first_day, "api-user").await;
    assert_eq!(first.active_day, 1);

    // A second read does not move the epoch.
    progress(&client, &first_day, "api-user").await;
    let later = progress(&client, &week_later, "api-user").await;
    assert_eq!(later.start_date, "2026-03-01");
    assert_eq!(later.active_day, 8);
}

#[tokio::test]
async fn global_mode_reads_do_not_write() {
    let store = Arc::new(MemoryStore::new());
    let base = serve(store.clone(), UnlockMode::Global, date(2026, 1, 5)).await;

    let overview = progress(&Client::new(), &base, "reader").await;
    assert_eq!(overview.active_day, 5);
    assert!(store.get("progress/reader.json").await.unwrap().is_none());
}

#[tokio::test]
async fn form_post_with_unreachable_store_renders_notice() {
    let base = serve(Arc::new(Unreachable), UnlockMode::Global, date(2026, 1, 5)).await;

    let response = Client::new()
        .post(format!("{base}/days/2/complete"))
        .form(&[("uid", "someone")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let page = response.text().await.unwrap();
    assert!(page.contains("<!DOCTYPE html>"));
    assert!(page.contains("Could not load progress"));
    assert!(page.contains("Day 2: Slow Hands"));
}
