// ABOUTME: Integration tests for the anomaly scan service over SQLite storage
// ABOUTME: Verifies detection on stored history, each de-duplication policy, and the simulated fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use pulse_core::models::Severity;
use pulse_intelligence::RngSource;
use std::sync::Arc;
use wellness_pulse::config::AnomalyDedupPolicy;
use wellness_pulse::database::{Database, SqliteHeartRateRepository};
use wellness_pulse::services::{AnomalyScanResult, AnomalyScanService, AnomalyScanSettings};

async fn service_with(policy: AnomalyDedupPolicy) -> (Database, AnomalyScanService) {
    let db = common::create_test_database().await.unwrap();
    let repository = Arc::new(SqliteHeartRateRepository::new(db.clone()));
    let settings = AnomalyScanSettings {
        dedup_policy: policy,
        ..AnomalyScanSettings::default()
    };
    (db, AnomalyScanService::new(repository, settings))
}

async fn seed_spiky_history(db: &Database, user_id: &str) {
    db.heart_rate()
        .record_readings(user_id, &common::readings_from_bpms(&common::spiky_bpms()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scan_flags_stored_outliers_in_time_order() {
    let (db, service) = service_with(AnomalyDedupPolicy::PerReading).await;
    seed_spiky_history(&db, "alice").await;

    let result = service.scan_user("alice").await.unwrap();

    assert!(!result.simulated);
    assert_eq!(result.total_readings, 70);
    assert_eq!(result.anomalies_detected, 2);

    let low = &result.anomalies[0];
    assert_eq!(low.reading.bpm, 20);
    assert!((low.z_score - -2.86).abs() < f64::EPSILON);
    assert_eq!(low.severity, Severity::Medium);

    let high = &result.anomalies[1];
    assert_eq!(high.reading.bpm, 200);
    assert!((high.z_score - 7.18).abs() < f64::EPSILON);
    assert_eq!(high.severity, Severity::High);
    assert!(low.reading.timestamp < high.reading.timestamp);
}

#[tokio::test]
async fn test_per_reading_policy_skips_already_stored_readings() {
    let (db, service) = service_with(AnomalyDedupPolicy::PerReading).await;
    seed_spiky_history(&db, "alice").await;

    assert_eq!(service.scan_user("alice").await.unwrap().anomalies_stored, 2);
    assert_eq!(service.scan_user("alice").await.unwrap().anomalies_stored, 0);

    let stored = db.anomalies().list_for_user("alice", 10).await.unwrap();
    assert_eq!(stored.len(), 2);
    let mut bpms: Vec<_> = stored.iter().filter_map(|a| a.bpm).collect();
    bpms.sort_unstable();
    assert_eq!(bpms, vec![20, 200]);
}

#[tokio::test]
async fn test_once_per_type_policy_stores_a_single_anomaly() {
    let (db, service) = service_with(AnomalyDedupPolicy::OncePerType).await;
    seed_spiky_history(&db, "alice").await;

    let first = service.scan_user("alice").await.unwrap();
    assert_eq!(first.anomalies_detected, 2);
    assert_eq!(first.anomalies_stored, 1);

    let second = service.scan_user("alice").await.unwrap();
    assert_eq!(second.anomalies_stored, 0);
    assert_eq!(db.anomalies().list_for_user("alice", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_policy_stores_every_detection() {
    let (db, service) = service_with(AnomalyDedupPolicy::Disabled).await;
    seed_spiky_history(&db, "alice").await;

    service.scan_user("alice").await.unwrap();
    service.scan_user("alice").await.unwrap();

    assert_eq!(db.anomalies().list_for_user("alice", 10).await.unwrap().len(), 4);
}

async fn scan_concurrently(service: AnomalyScanService, scans: usize) -> usize {
    let service = Arc::new(service);
    let handles: Vec<_> = (0..scans)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.scan_user("alice").await.unwrap() })
        })
        .collect();

    let mut stored = 0;
    for handle in handles {
        stored += handle.await.unwrap().anomalies_stored;
    }
    stored
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_per_reading_scans_store_each_reading_once() {
    let (db, service) = service_with(AnomalyDedupPolicy::PerReading).await;
    seed_spiky_history(&db, "alice").await;

    assert_eq!(scan_concurrently(service, 8).await, 2);
    assert_eq!(db.anomalies().list_for_user("alice", 50).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_once_per_type_scans_store_one_anomaly() {
    let (db, service) = service_with(AnomalyDedupPolicy::OncePerType).await;
    seed_spiky_history(&db, "alice").await;

    assert_eq!(scan_concurrently(service, 8).await, 1);
    assert_eq!(db.anomalies().list_for_user("alice", 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_dedup_is_per_user() {
    let (db, service) = service_with(AnomalyDedupPolicy::PerReading).await;
    seed_spiky_history(&db, "alice").await;
    seed_spiky_history(&db, "bob").await;

    assert_eq!(service.scan_user("alice").await.unwrap().anomalies_stored, 2);
    assert_eq!(service.scan_user("bob").await.unwrap().anomalies_stored, 2);
}

#[tokio::test]
async fn test_flat_history_has_no_anomalies() {
    let (db, service) = service_with(AnomalyDedupPolicy::PerReading).await;
    db.heart_rate()
        .record_readings("alice", &common::readings_from_bpms(&[72; 120]))
        .await
        .unwrap();

    let result = service.scan_user("alice").await.unwrap();
    assert_eq!(result.total_readings, 120);
    assert_eq!(result.anomalies_detected, 0);
    assert!(db.anomalies().list_for_user("alice", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sparse_history_falls_back_to_seeded_simulation() {
    let (db, service) = service_with(AnomalyDedupPolicy::Disabled).await;
    db.heart_rate()
        .record_readings("alice", &common::readings_from_bpms(&[70, 71, 72]))
        .await
        .unwrap();

    let first = service
        .scan_user_with_rng("alice", RngSource::seeded(42))
        .await
        .unwrap();
    let second = service
        .scan_user_with_rng("alice", RngSource::seeded(42))
        .await
        .unwrap();

    assert!(first.simulated);
    assert_eq!(first.total_readings, 1800);
    assert_eq!(first.anomalies_detected, second.anomalies_detected);
    let bpms = |r: &AnomalyScanResult| -> Vec<i32> {
        r.anomalies.iter().map(|a| a.reading.bpm).collect()
    };
    assert_eq!(bpms(&first), bpms(&second));

    assert_eq!(db.heart_rate().count_readings("alice").await.unwrap(), 3);
}
