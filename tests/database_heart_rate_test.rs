// ABOUTME: Integration tests for heart-rate reading and anomaly storage
// ABOUTME: Covers ordering, per-user isolation, batch inserts, file databases, and de-duplication lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use pulse_core::constants::anomaly::HEART_RATE_ANOMALY_TYPE;
use pulse_core::models::{ActivityLevel, HeartRateReading, Severity};
use tempfile::TempDir;
use wellness_pulse::database::{Database, NewAnomaly};

fn anomaly_for(user_id: &str, reading: &HeartRateReading, severity: Severity) -> NewAnomaly {
    NewAnomaly {
        user_id: user_id.to_owned(),
        anomaly_type: HEART_RATE_ANOMALY_TYPE.to_owned(),
        message: format!("Anomalous heart rate detected: {} BPM (z-score: 3.1)", reading.bpm),
        severity,
        timestamp: Utc::now(),
        bpm: Some(reading.bpm),
        z_score: Some(3.1),
        reading_timestamp: Some(reading.timestamp),
        dedup_key: None,
    }
}

#[tokio::test]
async fn test_record_reading_round_trips_activity() {
    let db = common::create_test_database().await.unwrap();
    let reading =
        HeartRateReading::new(88, common::base_time()).with_activity(ActivityLevel::Walking);

    let stored = db.heart_rate().record_reading("alice", &reading).await.unwrap();
    assert!(stored.id > 0);

    let recent = db.heart_rate().recent_readings("alice", 10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0], stored);
    assert_eq!(HeartRateReading::from(recent[0].clone()), reading);
}

#[tokio::test]
async fn test_reading_without_activity_stays_unlabelled() {
    let db = common::create_test_database().await.unwrap();
    let reading = HeartRateReading::new(64, common::base_time());

    db.heart_rate().record_reading("alice", &reading).await.unwrap();

    let recent = db.heart_rate().recent_readings("alice", 1).await.unwrap();
    assert_eq!(recent[0].activity, None);
}

#[tokio::test]
async fn test_recent_readings_newest_first_and_isolated() {
    let db = common::create_test_database().await.unwrap();
    let manager = db.heart_rate();

    let alice = common::readings_from_bpms(&[60, 61, 62, 63]);
    let bob = common::readings_from_bpms(&[100, 101]);
    assert_eq!(manager.record_readings("alice", &alice).await.unwrap(), 4);
    assert_eq!(manager.record_readings("bob", &bob).await.unwrap(), 2);

    let recent: Vec<i32> = manager
        .recent_readings("alice", 3)
        .await
        .unwrap()
        .iter()
        .map(|r| r.bpm)
        .collect();
    assert_eq!(recent, vec![63, 62, 61]);

    assert_eq!(manager.count_readings("alice").await.unwrap(), 4);
    assert_eq!(manager.count_readings("bob").await.unwrap(), 2);
    assert_eq!(manager.count_readings("carol").await.unwrap(), 0);
}

#[tokio::test]
async fn test_ordering_uses_reading_time_not_insert_order() {
    let db = common::create_test_database().await.unwrap();
    let manager = db.heart_rate();
    let late = HeartRateReading::new(90, common::base_time() + Duration::minutes(5));
    let early = HeartRateReading::new(70, common::base_time());

    manager.record_reading("alice", &late).await.unwrap();
    manager.record_reading("alice", &early).await.unwrap();

    let recent = manager.recent_readings("alice", 2).await.unwrap();
    assert_eq!(recent[0].bpm, 90);
    assert_eq!(recent[1].bpm, 70);
}

#[tokio::test]
async fn test_empty_batch_stores_nothing() {
    let db = common::create_test_database().await.unwrap();
    assert_eq!(db.heart_rate().record_readings("alice", &[]).await.unwrap(), 0);
    assert_eq!(db.heart_rate().count_readings("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_readings_only_touches_one_user() {
    let db = common::create_test_database().await.unwrap();
    let manager = db.heart_rate();
    manager
        .record_readings("alice", &common::readings_from_bpms(&[60, 61]))
        .await
        .unwrap();
    manager
        .record_readings("bob", &common::readings_from_bpms(&[70]))
        .await
        .unwrap();

    assert_eq!(manager.delete_readings("alice").await.unwrap(), 2);
    assert_eq!(manager.count_readings("alice").await.unwrap(), 0);
    assert_eq!(manager.count_readings("bob").await.unwrap(), 1);
}

#[tokio::test]
async fn test_anomaly_insert_and_list() {
    let db = common::create_test_database().await.unwrap();
    let reading = HeartRateReading::new(190, common::base_time());

    let stored = db
        .anomalies()
        .insert(&anomaly_for("alice", &reading, Severity::High))
        .await
        .unwrap()
        .expect("insert without a dedup key always stores");
    assert_eq!(stored.anomaly_type, HEART_RATE_ANOMALY_TYPE);

    let listed = db.anomalies().list_for_user("alice", 10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].severity, Severity::High);
    assert_eq!(listed[0].bpm, Some(190));
    assert_eq!(listed[0].reading_timestamp, Some(reading.timestamp));

    assert!(db.anomalies().list_for_user("bob", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_anomaly_existence_checks() {
    let db = common::create_test_database().await.unwrap();
    let anomalies = db.anomalies();
    let flagged = HeartRateReading::new(30, common::base_time());
    let other = HeartRateReading::new(31, common::base_time() + Duration::seconds(1));

    assert!(!anomalies
        .exists_of_type("alice", HEART_RATE_ANOMALY_TYPE)
        .await
        .unwrap());

    anomalies
        .insert(&anomaly_for("alice", &flagged, Severity::Medium))
        .await
        .unwrap()
        .unwrap();

    assert!(anomalies
        .exists_of_type("alice", HEART_RATE_ANOMALY_TYPE)
        .await
        .unwrap());
    assert!(!anomalies
        .exists_of_type("alice", "sleep")
        .await
        .unwrap());
    assert!(anomalies
        .exists_for_reading("alice", HEART_RATE_ANOMALY_TYPE, &flagged.timestamp)
        .await
        .unwrap());
    assert!(!anomalies
        .exists_for_reading("alice", HEART_RATE_ANOMALY_TYPE, &other.timestamp)
        .await
        .unwrap());
    assert!(!anomalies
        .exists_for_reading("bob", HEART_RATE_ANOMALY_TYPE, &flagged.timestamp)
        .await
        .unwrap());

    assert_eq!(anomalies.delete_for_user("alice").await.unwrap(), 1);
    assert!(!anomalies
        .exists_of_type("alice", HEART_RATE_ANOMALY_TYPE)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_taken_dedup_key_skips_the_insert() {
    let db = common::create_test_database().await.unwrap();
    let anomalies = db.anomalies();
    let reading = HeartRateReading::new(200, common::base_time());
    let keyed = NewAnomaly {
        dedup_key: Some("2025-06-01T08:00:00.000000Z".to_owned()),
        ..anomaly_for("alice", &reading, Severity::High)
    };

    assert!(anomalies.insert(&keyed).await.unwrap().is_some());
    assert!(anomalies.insert(&keyed).await.unwrap().is_none());

    // Same key under another user is independent
    let for_bob = NewAnomaly {
        user_id: "bob".to_owned(),
        ..keyed.clone()
    };
    assert!(anomalies.insert(&for_bob).await.unwrap().is_some());

    assert_eq!(anomalies.list_for_user("alice", 10).await.unwrap().len(), 1);
    assert_eq!(anomalies.list_for_user("bob", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unkeyed_anomalies_may_repeat() {
    let db = common::create_test_database().await.unwrap();
    let anomalies = db.anomalies();
    let reading = HeartRateReading::new(200, common::base_time());
    let unkeyed = anomaly_for("alice", &reading, Severity::High);

    assert!(anomalies.insert(&unkeyed).await.unwrap().is_some());
    assert!(anomalies.insert(&unkeyed).await.unwrap().is_some());
    assert_eq!(anomalies.list_for_user("alice", 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("nested/pulse.db").display());

    {
        let db = Database::new(&url).await.unwrap();
        db.heart_rate()
            .record_readings("alice", &common::readings_from_bpms(&[70, 71, 72]))
            .await
            .unwrap();
    }

    let reopened = Database::new(&url).await.unwrap();
    assert_eq!(reopened.heart_rate().count_readings("alice").await.unwrap(), 3);

    // Dedup index survives the reopen migrations
    let reading = HeartRateReading::new(200, common::base_time());
    let keyed = NewAnomaly {
        dedup_key: Some("k".to_owned()),
        ..anomaly_for("alice", &reading, Severity::High)
    };
    assert!(reopened.anomalies().insert(&keyed).await.unwrap().is_some());
    assert!(reopened.anomalies().insert(&keyed).await.unwrap().is_none());
}
