mod common;

use common::{day, phrases, storage_on};
use phrasedeck_core::quiz_stats::{merge, normalize, MAX_COUNTER};
use phrasedeck_core::storage::keys::{profile_record, ProfileRecord};
use phrasedeck_core::transfer::{apply_import, parse_import_payload};
use phrasedeck_core::{
    KeyValueStore, LearnProgress, QuizStats, QuizStatsStore, Storage, DATA_VERSION,
};
use serde_json::json;

fn stats(total_quizzes: u64, total_score: u64, last_score: u64, last_total: u64) -> QuizStats {
    QuizStats {
        data_version: DATA_VERSION,
        total_quizzes,
        total_score,
        last_score,
        last_total,
    }
}

#[test]
fn normalize_zeroes_bad_numbers() {
    let raw = json!({
        "dataVersion": 1,
        "totalQuizzes": "3",
        "totalScore": -4,
        "lastScore": 2.9,
        "lastTotal": null
    });
    let s = normalize(Some(&raw));
    assert_eq!(s, QuizStats { data_version: 1, ..stats(0, 0, 2, 0) });

    assert_eq!(normalize(None), QuizStats::default());
    assert_eq!(normalize(Some(&json!("nope"))), QuizStats::default());
}

#[test]
fn merge_sums_counters() {
    let existing = stats(4, 30, 7, 10);
    let imported = stats(2, 15, 9, 10);
    let m = merge(&existing, &imported);
    assert_eq!(m.total_quizzes, existing.total_quizzes + imported.total_quizzes);
    assert_eq!(m.total_score, existing.total_score + imported.total_score);
    assert_eq!((m.last_score, m.last_total), (9, 10));
}

#[test]
fn merge_keeps_existing_last_result_when_import_has_none() {
    let m = merge(&stats(4, 30, 7, 10), &stats(0, 0, 0, 0));
    assert_eq!((m.last_score, m.last_total), (7, 10));
    assert_eq!(m.total_quizzes, 4);
}

#[test]
fn record_result_accumulates() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let store = QuizStatsStore::new(&storage);
    assert!(!store.load("ann").has_result());

    store.record_result("ann", 6, 10);
    let s = store.record_result("ann", 8, 10);
    assert_eq!(s, stats(2, 14, 8, 10));
    assert_eq!(store.load("ann"), s);
    assert!((s.average_score() - 7.0).abs() < f64::EPSILON);

    let raw = mem.get(&profile_record("ann", ProfileRecord::QuizStats)).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["totalQuizzes"], 2);
    assert_eq!(doc["lastTotal"], 10);
}

#[test]
fn load_heals_stored_record() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let key = profile_record("ann", ProfileRecord::QuizStats);
    mem.set(&key, r#"{"totalQuizzes":2,"totalScore":"x"}"#).unwrap();

    let s = QuizStatsStore::new(&storage).load("ann");
    assert_eq!(s.total_quizzes, 2);
    assert_eq!(s.total_score, 0);
    let healed: QuizStats = serde_json::from_str(&mem.get(&key).unwrap().unwrap()).unwrap();
    assert_eq!(healed, s);
}

#[test]
fn unavailable_store_degrades_to_defaults() {
    let storage = Storage::unavailable();
    let store = QuizStatsStore::new(&storage);
    let s = store.record_result("ann", 5, 10);
    assert_eq!(s.total_quizzes, 1);
    assert_eq!(store.load("ann"), QuizStats::default());
    assert_eq!(QuizStats::default().average_score(), 0.0);
}

#[test]
fn normalize_caps_counters() {
    let raw = json!({
        "totalQuizzes": 1e30,
        "totalScore": 9007199254740992u64,
        "lastScore": 9007199254740991u64,
        "lastTotal": 18446744073709551615u64
    });
    let s = normalize(Some(&raw));
    assert_eq!(s.total_quizzes, 0);
    assert_eq!(s.total_score, 0);
    assert_eq!(s.last_score, MAX_COUNTER);
    assert_eq!(s.last_total, 0);
}

#[test]
fn huge_imported_counters_do_not_break_the_next_quiz() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let store = QuizStatsStore::new(&storage);
    let payload = parse_import_payload(
        r#"{"dataVersion":2,"quizStats":{"totalQuizzes":1e30,"totalScore":1e30,"lastScore":3,"lastTotal":10}}"#,
    )
    .unwrap();
    let merged = apply_import(
        &payload,
        &LearnProgress::new("2024-05-01"),
        &store.load("guest"),
        &phrases(10),
        "2024-05-01",
    );
    assert!(merged.quiz_stats.total_quizzes <= MAX_COUNTER);
    store.save("guest", &merged.quiz_stats);

    let s = store.record_result("guest", 7, 10);
    assert_eq!(s.total_quizzes, 1);
    assert_eq!(s.total_score, 7);
    assert_eq!((s.last_score, s.last_total), (7, 10));
}

#[test]
fn counters_at_the_cap_still_record() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let key = profile_record("ann", ProfileRecord::QuizStats);
    let at_cap = stats(MAX_COUNTER, MAX_COUNTER, 1, 10);
    mem.set(&key, &serde_json::to_string(&at_cap).unwrap()).unwrap();

    let s = QuizStatsStore::new(&storage).record_result("ann", 5, 10);
    assert_eq!(s.total_quizzes, MAX_COUNTER);
    assert_eq!(s.total_score, MAX_COUNTER);
    assert_eq!(QuizStatsStore::new(&storage).load("ann"), s);
}
