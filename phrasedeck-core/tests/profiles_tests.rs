mod common;

use common::{day, storage_on};
use phrasedeck_core::profiles::{self, slugify};
use phrasedeck_core::storage::keys::{self, profile_record, ProfileRecord};
use phrasedeck_core::{CoreError, KeyValueStore, ProfileRegistry, Storage};
use serde_json::json;

#[test]
fn fresh_load_creates_guest() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let state = ProfileRegistry::new(&storage).load();

    assert_eq!(state.profiles.len(), 1);
    assert_eq!(state.active().id, "guest");
    assert_eq!(state.active().name, "Guest");
    assert!(mem.get(keys::PROFILES).unwrap().is_some());
}

#[test]
fn switch_active_to_member_and_non_member() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);
    let ann = reg.create("Ann").into_result().unwrap();
    let ann_id = ann.active_profile_id.clone();

    let back = reg.switch_active("guest");
    assert_eq!(back.active().id, "guest");

    let again = reg.switch_active(&ann_id);
    assert_eq!(again.active().id, ann_id);
    assert_eq!(reg.load().active_profile_id, ann_id);

    let unchanged = reg.switch_active("nobody");
    assert_eq!(unchanged, again);
}

#[test]
fn create_validates_names() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);

    let empty = reg.create("   ");
    assert_eq!(empty.error, Some(CoreError::Validation("Profile name is required.")));
    assert_eq!(empty.state.profiles.len(), 1);

    let dup = reg.create(" gUeSt ");
    assert_eq!(dup.error, Some(CoreError::Validation("Profile name already exists.")));
    assert_eq!(dup.state, reg.load());
}

#[test]
fn create_appends_and_activates() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);

    let out = reg.create("  Ann Marie ");
    assert!(out.is_ok());
    let active = out.state.active();
    assert_eq!(active.name, "Ann Marie");
    assert!(active.id.starts_with("ann-marie-"));
    assert_eq!(out.state.profiles.len(), 2);
    assert_eq!(reg.load(), out.state);
}

#[test]
fn generated_ids_are_unique() {
    let ids: std::collections::HashSet<String> =
        (0..50).map(|_| profiles::generate_profile_id("Same")).collect();
    assert!(ids.len() > 45);
    assert!(ids.iter().all(|id| id.starts_with("same-")));
}

#[test]
fn slugs() {
    assert_eq!(slugify("Ann Marie!"), "ann-marie");
    assert_eq!(slugify("--x--y--"), "x-y");
    assert_eq!(slugify("   "), "profile");
    assert_eq!(slugify("مرحبا"), "profile");
}

#[test]
fn delete_cascades_and_reassigns_active() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);
    let ann_id = reg.create("Ann").state.active_profile_id;

    let learn_key = profile_record(&ann_id, ProfileRecord::LearnProgress);
    let quiz_key = profile_record(&ann_id, ProfileRecord::QuizStats);
    mem.set(&learn_key, "{}").unwrap();
    mem.set(&quiz_key, "{}").unwrap();

    let out = reg.delete(&ann_id);
    assert!(out.is_ok());
    assert_eq!(out.state.active().id, "guest");
    assert!(!out.state.contains(&ann_id));
    assert_eq!(mem.get(&learn_key).unwrap(), None);
    assert_eq!(mem.get(&quiz_key).unwrap(), None);
}

#[test]
fn deleting_last_profile_recreates_default() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);
    let ann_id = reg.create("Ann").state.active_profile_id;
    reg.delete("guest").into_result().unwrap();

    let out = reg.delete(&ann_id);
    assert!(out.is_ok());
    assert_eq!(out.state.profiles.len(), 1);
    assert_eq!(out.state.active().id, "guest");
    assert_eq!(out.state.active_profile_id, "guest");
}

#[test]
fn delete_missing_profile_is_not_found() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);
    let out = reg.delete("ghost");
    assert_eq!(out.error, Some(CoreError::NotFound("Profile not found.")));
    assert_eq!(out.state.profiles.len(), 1);
}

#[test]
fn normalize_repairs_stored_state() {
    let raw = json!({
        "activeProfileId": "gone",
        "profiles": [
            {"id": " a ", "name": " Ann "},
            {"id": "", "name": "No id"},
            {"id": "b"},
            "junk",
            {"id": "c", "name": "Cy"}
        ]
    });
    let state = profiles::normalize(Some(&raw));
    let ids: Vec<&str> = state.profiles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(state.profiles[0].name, "Ann");
    assert_eq!(state.active_profile_id, "a");

    let empty = profiles::normalize(Some(&json!({"profiles": []})));
    assert_eq!(empty.active().id, "guest");
    assert_eq!(profiles::normalize(Some(&json!(42))), empty);
}

#[test]
fn corrupt_registry_falls_back_and_heals() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    mem.set(keys::PROFILES, "{not json").unwrap();
    let state = ProfileRegistry::new(&storage).load();
    assert_eq!(state.active().id, "guest");
    let healed: serde_json::Value =
        serde_json::from_str(&mem.get(keys::PROFILES).unwrap().unwrap()).unwrap();
    assert_eq!(healed["activeProfileId"], "guest");
}

#[test]
fn legacy_records_migrate_once() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    mem.set(keys::LEGACY_LEARN_PROGRESS, r#"{"itemStatus":{"p001":"known"}}"#).unwrap();
    mem.set(keys::LEGACY_QUIZ_STATS, r#"{"totalQuizzes":3}"#).unwrap();

    let reg = ProfileRegistry::new(&storage);
    reg.load();

    let learn_key = profile_record("guest", ProfileRecord::LearnProgress);
    let quiz_key = profile_record("guest", ProfileRecord::QuizStats);
    assert_eq!(
        mem.get(&learn_key).unwrap().as_deref(),
        Some(r#"{"itemStatus":{"p001":"known"}}"#)
    );
    assert_eq!(mem.get(&quiz_key).unwrap().as_deref(), Some(r#"{"totalQuizzes":3}"#));
    assert_eq!(mem.get(keys::LEGACY_MIGRATED).unwrap().as_deref(), Some("true"));

    mem.remove(&learn_key).unwrap();
    mem.set(keys::LEGACY_LEARN_PROGRESS, r#"{"itemStatus":{"p002":"known"}}"#).unwrap();
    reg.load();
    assert_eq!(mem.get(&learn_key).unwrap(), None);
}

#[test]
fn legacy_migration_keeps_existing_records() {
    let (mem, storage) = storage_on(day(2024, 5, 1));
    let learn_key = profile_record("guest", ProfileRecord::LearnProgress);
    mem.set(&learn_key, "current").unwrap();
    mem.set(keys::LEGACY_LEARN_PROGRESS, "legacy").unwrap();

    ProfileRegistry::new(&storage).load();
    assert_eq!(mem.get(&learn_key).unwrap().as_deref(), Some("current"));
}

#[test]
fn registry_without_store_still_answers() {
    let storage = Storage::unavailable();
    let reg = ProfileRegistry::new(&storage);
    assert_eq!(reg.load().active().id, "guest");

    // Nothing persists, so the new profile is gone on the next load.
    let out = reg.create("Ann");
    assert!(out.is_ok());
    assert_eq!(out.state.active().name, "Ann");
    assert_eq!(reg.load().profiles.len(), 1);
}

#[test]
fn find_by_id_or_name() {
    let (_mem, storage) = storage_on(day(2024, 5, 1));
    let reg = ProfileRegistry::new(&storage);
    let state = reg.create("Ann").state;
    let ann_id = state.active_profile_id.clone();

    assert_eq!(profiles::find(&state, "ANN").map(|p| p.id.clone()), Some(ann_id.clone()));
    assert_eq!(profiles::find(&state, &ann_id).map(|p| p.name.as_str()), Some("Ann"));
    assert!(profiles::find(&state, "bob").is_none());
}
