// tests/state_store.rs
//! Durable state behavior: lenient bootstrap, atomic persist, bounded
//! histories surviving the round trip.

use sitewatch::state::{RunState, StateStore};

#[tokio::test]
async fn missing_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    let state = store.load().await;
    assert!(state.sections.is_empty());
    assert!(state.last_run.is_none());
}

#[tokio::test]
async fn corrupt_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    std::fs::write(&path, r#"{"sections": [1, 2, 3]}"#).unwrap();
    let store = StateStore::new(&path);
    let state = store.load().await;
    assert!(state.sections.is_empty());
}

#[tokio::test]
async fn persist_then_load_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("nested/dir/state.json"));

    let mut state = RunState::default();
    let sect = state.section_mut("news");
    sect.seen.record("tok-a", 100);
    sect.seen.record("tok-b", 100);
    sect.last_check = Some(chrono::Utc::now());
    state.last_run = Some(chrono::Utc::now());

    store.persist(&state).await.unwrap();
    let back = store.load().await;
    let sect = back.section("news").unwrap();
    assert!(sect.seen.contains("tok-a"));
    assert!(sect.seen.contains("tok-b"));
    assert_eq!(sect.seen.len(), 2);
    assert!(sect.last_check.is_some());
    assert!(back.last_run.is_some());
}

#[tokio::test]
async fn persist_leaves_no_temp_file_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    let store = StateStore::new(&path);
    store.persist(&RunState::default()).await.unwrap();

    assert!(path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn sections_unknown_to_the_config_survive_persist() {
    // forward-readable both ways: state written by a deployment with more
    // sections still loads, and untouched sections keep their history
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));

    let mut state = RunState::default();
    state.section_mut("retired-section").seen.record("tok", 100);
    store.persist(&state).await.unwrap();

    let back = store.load().await;
    assert!(back.section("retired-section").unwrap().seen.contains("tok"));
    assert!(back.section("brand-new-section").is_none());
}

#[tokio::test]
async fn on_disk_shape_is_a_plain_token_list() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    let store = StateStore::new(&path);

    let mut state = RunState::default();
    state.section_mut("news").seen.record("tok-a", 100);
    store.persist(&state).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["sections"]["news"]["seen"], serde_json::json!(["tok-a"]));
}
