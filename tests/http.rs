// End-to-end tests for the HTTP surface, driving the router directly.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chordmood::model::ModelRegistry;
use chordmood::predictions::PredictionLog;
use chordmood::server::{router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Mapping over {C, G, Am, F} with dense indices.
const MAPPING_JSON: &str = r#"{
    "chord_to_index": {"C": 0, "G": 1, "Am": 2, "F": 3},
    "index_to_chord": {"0": "C", "1": "G", "2": "Am", "3": "F"}
}"#;

/// Network whose output bias dominates, so every window predicts index 3
/// ("F") regardless of input. Makes generation fully predictable.
const NETWORK_JSON: &str = r#"{
    "vocab_size": 4,
    "embedding": [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0], [0.0, 0.0]],
    "hidden_weight": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0],
                      [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
    "hidden_bias": [0.0, 0.0, 0.0],
    "output_weight": [[0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]],
    "output_bias": [0.0, 0.0, 0.0, 5.0]
}"#;

/// Registry with artifacts for "happy" only, plus tempdir-scoped output dirs.
fn test_state(dir: &TempDir) -> AppState {
    let models_dir = dir.path().join("models");
    let mappings_dir = dir.path().join("mappings");
    std::fs::create_dir_all(&models_dir).unwrap();
    std::fs::create_dir_all(&mappings_dir).unwrap();
    std::fs::write(models_dir.join("happy_chord_model.json"), NETWORK_JSON).unwrap();
    std::fs::write(mappings_dir.join("happy_mappings.json"), MAPPING_JSON).unwrap();

    AppState {
        registry: Arc::new(ModelRegistry::load(&models_dir, &mappings_dir)),
        log: Arc::new(PredictionLog::open_in_memory().unwrap()),
        midi_dir: dir.path().join("midi"),
        chord_cache_dir: dir.path().join("static/midi"),
    }
}

async fn post_json(state: AppState, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = router(state)
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_raw(state: AppState, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_generate_progression_happy_path() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, body) = post_json(
        state.clone(),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "G", "Am"], "steps": 2, "mood": "happy"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["full_progression"],
        serde_json::json!(["C", "G", "Am", "F", "F"])
    );
    assert_eq!(body["midi_file"], "progression_happy.mid");
    assert!(dir.path().join("midi/progression_happy.mid").exists());

    // The generation was logged
    let (status, body) = get_raw(state, "/view-predictions").await;
    assert_eq!(status, StatusCode::OK);
    let records: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(records[0]["mood"], "happy");
    assert_eq!(records[0]["input_sequence"], "C,G,Am");
    assert_eq!(records[0]["generated_progression"], "C,G,Am,F,F");
}

#[tokio::test]
async fn test_generate_rejects_missing_fields() {
    let dir = TempDir::new().unwrap();
    let (status, body) = post_json(
        test_state(&dir),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "G", "Am"], "mood": "happy"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid input"));
}

#[tokio::test]
async fn test_generate_rejects_unknown_mood() {
    let dir = TempDir::new().unwrap();
    let (status, body) = post_json(
        test_state(&dir),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "G", "Am"], "steps": 1, "mood": "angry"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("angry"));
}

#[tokio::test]
async fn test_generate_rejects_unavailable_mood() {
    // "sad" is in the closed mood set but has no artifacts in the registry
    let dir = TempDir::new().unwrap();
    let (status, body) = post_json(
        test_state(&dir),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "G", "Am"], "steps": 1, "mood": "sad"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sad"));
}

#[tokio::test]
async fn test_generate_rejects_short_seed() {
    let dir = TempDir::new().unwrap();
    let (status, body) = post_json(
        test_state(&dir),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "X", "Y"], "steps": 1, "mood": "happy"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too short"));

    // No MIDI file and no log record for a rejected request
    assert!(!dir.path().join("midi/progression_happy.mid").exists());
}

#[tokio::test]
async fn test_download_midi_after_generation() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, _) = post_json(
        state.clone(),
        "/generate-progression",
        serde_json::json!({"sequence": ["C", "G", "Am"], "steps": 1, "mood": "happy"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, bytes) = get_raw(state, "/download-midi/happy").await;
    assert_eq!(status, StatusCode::OK);
    // Valid SMF payload
    assert!(midly::Smf::parse(&bytes).is_ok());
}

#[tokio::test]
async fn test_download_midi_missing_file_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, _) = get_raw(test_state(&dir), "/download-midi/sad").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_midi_unknown_mood_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, _) = get_raw(test_state(&dir), "/download-midi/angry").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_play_note_cached_and_byte_identical() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, first) = get_raw(state.clone(), "/play-note/C").await;
    assert_eq!(status, StatusCode::OK);
    assert!(dir.path().join("static/midi/C.mid").exists());

    let (status, second) = get_raw(state, "/play-note/C").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_play_note_unknown_chord_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, bytes) = get_raw(test_state(&dir), "/play-note/Zm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Zm"));
}

#[tokio::test]
async fn test_moods_lists_loaded_models_only() {
    let dir = TempDir::new().unwrap();
    let (status, bytes) = get_raw(test_state(&dir), "/moods").await;
    assert_eq!(status, StatusCode::OK);
    let moods: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(moods, serde_json::json!(["happy"]));
}
