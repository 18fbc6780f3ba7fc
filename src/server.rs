// HTTP surface
//
// Stateless request/response handlers over the shared registry and log.
// All JSON in/out except the MIDI downloads. Inference and file I/O run
// inline in the handler; there are no timeouts or retries, a slow model
// call simply blocks its request.

use crate::chords;
use crate::generate::{self, GenerateError};
use crate::midi;
use crate::model::{ModelRegistry, Mood};
use crate::predictions::{PredictionLog, PredictionRecord};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state. Registry and vocabulary are read-only after
/// startup; the log serializes its own writes.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub log: Arc<PredictionLog>,
    pub midi_dir: PathBuf,
    pub chord_cache_dir: PathBuf,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-progression", post(generate_progression))
        .route("/download-midi/:mood", get(download_midi))
        .route("/view-predictions", get(view_predictions))
        .route("/play-note/:chord", get(play_note))
        .route("/moods", get(list_moods))
        .with_state(state)
}

// ============================================================================
// Error mapping
// ============================================================================

/// Errors surfaced to HTTP callers as `{"error": ...}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Unknown mood '{0}'")]
    UnknownMood(String),

    #[error("No model or mappings found for mood '{0}'")]
    MoodUnavailable(Mood),

    #[error("Input sequence too short: need at least 3 recognized chords")]
    SeedTooShort,

    #[error("Chord '{0}' not recognized")]
    UnknownChord(String),

    #[error("MIDI file not found")]
    MidiNotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::UnknownMood(_)
            | ApiError::MoodUnavailable(_)
            | ApiError::SeedTooShort
            | ApiError::UnknownChord(_) => StatusCode::BAD_REQUEST,
            ApiError::MidiNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::SeedTooShort { .. } => ApiError::SeedTooShort,
            // Unresolvable indices mean a corrupted mapping, not caller error
            GenerateError::UnresolvableIndex(index) => {
                ApiError::Internal(format!("Predicted chord index {} not found", index))
            }
            other => ApiError::Internal(format!("Error generating progression: {}", other)),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub sequence: Vec<String>,
    pub steps: usize,
    pub mood: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub full_progression: Vec<String>,
    pub midi_file: String,
}

/// POST /generate-progression
async fn generate_progression(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    // Missing or malformed fields are caller errors, not a 422
    let Json(request) = payload.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let mood =
        Mood::parse(&request.mood).ok_or_else(|| ApiError::UnknownMood(request.mood.clone()))?;
    let model = state
        .registry
        .get(mood)
        .ok_or(ApiError::MoodUnavailable(mood))?;

    let progression =
        generate::extend_progression(&model.network, &model.mapping, &request.sequence, request.steps)?;

    midi::write_progression_file(&state.midi_dir, mood, &progression)
        .map_err(|e| ApiError::Internal(format!("Failed to write MIDI file: {}", e)))?;

    // Log append is best-effort; a failed write must not fail the request
    if let Err(e) = state.log.append(mood, &request.sequence, &progression) {
        log::warn!("Failed to record prediction: {}", e);
    }

    Ok(Json(GenerateResponse {
        full_progression: progression,
        midi_file: midi::progression_filename(mood),
    }))
}

/// GET /download-midi/{mood}
async fn download_midi(
    State(state): State<AppState>,
    Path(mood): Path<String>,
) -> Result<Response, ApiError> {
    let mood = Mood::parse(&mood).ok_or_else(|| ApiError::UnknownMood(mood.clone()))?;

    let filename = midi::progression_filename(mood);
    let bytes =
        std::fs::read(state.midi_dir.join(&filename)).map_err(|_| ApiError::MidiNotFound)?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/midi".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /view-predictions
async fn view_predictions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PredictionRecord>>, ApiError> {
    let records = state
        .log
        .all_records()
        .map_err(|e| ApiError::Internal(format!("Failed to read predictions: {}", e)))?;
    Ok(Json(records))
}

/// GET /play-note/{chord}
///
/// Single-triad MIDI for piano-key clicks. The chord name is validated
/// against the fixed vocabulary before it touches the filesystem.
async fn play_note(
    State(state): State<AppState>,
    Path(chord): Path<String>,
) -> Result<Response, ApiError> {
    if !chords::is_known(&chord) {
        return Err(ApiError::UnknownChord(chord));
    }

    let bytes = midi::cached_chord_midi(&state.chord_cache_dir, &chord)
        .map_err(|e| ApiError::Internal(format!("Failed to render chord: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "audio/midi".to_string())], bytes).into_response())
}

/// GET /moods - moods whose models loaded at startup, for front-end pickers.
async fn list_moods(State(state): State<AppState>) -> Json<Vec<Mood>> {
    Json(state.registry.available_moods())
}
