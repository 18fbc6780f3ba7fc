// Next-chord progression generation

use crate::model::{ChordMapping, ChordNetwork};
use thiserror::Error;

/// Window length the models are trained on: predictions always look at the
/// last three chord indices.
pub const WINDOW: usize = 3;

/// Source of next-chord distributions.
///
/// Implemented by the loaded network; tests substitute deterministic stubs
/// so the generator can be exercised without model artifacts. Implementors
/// must tolerate concurrent calls without mutating shared state.
pub trait NextChordPredictor {
    fn predict(&self, window: [usize; WINDOW]) -> anyhow::Result<Vec<f32>>;
}

impl NextChordPredictor for ChordNetwork {
    fn predict(&self, window: [usize; WINDOW]) -> anyhow::Result<Vec<f32>> {
        ChordNetwork::predict(self, window)
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Fewer than three seed chords are in the mood's vocabulary. Caller error.
    #[error("input sequence too short: {recognized} recognized chords, need at least 3")]
    SeedTooShort { recognized: usize },

    /// The model produced an index the mapping cannot resolve. Indicates a
    /// corrupted mapping, not caller error.
    #[error("predicted chord index {0} not found in mapping")]
    UnresolvableIndex(usize),

    /// The model returned an empty distribution.
    #[error("model returned an empty distribution")]
    EmptyDistribution,

    #[error("inference failed: {0}")]
    Inference(#[source] anyhow::Error),
}

/// Extend `seed` by `steps` predicted chords.
///
/// The seed appears verbatim at the front of the output; chords the mapping
/// does not know are ignored for prediction only. Each step feeds the last
/// three known indices to the predictor and appends the arg-max chord, so
/// the result is deterministic for a fixed model. Nothing is persisted here;
/// a failed step aborts the whole generation.
pub fn extend_progression(
    predictor: &dyn NextChordPredictor,
    mapping: &ChordMapping,
    seed: &[String],
    steps: usize,
) -> Result<Vec<String>, GenerateError> {
    let mut indices: Vec<usize> = seed.iter().filter_map(|c| mapping.index_of(c)).collect();
    if indices.len() < WINDOW {
        return Err(GenerateError::SeedTooShort {
            recognized: indices.len(),
        });
    }

    let mut progression: Vec<String> = seed.to_vec();
    for _ in 0..steps {
        let len = indices.len();
        let window = [indices[len - 3], indices[len - 2], indices[len - 1]];

        let distribution = predictor.predict(window).map_err(GenerateError::Inference)?;
        let next = argmax(&distribution).ok_or(GenerateError::EmptyDistribution)?;
        let chord = mapping
            .chord_at(next)
            .ok_or(GenerateError::UnresolvableIndex(next))?;

        progression.push(chord.to_string());
        indices.push(next);
    }

    Ok(progression)
}

/// Index of the largest probability; the first maximum wins on ties.
fn argmax(distribution: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in distribution.iter().enumerate() {
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}
