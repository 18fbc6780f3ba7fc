// Per-mood model loading and lookup

pub mod mapping;
pub mod network;

pub use mapping::ChordMapping;
pub use network::ChordNetwork;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Closed set of moods with trained models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Calm,
    Excited,
    Melancholic,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Calm,
        Mood::Excited,
        Mood::Melancholic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Calm => "calm",
            Mood::Excited => "excited",
            Mood::Melancholic => "melancholic",
        }
    }

    /// Parse a lowercase mood name, None for anything outside the set.
    pub fn parse(name: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network + mapping pair for one mood.
pub struct MoodModel {
    pub network: ChordNetwork,
    pub mapping: ChordMapping,
}

/// Read-only table of loaded mood models.
///
/// Populated once at startup and shared across requests; a mood whose
/// artifacts failed to load is simply absent.
pub struct ModelRegistry {
    models: HashMap<Mood, MoodModel>,
}

impl ModelRegistry {
    /// Load every mood's artifacts from disk. A mood whose model or mapping
    /// cannot be loaded is logged and left out; startup continues.
    pub fn load(models_dir: &Path, mappings_dir: &Path) -> Self {
        let mut models = HashMap::new();
        for mood in Mood::ALL {
            let model_path = models_dir.join(format!("{}_chord_model.json", mood));
            let mapping_path = mappings_dir.join(format!("{}_mappings.json", mood));
            match Self::load_mood(&model_path, &mapping_path) {
                Ok(model) => {
                    log::info!(
                        "Loaded model for '{}' ({} chords)",
                        mood,
                        model.mapping.vocab_size()
                    );
                    models.insert(mood, model);
                }
                Err(e) => {
                    log::error!("Model for '{}' unavailable: {:#}", mood, e);
                }
            }
        }
        Self { models }
    }

    fn load_mood(model_path: &Path, mapping_path: &Path) -> anyhow::Result<MoodModel> {
        let network = ChordNetwork::load(model_path)
            .with_context(|| format!("loading {}", model_path.display()))?;
        let mapping = ChordMapping::load(mapping_path)
            .with_context(|| format!("loading {}", mapping_path.display()))?;
        if network.vocab_size() != mapping.vocab_size() {
            anyhow::bail!(
                "model predicts over {} chords but mapping has {}",
                network.vocab_size(),
                mapping.vocab_size()
            );
        }
        Ok(MoodModel { network, mapping })
    }

    /// Model + mapping for a mood, None if its artifacts did not load.
    pub fn get(&self, mood: Mood) -> Option<&MoodModel> {
        self.models.get(&mood)
    }

    /// Moods with a loaded model, sorted by name.
    pub fn available_moods(&self) -> Vec<Mood> {
        let mut moods: Vec<Mood> = self.models.keys().copied().collect();
        moods.sort_by_key(|m| m.as_str());
        moods
    }
}
