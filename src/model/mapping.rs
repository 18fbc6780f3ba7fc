// Chord <-> index mapping loaded from the trainer's JSON output

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Raw file shape. The trainer serializes both tables with string keys,
/// including the numeric keys of `index_to_chord`.
#[derive(Debug, Deserialize)]
struct MappingFile {
    chord_to_index: HashMap<String, usize>,
    index_to_chord: HashMap<String, String>,
}

/// Bidirectional chord <-> index table for one mood.
///
/// The index space is dense over the mood's training vocabulary; every
/// index the model can emit must resolve here.
#[derive(Debug, Clone)]
pub struct ChordMapping {
    chord_to_index: HashMap<String, usize>,
    index_to_chord: HashMap<usize, String>,
}

impl ChordMapping {
    /// Load a mapping file from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a mapping from its JSON representation.
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: MappingFile = serde_json::from_str(contents)?;

        if file.chord_to_index.is_empty() || file.index_to_chord.is_empty() {
            anyhow::bail!("mapping tables are empty");
        }

        let mut index_to_chord = HashMap::with_capacity(file.index_to_chord.len());
        for (key, chord) in file.index_to_chord {
            let index: usize = key
                .parse()
                .map_err(|_| anyhow::anyhow!("non-numeric index key in mapping: '{}'", key))?;
            index_to_chord.insert(index, chord);
        }

        Ok(Self {
            chord_to_index: file.chord_to_index,
            index_to_chord,
        })
    }

    /// Model input index for a chord name.
    pub fn index_of(&self, chord: &str) -> Option<usize> {
        self.chord_to_index.get(chord).copied()
    }

    /// Chord name for a model output index.
    pub fn chord_at(&self, index: usize) -> Option<&str> {
        self.index_to_chord.get(&index).map(String::as_str)
    }

    /// Size of the mood's chord vocabulary.
    pub fn vocab_size(&self) -> usize {
        self.chord_to_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING_JSON: &str = r#"{
        "chord_to_index": {"C": 0, "G": 1, "Am": 2, "F": 3},
        "index_to_chord": {"0": "C", "1": "G", "2": "Am", "3": "F"}
    }"#;

    #[test]
    fn test_parse_trainer_output() {
        let mapping = ChordMapping::from_json(MAPPING_JSON).unwrap();
        assert_eq!(mapping.vocab_size(), 4);
        assert_eq!(mapping.index_of("Am"), Some(2));
        assert_eq!(mapping.chord_at(3), Some("F"));
        assert_eq!(mapping.index_of("Dm"), None);
        assert_eq!(mapping.chord_at(7), None);
    }

    #[test]
    fn test_empty_mapping_rejected() {
        let result = ChordMapping::from_json(r#"{"chord_to_index": {}, "index_to_chord": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_index_key_rejected() {
        let result = ChordMapping::from_json(
            r#"{"chord_to_index": {"C": 0}, "index_to_chord": {"zero": "C"}}"#,
        );
        assert!(result.is_err());
    }
}
