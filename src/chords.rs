// Fixed chord vocabulary: 7 major and 7 minor triads

/// All chord names in the vocabulary.
pub const CHORD_NAMES: [&str; 14] = [
    "C", "Cm", "D", "Dm", "E", "Em", "F", "Fm", "G", "Gm", "A", "Am", "B", "Bm",
];

/// MIDI pitches for a named triad, or None for anything outside the
/// 14-chord vocabulary.
pub fn triad(chord: &str) -> Option<[u8; 3]> {
    let pitches = match chord {
        "C" => [60, 64, 67],
        "Cm" => [60, 63, 67],
        "D" => [62, 66, 69],
        "Dm" => [62, 65, 69],
        "E" => [64, 68, 71],
        "Em" => [64, 67, 71],
        "F" => [65, 69, 72],
        "Fm" => [65, 68, 72],
        "G" => [67, 71, 74],
        "Gm" => [67, 70, 74],
        "A" => [69, 73, 76],
        "Am" => [69, 72, 76],
        "B" => [71, 75, 78],
        "Bm" => [71, 74, 78],
        _ => return None,
    };
    Some(pitches)
}

/// Whether a chord name is part of the fixed vocabulary.
pub fn is_known(chord: &str) -> bool {
    triad(chord).is_some()
}
