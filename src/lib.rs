// Chordmood - mood-conditioned chord progression generator
// Main library entry point

pub mod chords;
pub mod config;
pub mod generate;
pub mod midi;
pub mod model;
pub mod predictions;
pub mod server;
