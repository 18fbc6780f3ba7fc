// MIDI output for progressions and single chords
//
// Single-track SMF at a fixed 120 BPM: chord i occupies beat i, its triad's
// three pitches start on the beat with one-beat duration. An unknown chord
// name leaves its beat silent instead of failing; the beat still advances,
// so the stream always spans the full progression length.

use crate::chords;
use crate::model::Mood;
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::{Path, PathBuf};

/// Ticks per quarter note; one beat carries one chord.
const TICKS_PER_BEAT: u16 = 480;

/// Fixed playback tempo.
const TEMPO_BPM: u32 = 120;

/// Fixed note-on velocity.
const VELOCITY: u8 = 100;

const CHANNEL: u8 = 0;

/// File name for a mood's most recent progression.
pub fn progression_filename(mood: Mood) -> String {
    format!("progression_{}.mid", mood)
}

/// Render a chord progression to SMF bytes.
pub fn render_progression(chord_names: &[String]) -> anyhow::Result<Vec<u8>> {
    let smf = progression_to_smf(chord_names);
    let mut buf = Vec::new();
    smf.write(&mut buf).map_err(anyhow::Error::msg)?;
    Ok(buf)
}

/// Render a progression and write it to `{dir}/progression_{mood}.mid`,
/// overwriting any previous file for that mood.
pub fn write_progression_file(
    dir: &Path,
    mood: Mood,
    chord_names: &[String],
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(progression_filename(mood));
    let bytes = render_progression(chord_names)?;
    std::fs::write(&path, &bytes)?;
    log::info!("Wrote {} ({} chords)", path.display(), chord_names.len());
    Ok(path)
}

/// Single-triad MIDI for piano-key clicks, cached on disk by chord name.
///
/// Rendered and written on the first request, reread afterwards, so repeat
/// calls return identical bytes. Callers must validate the chord first; an
/// unknown name would cache a silent file.
pub fn cached_chord_midi(dir: &Path, chord: &str) -> anyhow::Result<Vec<u8>> {
    let path = dir.join(format!("{}.mid", chord));
    if path.exists() {
        return Ok(std::fs::read(&path)?);
    }

    let bytes = render_progression(&[chord.to_string()])?;
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, &bytes)?;
    log::info!("Cached chord MIDI at {}", path.display());
    Ok(bytes)
}

fn progression_to_smf(chord_names: &[String]) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));

    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Chord Progression")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / TEMPO_BPM))),
    });

    let beat_ticks = TICKS_PER_BEAT as u32;
    let mut last_tick: u32 = 0;

    for (beat, chord) in chord_names.iter().enumerate() {
        let Some(pitches) = chords::triad(chord) else {
            log::warn!("Skipping unknown chord '{}' in MIDI render", chord);
            continue;
        };

        let on_tick = beat as u32 * beat_ticks;
        let off_tick = on_tick + beat_ticks;

        for &pitch in &pitches {
            track.push(TrackEvent {
                delta: u28::new(on_tick - last_tick),
                kind: TrackEventKind::Midi {
                    channel: u4::new(CHANNEL),
                    message: MidiMessage::NoteOn {
                        key: u7::new(pitch),
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            last_tick = on_tick;
        }
        for &pitch in &pitches {
            track.push(TrackEvent {
                delta: u28::new(off_tick - last_tick),
                kind: TrackEventKind::Midi {
                    channel: u4::new(CHANNEL),
                    message: MidiMessage::NoteOff {
                        key: u7::new(pitch),
                        vel: u7::new(0),
                    },
                },
            });
            last_tick = off_tick;
        }
    }

    // End-of-track lands on the final beat boundary even when trailing
    // chords were unknown.
    let end_tick = chord_names.len() as u32 * beat_ticks;
    track.push(TrackEvent {
        delta: u28::new(end_tick.saturating_sub(last_tick)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);
    smf
}
