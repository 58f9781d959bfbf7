pub mod data;
pub mod error;

use self::data::*;
use self::error::FingeringError;
use crate::instrument::Instrument;
use crate::notes;

/// Transpositions tried, in order, when a pitch can't be played where it is.
/// Down comes before up, and only a single octave is ever tried.
pub const OCTAVE_SHIFTS: [i32; 2] = [-12, 12];

/// Every (string, fret) pair that sounds `pitch`, in ascending string order.
///
/// An empty result just means the pitch is out of reach; it is not an error.
pub fn find_candidates(instrument: &Instrument, pitch: i32) -> Vec<Candidate> {
    (0..instrument.string_count())
        .filter_map(|string| {
            instrument
                .fret_for(string, pitch)
                .map(|fret| Candidate { string, fret })
        })
        .collect()
}

/// Candidates for `pitch`, falling back to the octave below and then the octave
/// above when the pitch itself is unreachable. Empty if all three fail.
pub fn rescue(instrument: &Instrument, pitch: i32) -> Vec<Candidate> {
    rescue_with_shift(instrument, pitch)
        .map(|(_, candidates)| candidates)
        .unwrap_or_default()
}

/// Like `rescue`, but also reports the transposition that was used
/// (0 when the pitch was reachable as written).
pub fn rescue_with_shift(instrument: &Instrument, pitch: i32) -> Option<(i32, Vec<Candidate>)> {
    std::iter::once(0)
        .chain(OCTAVE_SHIFTS.iter().copied())
        .map(|shift| (shift, find_candidates(instrument, pitch.saturating_add(shift))))
        .find(|(_, candidates)| !candidates.is_empty())
}

/// The candidate whose fret is closest to `last_fret`.
///
/// Exact ties go to the earliest candidate, i.e. the lowest string index,
/// because `min_by_key` keeps the first of several equal minima.
pub fn closest_candidate(candidates: &[Candidate], last_fret: u32) -> Option<Candidate> {
    candidates
        .iter()
        .copied()
        .min_by_key(|candidate| (i64::from(candidate.fret) - i64::from(last_fret)).abs())
}

/// Greedy note-by-note fingering over one instrument.
///
/// Each choice depends on the fret chosen for the previous note, so a single
/// melody has to be fed through in start order. Separate melodies each get
/// their own `Assigner`.
#[derive(Debug, Clone)]
pub struct Assigner<'a> {
    instrument: &'a Instrument,
    state: AssignerState,
}

impl<'a> Assigner<'a> {
    pub fn new(instrument: &'a Instrument) -> Self {
        Assigner {
            instrument,
            state: AssignerState::default(),
        }
    }

    pub fn state(&self) -> AssignerState {
        self.state
    }

    /// Resolves the next note of the melody. On error the state is left as it
    /// was before the call.
    pub fn resolve(&mut self, note: &Note) -> Result<Position, FingeringError> {
        let (shift, candidates) = rescue_with_shift(self.instrument, note.pitch)
            .ok_or(FingeringError::UnplayableNote { pitch: note.pitch })?;

        if shift != 0 {
            log::debug!(
                "Note {} at {}s shifted {} to {}",
                notes::pitch_name(note.pitch),
                note.start,
                if shift < 0 { "down an octave" } else { "up an octave" },
                notes::pitch_name(note.pitch.saturating_add(shift)),
            );
        }

        let chosen = closest_candidate(&candidates, self.state.last_fret)
            .ok_or(FingeringError::UnplayableNote { pitch: note.pitch })?;

        self.state.last_fret = chosen.fret;

        Ok(Position {
            start: note.start,
            end: note.end,
            string: chosen.string,
            fret: chosen.fret,
        })
    }
}

/// Fingers a whole melody.
///
/// Notes are put in start order first (stable, so simultaneous notes keep
/// their input order). Any unplayable note fails the whole run.
pub fn assign(instrument: &Instrument, notes: &[Note]) -> Result<Vec<Position>, FingeringError> {
    let mut ordered = notes.to_vec();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut assigner = Assigner::new(instrument);

    let positions = ordered
        .iter()
        .map(|note| assigner.resolve(note))
        .collect::<Result<Vec<Position>, FingeringError>>()?;

    log::info!(
        "Fingered {} notes on a {}-string instrument",
        positions.len(),
        instrument.string_count()
    );

    Ok(positions)
}
