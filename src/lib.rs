#[macro_use]
extern crate lazy_static;

pub mod colors;
pub mod error;
pub mod fingering;
pub mod formatting;
pub mod instrument;
pub mod notes;
pub mod reading;

use std::path::Path;

pub use crate::error::Error;
pub use crate::fingering::data::{Candidate, Note, Position};
pub use crate::fingering::{assign, find_candidates, rescue, Assigner};
pub use crate::formatting::OutputFormat;
pub use crate::instrument::{Instrument, InstrumentConfig};

/// Reads a melody from `path` (MIDI or JSON note list) and fingers it.
pub fn fingering_for_file(path: &Path, instrument: &Instrument) -> Result<Vec<Position>, Error> {
    let notes = reading::read_notes(path)?;
    let positions = fingering::assign(instrument, &notes)?;

    Ok(positions)
}

/// Reads, fingers and renders a melody in one go.
pub fn map_file(
    path: &Path,
    config: InstrumentConfig,
    format: OutputFormat,
) -> Result<String, Error> {
    let instrument = Instrument::new(config)?;
    let positions = fingering_for_file(path, &instrument)?;

    Ok(formatting::render(format, &instrument, &positions)?)
}

/// The flat, all-instrument note list of a MIDI file as JSON.
pub fn note_list_for_midi(path: &Path) -> Result<String, Error> {
    let smf = reading::midi::read_midi_file(path)?;
    let records = reading::midi::note_records(&smf)?;
    let json = reading::note_list::note_list_to_json(&records)
        .map_err(formatting::FormatError::from)?;

    Ok(json)
}
