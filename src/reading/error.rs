use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("`{}` is not a valid MIDI file: {message}", .path.display())]
    InvalidMidi { path: PathBuf, message: String },

    #[error("Unsupported MIDI time division {division}; only ticks per beat are supported.")]
    UnsupportedDivision { division: i16 },

    #[error("No instruments in MIDI file.")]
    NoInstruments,

    #[error("Invalid note list: {0}")]
    InvalidNoteList(#[from] serde_json::Error),

    #[error("Note {index} has invalid timing: start {start}, end {end}. Notes must start at or after 0 and end at or after their start.")]
    InvalidTiming { index: usize, start: f64, end: f64 },

    #[error("Don't know how to read `{}`; expected a .mid, .midi or .json file.", .path.display())]
    UnknownFormat { path: PathBuf },
}
