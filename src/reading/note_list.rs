use serde::{Deserialize, Serialize};

use super::error::ReadError;
use crate::fingering::data::Note;
use crate::formatting::round_time;
use crate::notes;

/// One entry of a JSON note list.
///
/// Only `start`, `end` and `pitch` are needed to read a list back in; the
/// other fields are there for people reading the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(default = "unknown_instrument")]
    pub instrument: String,
    pub start: f64,
    pub end: f64,
    pub pitch: i32,
    #[serde(default)]
    pub name: String,
}

fn unknown_instrument() -> String {
    "unknown".to_owned()
}

impl NoteRecord {
    /// A record with times rounded for display.
    pub fn rounded(instrument: &str, note: &Note) -> Self {
        NoteRecord {
            instrument: if instrument.is_empty() {
                unknown_instrument()
            } else {
                instrument.to_owned()
            },
            start: round_time(note.start),
            end: round_time(note.end),
            pitch: note.pitch,
            name: notes::pitch_name(note.pitch),
        }
    }

    pub fn note(&self) -> Note {
        Note::new(self.start, self.end, self.pitch)
    }
}

pub fn parse_note_list(source: &str) -> Result<Vec<Note>, ReadError> {
    let records: Vec<NoteRecord> = serde_json::from_str(source)?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let valid = record.start >= 0.0 && record.end >= record.start;
            if valid {
                Ok(record.note())
            } else {
                Err(ReadError::InvalidTiming {
                    index,
                    start: record.start,
                    end: record.end,
                })
            }
        })
        .collect()
}

pub fn note_list_to_json(records: &[NoteRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
