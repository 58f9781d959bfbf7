pub mod error;
pub mod midi;
pub mod note_list;

use std::path::Path;

use self::error::ReadError;
use crate::fingering::data::Note;

/// Reads a melody from a MIDI file or a JSON note list, picked by extension.
pub fn read_notes(path: &Path) -> Result<Vec<Note>, ReadError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("mid") | Some("midi") => {
            let smf = midi::read_midi_file(path)?;
            midi::melody(&smf)
        }

        Some("json") => {
            let source = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
                path: path.to_owned(),
                source,
            })?;
            note_list::parse_note_list(&source)
        }

        _ => Err(ReadError::UnknownFormat {
            path: path.to_owned(),
        }),
    }
}
