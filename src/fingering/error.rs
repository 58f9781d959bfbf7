use thiserror::Error;

use crate::notes;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingeringError {
    #[error("Note {pitch} ({}) is not playable, even after an octave shift.", name_of(.pitch))]
    UnplayableNote { pitch: i32 },
}

fn name_of(pitch: &i32) -> String {
    notes::pitch_name(*pitch)
}
