/// A timed pitch event. Times are in seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Note {
    pub start: f64,
    pub end: f64,
    pub pitch: i32,
}

impl Note {
    pub fn new(start: f64, end: f64, pitch: i32) -> Self {
        Note { start, end, pitch }
    }
}

/// One way of playing a pitch: a string index and the fret to stop it at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub string: usize,
    pub fret: u32,
}

/// The resolved fingering for one note.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position {
    pub start: f64,
    pub end: f64,
    pub string: usize,
    pub fret: u32,
}

/// State carried from one note to the next within a single run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AssignerState {
    pub last_fret: u32,
}
