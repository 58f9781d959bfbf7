use thiserror::Error;

use crate::notes;

/// Open-string pitches of the standard dombyra tuning: A2 and D4.
pub const DOMBYRA_TUNING: [i32; 2] = [45, 62];
pub const DOMBYRA_FRETS: u32 = 19;

/// No fret beyond this can reach a MIDI pitch from any open string.
pub const MAX_FRET: u32 = 127;
/// Open strings have to be valid MIDI pitches.
pub const MAX_OPEN_PITCH: i32 = 127;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstrumentError {
    #[error("an instrument needs at least one string")]
    EmptyTuning,

    #[error("{max_fret} frets is too many; an instrument can have at most {} frets", MAX_FRET)]
    TooManyFrets { max_fret: u32 },

    #[error("open string pitch {pitch} is outside the MIDI range 0 to {}", MAX_OPEN_PITCH)]
    OpenPitchOutOfRange { pitch: i32 },

    #[error("invalid tuning `{text}`: {reason}")]
    InvalidTuning { text: String, reason: String },
}

/// Everything needed to build an `Instrument`. Defaults to the dombyra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentConfig {
    pub tuning: Vec<i32>,
    pub max_fret: u32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            tuning: DOMBYRA_TUNING.to_vec(),
            max_fret: DOMBYRA_FRETS,
        }
    }
}

impl InstrumentConfig {
    /// Parses a comma separated list of pitches, each either a MIDI number or a
    /// note name like `A2`.
    pub fn parse_tuning(text: &str) -> Result<Vec<i32>, InstrumentError> {
        let tuning = text
            .split(',')
            .map(str::trim)
            .filter(|pitch| !pitch.is_empty())
            .map(|pitch| {
                notes::parse_pitch(pitch).ok_or_else(|| InstrumentError::InvalidTuning {
                    text: text.to_owned(),
                    reason: format!("`{}` is not a pitch", pitch),
                })
            })
            .collect::<Result<Vec<i32>, InstrumentError>>()?;

        if tuning.is_empty() {
            return Err(InstrumentError::EmptyTuning);
        }

        Ok(tuning)
    }
}

/// A fretted instrument: one open pitch per string plus the highest usable fret.
///
/// Immutable once built, so a single instrument can be shared by any number of
/// fingering runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    tuning: Vec<i32>,
    max_fret: u32,
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument {
            tuning: DOMBYRA_TUNING.to_vec(),
            max_fret: DOMBYRA_FRETS,
        }
    }
}

impl Instrument {
    pub fn new(config: InstrumentConfig) -> Result<Self, InstrumentError> {
        let InstrumentConfig { tuning, max_fret } = config;

        if tuning.is_empty() {
            return Err(InstrumentError::EmptyTuning);
        }

        if max_fret > MAX_FRET {
            return Err(InstrumentError::TooManyFrets { max_fret });
        }

        if let Some(&pitch) = tuning
            .iter()
            .find(|&&pitch| !(0..=MAX_OPEN_PITCH).contains(&pitch))
        {
            return Err(InstrumentError::OpenPitchOutOfRange { pitch });
        }

        Ok(Instrument { tuning, max_fret })
    }

    pub fn tuning(&self) -> &[i32] {
        &self.tuning
    }

    pub fn max_fret(&self) -> u32 {
        self.max_fret
    }

    pub fn string_count(&self) -> usize {
        self.tuning.len()
    }

    /// The fret that sounds `pitch` on `string`, or `None` when the pitch lies
    /// below the open string or above the last fret. Unknown strings are never
    /// reachable.
    pub fn fret_for(&self, string: usize, pitch: i32) -> Option<u32> {
        let open = *self.tuning.get(string)?;
        let fret = i64::from(pitch) - i64::from(open);

        if (0..=i64::from(self.max_fret)).contains(&fret) {
            Some(fret as u32)
        } else {
            None
        }
    }

    pub fn is_reachable(&self, string: usize, pitch: i32) -> bool {
        self.fret_for(string, pitch).is_some()
    }

    /// Both open strings and frets are bounded at construction, so these sums
    /// stay within a couple of octaves of the MIDI range.
    pub fn lowest_pitch(&self) -> i32 {
        self.tuning.iter().copied().min().unwrap_or_default()
    }

    pub fn highest_pitch(&self) -> i32 {
        self.tuning
            .iter()
            .map(|&open| open + self.max_fret as i32)
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_dombyra() {
        let instrument = Instrument::new(InstrumentConfig::default()).unwrap();
        assert_eq!(instrument, Instrument::default());
        assert_eq!(instrument.tuning(), &[45, 62]);
        assert_eq!(instrument.max_fret(), 19);
        assert_eq!(instrument.string_count(), 2);
    }

    #[test]
    fn empty_tuning_is_rejected() {
        let config = InstrumentConfig {
            tuning: vec![],
            max_fret: 12,
        };
        assert_eq!(Instrument::new(config), Err(InstrumentError::EmptyTuning));
    }

    #[test]
    fn fret_is_offset_from_open_string() {
        let instrument = Instrument::default();

        assert_eq!(instrument.fret_for(0, 45), Some(0));
        assert_eq!(instrument.fret_for(0, 64), Some(19));
        assert_eq!(instrument.fret_for(0, 65), None);
        assert_eq!(instrument.fret_for(0, 44), None);
        assert_eq!(instrument.fret_for(1, 64), Some(2));
        assert_eq!(instrument.fret_for(2, 64), None);
    }

    #[test]
    fn zero_fret_instrument_only_plays_open_strings() {
        let instrument = Instrument::new(InstrumentConfig {
            tuning: vec![40, 45],
            max_fret: 0,
        })
        .unwrap();

        assert!(instrument.is_reachable(0, 40));
        assert!(!instrument.is_reachable(0, 41));
        assert!(instrument.is_reachable(1, 45));
    }

    #[test]
    fn oversized_instruments_are_rejected() {
        let too_many_frets = InstrumentConfig {
            tuning: vec![45, 62],
            max_fret: i32::MAX as u32,
        };
        assert_eq!(
            Instrument::new(too_many_frets),
            Err(InstrumentError::TooManyFrets {
                max_fret: i32::MAX as u32
            })
        );

        let too_high = InstrumentConfig {
            tuning: vec![45, i32::MAX],
            max_fret: 19,
        };
        assert_eq!(
            Instrument::new(too_high),
            Err(InstrumentError::OpenPitchOutOfRange { pitch: i32::MAX })
        );
    }

    #[test]
    fn widest_instrument_has_a_range() {
        let instrument = Instrument::new(InstrumentConfig {
            tuning: vec![0, 127],
            max_fret: MAX_FRET,
        })
        .unwrap();

        assert_eq!(instrument.lowest_pitch(), 0);
        assert_eq!(instrument.highest_pitch(), 254);
    }

    #[test]
    fn playable_range() {
        let instrument = Instrument::default();
        assert_eq!(instrument.lowest_pitch(), 45);
        assert_eq!(instrument.highest_pitch(), 81);
    }

    #[test]
    fn parse_tuning_accepts_names_and_numbers() {
        assert_eq!(InstrumentConfig::parse_tuning("A2, D4"), Ok(vec![45, 62]));
        assert_eq!(InstrumentConfig::parse_tuning("45,62"), Ok(vec![45, 62]));
        assert_eq!(InstrumentConfig::parse_tuning(" , "), Err(InstrumentError::EmptyTuning));
        assert!(InstrumentConfig::parse_tuning("A2,H9").is_err());
    }
}
