use std::collections::BTreeMap;
use std::path::Path;

use rimd::{Event, MetaCommand, SMF};

use super::error::ReadError;
use super::note_list::NoteRecord;
use crate::fingering::data::Note;

const DEFAULT_MICROSECONDS_PER_BEAT: u32 = 500_000;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const PITCH_BEND: u8 = 0xE0;

/// The notes played by one program on one channel of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiInstrument {
    pub name: String,
    pub track: usize,
    pub program: u8,
    pub channel: u8,
    pub notes: Vec<Note>,
}

pub fn read_midi_file(path: &Path) -> Result<SMF, ReadError> {
    SMF::from_file(path).map_err(|err| ReadError::InvalidMidi {
        path: path.to_owned(),
        message: format!("{}", err),
    })
}

/// The notes of the first instrument in the file, sorted by start time.
pub fn melody(smf: &SMF) -> Result<Vec<Note>, ReadError> {
    instruments(smf)?
        .into_iter()
        .next()
        .map(|instrument| instrument.notes)
        .ok_or(ReadError::NoInstruments)
}

/// Every note of every instrument as flat records, sorted by start time.
pub fn note_records(smf: &SMF) -> Result<Vec<NoteRecord>, ReadError> {
    let mut records = instruments(smf)?
        .into_iter()
        .flat_map(|instrument| {
            let name = instrument.name;
            instrument
                .notes
                .into_iter()
                .map(move |note| NoteRecord::rounded(&name, &note))
        })
        .collect::<Vec<NoteRecord>>();

    records.sort_by(|a, b| a.start.total_cmp(&b.start));

    Ok(records)
}

/// Splits the file into instruments, one per (track, program, channel).
///
/// An instrument comes into being the first time one of its notes is closed or
/// it receives a control change or pitch bend, and instruments are listed in
/// that order. It may end up with no notes at all.
pub fn instruments(smf: &SMF) -> Result<Vec<MidiInstrument>, ReadError> {
    if smf.division <= 0 {
        return Err(ReadError::UnsupportedDivision {
            division: smf.division,
        });
    }

    let tempo_map = TempoMap::new(smf);
    let mut instruments: Vec<MidiInstrument> = Vec::new();

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let name = track.name.clone().unwrap_or_default();

        // (program, channel) -> index into `instruments`, for this track only.
        let mut track_instruments: BTreeMap<(u8, u8), usize> = BTreeMap::new();
        let mut programs = [0u8; 16];
        let mut open_notes: BTreeMap<(u8, u8), Vec<u64>> = BTreeMap::new();
        let mut tick = 0;

        for track_event in &track.events {
            tick += track_event.vtime;

            let data = match track_event.event {
                Event::Midi(ref message) => message.data.as_slice(),
                Event::Meta(_) => continue,
            };

            let status = match data.first() {
                Some(&status) => status,
                None => continue,
            };
            let channel = status & 0x0F;
            let program = programs[usize::from(channel)];

            match (status & 0xF0, data) {
                (PROGRAM_CHANGE, &[_, new_program, ..]) => {
                    programs[usize::from(channel)] = new_program;
                }

                (CONTROL_CHANGE, _) | (PITCH_BEND, _) => {
                    instrument_index(
                        &mut instruments,
                        &mut track_instruments,
                        &name,
                        track_index,
                        program,
                        channel,
                    );
                }

                (NOTE_ON, &[_, key, velocity, ..]) if velocity > 0 => {
                    open_notes.entry((channel, key)).or_default().push(tick);
                }

                (NOTE_ON, &[_, key, ..]) | (NOTE_OFF, &[_, key, ..]) => {
                    let starts = match open_notes.remove(&(channel, key)) {
                        Some(starts) => starts,
                        None => continue,
                    };

                    // Notes opened on this very tick stay open if anything older
                    // gets closed; otherwise everything closes, even at zero length.
                    let (same_tick, earlier): (Vec<u64>, Vec<u64>) =
                        starts.iter().copied().partition(|&start| start == tick);

                    let closing = if !earlier.is_empty() && !same_tick.is_empty() {
                        open_notes.insert((channel, key), same_tick);
                        earlier
                    } else {
                        starts
                    };

                    let index = instrument_index(
                        &mut instruments,
                        &mut track_instruments,
                        &name,
                        track_index,
                        program,
                        channel,
                    );
                    for start in closing {
                        instruments[index].notes.push(Note {
                            start: tempo_map.seconds(start),
                            end: tempo_map.seconds(tick),
                            pitch: i32::from(key),
                        });
                    }
                }

                _ => (),
            }
        }
    }

    for instrument in &mut instruments {
        instrument.notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    log::debug!("Found {} instruments in MIDI file", instruments.len());

    Ok(instruments)
}

fn instrument_index(
    instruments: &mut Vec<MidiInstrument>,
    track_instruments: &mut BTreeMap<(u8, u8), usize>,
    name: &str,
    track: usize,
    program: u8,
    channel: u8,
) -> usize {
    *track_instruments
        .entry((program, channel))
        .or_insert_with(|| {
            instruments.push(MidiInstrument {
                name: name.to_owned(),
                track,
                program,
                channel,
                notes: Vec::new(),
            });
            instruments.len() - 1
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoChange {
    tick: u64,
    seconds: f64,
    microseconds_per_beat: u32,
}

/// Converts absolute ticks to seconds using every tempo change in the file.
#[derive(Debug, Clone, PartialEq)]
struct TempoMap {
    ticks_per_beat: f64,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    fn new(smf: &SMF) -> Self {
        let mut settings = Vec::new();

        for track in &smf.tracks {
            let mut tick = 0;
            for track_event in &track.events {
                tick += track_event.vtime;

                if let Event::Meta(ref meta) = track_event.event {
                    if let (MetaCommand::TempoSetting, [a, b, c]) =
                        (&meta.command, meta.data.as_slice())
                    {
                        settings.push((tick, u32::from_be_bytes([0, *a, *b, *c])));
                    }
                }
            }
        }

        settings.sort_by_key(|&(tick, _)| tick);

        let mut tempo_map = TempoMap {
            ticks_per_beat: f64::from(smf.division),
            changes: vec![TempoChange {
                tick: 0,
                seconds: 0.0,
                microseconds_per_beat: DEFAULT_MICROSECONDS_PER_BEAT,
            }],
        };

        for (tick, microseconds_per_beat) in settings {
            let change = TempoChange {
                tick,
                seconds: tempo_map.seconds(tick),
                microseconds_per_beat,
            };

            match tempo_map.changes.last_mut() {
                Some(last) if last.tick == tick => *last = change,
                _ => tempo_map.changes.push(change),
            }
        }

        tempo_map
    }

    fn seconds(&self, tick: u64) -> f64 {
        let index = self.changes.partition_point(|change| change.tick <= tick);
        let change = &self.changes[index.saturating_sub(1)];

        let elapsed = (tick - change.tick) as f64 * f64::from(change.microseconds_per_beat);
        change.seconds + elapsed / (1_000_000.0 * self.ticks_per_beat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rimd::{MetaEvent, MidiMessage, SMFFormat, Track, TrackEvent};

    fn midi(vtime: u64, message: MidiMessage) -> TrackEvent {
        TrackEvent {
            vtime,
            event: Event::Midi(message),
        }
    }

    fn meta(vtime: u64, event: MetaEvent) -> TrackEvent {
        TrackEvent {
            vtime,
            event: Event::Meta(event),
        }
    }

    fn track(name: Option<&str>, events: Vec<TrackEvent>) -> Track {
        Track {
            copyright: None,
            name: name.map(str::to_owned),
            events,
        }
    }

    fn smf(tracks: Vec<Track>) -> SMF {
        SMF {
            format: SMFFormat::MultiTrack,
            division: 480,
            tracks,
        }
    }

    fn tempo_track(microseconds_per_beat: u32) -> Track {
        track(None, vec![meta(0, MetaEvent::tempo_setting(microseconds_per_beat))])
    }

    #[test]
    fn reads_notes_at_default_tempo() {
        let smf = smf(vec![track(
            Some("lead"),
            vec![
                midi(0, MidiMessage::note_on(45, 100, 0)),
                midi(480, MidiMessage::note_off(45, 0, 0)),
                midi(0, MidiMessage::note_on(47, 100, 0)),
                midi(240, MidiMessage::note_on(47, 0, 0)),
            ],
        )]);

        assert_eq!(
            melody(&smf).unwrap(),
            vec![Note::new(0.0, 0.5, 45), Note::new(0.5, 0.75, 47)]
        );
    }

    #[test]
    fn follows_tempo_changes() {
        let smf = smf(vec![
            track(
                None,
                vec![
                    meta(0, MetaEvent::tempo_setting(1_000_000)),
                    meta(480, MetaEvent::tempo_setting(250_000)),
                ],
            ),
            track(
                None,
                vec![
                    midi(0, MidiMessage::note_on(50, 90, 0)),
                    midi(960, MidiMessage::note_off(50, 0, 0)),
                ],
            ),
        ]);

        // One beat at 60 bpm then one beat at 240 bpm.
        assert_eq!(melody(&smf).unwrap(), vec![Note::new(0.0, 1.25, 50)]);
    }

    #[test]
    fn first_instrument_is_first_track_with_notes() {
        let smf = smf(vec![
            tempo_track(500_000),
            track(
                Some("melody"),
                vec![
                    midi(0, MidiMessage::note_on(60, 90, 1)),
                    midi(0, MidiMessage::note_on(48, 90, 2)),
                    midi(480, MidiMessage::note_off(60, 0, 1)),
                    midi(0, MidiMessage::note_off(48, 0, 2)),
                ],
            ),
            track(
                Some("bass"),
                vec![
                    midi(0, MidiMessage::note_on(36, 90, 3)),
                    midi(480, MidiMessage::note_off(36, 0, 3)),
                ],
            ),
        ]);

        let found = instruments(&smf).unwrap();

        assert_eq!(
            found
                .iter()
                .map(|instrument| (instrument.name.as_str(), instrument.track, instrument.channel))
                .collect::<Vec<_>>(),
            vec![("melody", 1, 1), ("melody", 1, 2), ("bass", 2, 3)]
        );
        assert_eq!(melody(&smf).unwrap(), vec![Note::new(0.0, 0.5, 60)]);
    }

    #[test]
    fn zero_length_notes_are_kept() {
        let smf = smf(vec![track(
            None,
            vec![
                midi(0, MidiMessage::note_on(30, 100, 0)),
                midi(0, MidiMessage::note_off(30, 0, 0)),
                midi(10, MidiMessage::note_on(45, 100, 0)),
                midi(480, MidiMessage::note_off(45, 0, 0)),
            ],
        )]);

        assert_eq!(
            melody(&smf).unwrap(),
            vec![
                Note::new(0.0, 0.0, 30),
                Note::new(10.0 / 960.0, 490.0 / 960.0, 45)
            ]
        );
    }

    #[test]
    fn same_tick_restart_stays_open() {
        let smf = smf(vec![track(
            None,
            vec![
                midi(0, MidiMessage::note_on(50, 100, 0)),
                midi(480, MidiMessage::note_on(50, 100, 0)),
                midi(0, MidiMessage::note_off(50, 0, 0)),
                midi(480, MidiMessage::note_off(50, 0, 0)),
            ],
        )]);

        assert_eq!(
            melody(&smf).unwrap(),
            vec![Note::new(0.0, 0.5, 50), Note::new(0.5, 1.0, 50)]
        );
    }

    #[test]
    fn program_changes_split_instruments() {
        let smf = smf(vec![track(
            Some("lead"),
            vec![
                midi(0, MidiMessage::note_on(45, 100, 0)),
                midi(480, MidiMessage::note_off(45, 0, 0)),
                midi(0, MidiMessage::program_change(24, 0)),
                midi(0, MidiMessage::note_on(47, 100, 0)),
                midi(480, MidiMessage::note_off(47, 0, 0)),
            ],
        )]);

        let found = instruments(&smf).unwrap();

        assert_eq!(
            found
                .iter()
                .map(|instrument| (instrument.program, instrument.channel, instrument.notes.clone()))
                .collect::<Vec<_>>(),
            vec![
                (0, 0, vec![Note::new(0.0, 0.5, 45)]),
                (24, 0, vec![Note::new(0.5, 1.0, 47)]),
            ]
        );
        assert_eq!(melody(&smf).unwrap(), vec![Note::new(0.0, 0.5, 45)]);
    }

    #[test]
    fn control_change_creates_instrument_first() {
        let smf = smf(vec![track(
            None,
            vec![
                midi(0, MidiMessage::note_on(60, 100, 1)),
                midi(0, MidiMessage::control_change(7, 100, 2)),
                midi(480, MidiMessage::note_off(60, 0, 1)),
            ],
        )]);

        let found = instruments(&smf).unwrap();

        assert_eq!(
            found
                .iter()
                .map(|instrument| (instrument.channel, instrument.notes.len()))
                .collect::<Vec<_>>(),
            vec![(2, 0), (1, 1)]
        );
        assert_eq!(melody(&smf).unwrap(), Vec::<Note>::new());
    }

    #[test]
    fn no_notes_means_no_instruments() {
        let smf = smf(vec![tempo_track(500_000)]);

        assert!(matches!(melody(&smf), Err(ReadError::NoInstruments)));
    }

    #[test]
    fn smpte_division_is_rejected() {
        let mut smf = smf(vec![]);
        smf.division = -7704;

        assert!(matches!(
            melody(&smf),
            Err(ReadError::UnsupportedDivision { division: -7704 })
        ));
    }

    #[test]
    fn records_cover_every_instrument() {
        let smf = smf(vec![track(
            Some("duet"),
            vec![
                midi(0, MidiMessage::note_on(62, 100, 0)),
                midi(100, MidiMessage::note_on(45, 100, 1)),
                midi(380, MidiMessage::note_off(62, 0, 0)),
                midi(0, MidiMessage::note_off(45, 0, 1)),
            ],
        )]);

        let records = note_records(&smf).unwrap();

        assert_eq!(
            records,
            vec![
                NoteRecord {
                    instrument: "duet".into(),
                    start: 0.0,
                    end: 0.5,
                    pitch: 62,
                    name: "D4".into(),
                },
                NoteRecord {
                    instrument: "duet".into(),
                    start: 0.1042,
                    end: 0.5,
                    pitch: 45,
                    name: "A2".into(),
                },
            ]
        );
    }
}
