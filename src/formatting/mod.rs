use std::fmt::Write;
use std::str::FromStr;

use thiserror::Error;

use crate::fingering::data::Position;
use crate::instrument::Instrument;
use crate::notes;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unknown output format `{name}`. Expected one of: csv, json, tab.")]
    UnknownFormat { name: String },

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Tab,
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "tab" => Ok(OutputFormat::Tab),
            _ => Err(FormatError::UnknownFormat {
                name: name.to_owned(),
            }),
        }
    }
}

/// Rounds a time in seconds to 4 decimal places for display.
pub fn round_time(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}

/// A position as a `(start, end, string, fret)` row with display rounding.
pub fn position_row(position: &Position) -> (f64, f64, usize, u32) {
    (
        round_time(position.start),
        round_time(position.end),
        position.string,
        position.fret,
    )
}

pub fn render(
    format: OutputFormat,
    instrument: &Instrument,
    positions: &[Position],
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Csv => positions_to_csv(positions),
        OutputFormat::Json => positions_to_json(positions),
        OutputFormat::Tab => positions_to_tab(instrument, positions),
    }
}

pub fn positions_to_csv(positions: &[Position]) -> Result<String, FormatError> {
    let mut buffer = String::new();

    writeln!(buffer, "start,end,string,fret")?;
    for position in positions {
        let (start, end, string, fret) = position_row(position);
        // Debug keeps the trailing `.0` on whole seconds.
        writeln!(buffer, "{:?},{:?},{},{}", start, end, string, fret)?;
    }

    Ok(buffer)
}

pub fn positions_to_json(positions: &[Position]) -> Result<String, FormatError> {
    let rows = positions.iter().map(position_row).collect::<Vec<_>>();
    let mut json = serde_json::to_string_pretty(&rows)?;
    json.push('\n');

    Ok(json)
}

/// Plain-text tablature: one line per string, highest string on top, one
/// column per note.
pub fn positions_to_tab(
    instrument: &Instrument,
    positions: &[Position],
) -> Result<String, FormatError> {
    let labels = instrument
        .tuning()
        .iter()
        .map(|&open| notes::pitch_name(open))
        .collect::<Vec<String>>();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut buffer = String::new();

    for (string, label) in labels.iter().enumerate().rev() {
        let columns = positions
            .iter()
            .map(|position| {
                let fret = position.fret.to_string();
                if position.string == string {
                    fret
                } else {
                    "-".repeat(fret.len())
                }
            })
            .collect::<Vec<String>>();

        writeln!(
            buffer,
            "{: <width$} |-{}-|",
            label,
            columns.join("-"),
            width = label_width
        )?;
    }

    Ok(buffer)
}

/// A reference chart of which pitch every fret of every string sounds, closed by
/// the playable range.
pub fn fretboard_chart(instrument: &Instrument) -> Result<String, FormatError> {
    const COLUMN: usize = 6;

    let mut buffer = String::new();

    write!(buffer, "{: <width$}", "fret", width = COLUMN)?;
    for (string, &open) in instrument.tuning().iter().enumerate() {
        let header = format!("{}:{}", string, notes::pitch_name(open));
        write!(buffer, "{: <width$}", header, width = COLUMN)?;
    }
    writeln!(buffer)?;

    for fret in 0..=instrument.max_fret() {
        write!(buffer, "{: <width$}", fret, width = COLUMN)?;
        for &open in instrument.tuning() {
            let name = notes::pitch_name(open + fret as i32);
            write!(buffer, "{: <width$}", name, width = COLUMN)?;
        }
        writeln!(buffer)?;
    }

    writeln!(
        buffer,
        "range {} to {}",
        notes::pitch_name(instrument.lowest_pitch()),
        notes::pitch_name(instrument.highest_pitch())
    )?;

    Ok(buffer)
}
