use std::path::{Path, PathBuf};

use ansi_term::Style;
use color_eyre::eyre::Result;
use structopt::StructOpt;

use dombyra::colors::{CYAN, RED, WHITE};
use dombyra::instrument::InstrumentConfig;
use dombyra::{Instrument, OutputFormat};

#[derive(Debug, StructOpt)]
struct InstrumentOptions {
    #[structopt(
        short = "t",
        long = "tuning",
        help = "Open string pitches, lowest string first, as MIDI numbers or names.",
        default_value = "A2,D4"
    )]
    tuning: String,

    #[structopt(
        long = "frets",
        help = "Highest usable fret.",
        default_value = "19"
    )]
    frets: u32,
}

impl InstrumentOptions {
    fn config(&self) -> Result<InstrumentConfig> {
        Ok(InstrumentConfig {
            tuning: InstrumentConfig::parse_tuning(&self.tuning)?,
            max_fret: self.frets,
        })
    }
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Map melodies to dombyra fingering.")]
enum DombyraCommand {
    #[structopt(
        name = "map",
        about = "Finger a melody from a MIDI file (.mid) or a note list (.json)."
    )]
    Map {
        #[structopt(help = "Input .mid, .midi or .json file.", parse(from_os_str))]
        input: PathBuf,

        #[structopt(flatten)]
        instrument: InstrumentOptions,

        #[structopt(
            short = "f",
            long = "format",
            help = "Output format: csv, json or tab.",
            default_value = "csv"
        )]
        format: OutputFormat,

        #[structopt(
            short = "o",
            long = "output",
            help = "Output file, or stdout if not specified.",
            parse(from_os_str)
        )]
        output: Option<PathBuf>,
    },

    #[structopt(
        name = "notes",
        about = "Dump every note of a MIDI file as a JSON note list."
    )]
    Notes {
        #[structopt(help = "Input .mid file.", parse(from_os_str))]
        input: PathBuf,

        #[structopt(
            short = "o",
            long = "output",
            help = "Output file, or stdout if not specified.",
            parse(from_os_str)
        )]
        output: Option<PathBuf>,
    },

    #[structopt(name = "ref", about = "View useful information about the instrument.")]
    Ref {
        #[structopt(subcommand)]
        subcommand: RefCommand,
    },
}

#[derive(Debug, StructOpt)]
enum RefCommand {
    #[structopt(
        name = "fretboard",
        about = "View the pitch sounded by every fret of every string."
    )]
    Fretboard {
        #[structopt(flatten)]
        instrument: InstrumentOptions,
    },
}

fn main() {
    env_logger::init();

    let command = DombyraCommand::from_args();

    if let Err(err) = color_eyre::install().and_then(|()| run_command(command)) {
        eprintln!("{:?}", err);
        log(*RED, "error:", "Command failed.");
        std::process::exit(1)
    }
}

fn log(color: Style, prefix: &str, message: &str) {
    eprintln!("{} {}", color.paint(prefix), WHITE.paint(message));
}

fn run_command(command: DombyraCommand) -> Result<()> {
    match command {
        DombyraCommand::Map {
            input,
            instrument,
            format,
            output,
        } => {
            let config = instrument.config()?;

            if config != InstrumentConfig::default() {
                log(
                    *CYAN,
                    "Using",
                    &format!(
                        "a {}-string instrument with {} frets",
                        config.tuning.len(),
                        config.max_fret
                    ),
                );
            }

            log(*CYAN, "Fingering", &input.display().to_string());
            let rendered = dombyra::map_file(&input, config, format)?;
            write_text(&rendered, output.as_deref())
        }

        DombyraCommand::Notes { input, output } => {
            log(*CYAN, "Reading", &input.display().to_string());
            let json = dombyra::note_list_for_midi(&input)?;
            write_text(&json, output.as_deref())
        }

        DombyraCommand::Ref { subcommand } => {
            match subcommand {
                RefCommand::Fretboard { instrument } => {
                    let instrument = Instrument::new(instrument.config()?)?;
                    print!("{}", dombyra::formatting::fretboard_chart(&instrument)?);
                }
            }

            Ok(())
        }
    }
}

fn write_text(content: &str, output: Option<&Path>) -> Result<()> {
    use std::fs::File;
    use std::io::Write;

    if let Some(filename) = output {
        File::create(filename)?.write_all(content.as_bytes())?;
        log(*CYAN, "Saved", &filename.display().to_string());
    } else {
        std::io::stdout().write_all(content.as_bytes())?;
    }

    Ok(())
}
