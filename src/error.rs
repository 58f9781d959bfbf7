use thiserror::Error;

use crate::fingering::error::FingeringError;
use crate::formatting::FormatError;
use crate::instrument::InstrumentError;
use crate::reading::error::ReadError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Fingering(#[from] FingeringError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
