//! Error types returned while loading and reading WAV files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::FourCc;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The RIFF or WAVE magic is wrong.
    #[error("not a RIFF/WAVE file (found {riff:?}/{wave:?})")]
    InvalidContainer { riff: FourCc, wave: FourCc },

    /// The first chunk after the skippable metadata is not `fmt `.
    #[error("unsupported WAV layout: expected a \"fmt \" chunk, found {tag:?}")]
    UnsupportedContainer { tag: FourCc },

    /// Anything but integer PCM; `name` comes from the encoding register.
    #[error("unsupported WAV encoding {code:#06x} ({name})")]
    UnsupportedEncoding { code: u16, name: &'static str },

    #[error("unsupported sample format: {bits} bits per sample")]
    UnsupportedSampleFormat { bits: u16 },

    #[error("invalid channel count {channels}")]
    InvalidChannelCount { channels: u16 },

    #[error("seek by {offset} from {position} leaves the payload (0..={len})")]
    SeekOutOfRange { offset: i64, position: u64, len: u32 },

    #[error("{} could not be loaded as a WAV audio file", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// True when the failure came from the stream ending early.
    pub fn is_eof(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Error::Load { source, .. } => source.is_eof(),
            _ => false,
        }
    }

    pub(crate) fn eof(what: &str) -> Self {
        Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, what.to_owned()))
    }
}
