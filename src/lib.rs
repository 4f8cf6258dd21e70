//! PCM WAV loading
//!
//! Parses the header of canonical (non-extensible) RIFF/WAVE files and hands
//! out the PCM payload either streamed from the source or preloaded in
//! memory. The same parser backs an `av-format` demuxer.
//!
//! To better understand the WAV format, read the
//! <a href="http://www-mmsp.ece.mcgill.ca/Documents/AudioFormats/WAVE/WAVE.html" target="_blank">WAV Specification</a>.

pub mod audio;
pub mod demuxer;
pub mod error;
pub mod format;
pub mod header;
pub mod parser;

#[cfg(test)]
pub(crate) mod test_util;

pub use audio::{LoadMode, ReaderConfig, WavAudioData, DEFAULT_BUFFER_SIZE};
pub use error::{Error, Result};
pub use format::{AudioStreamDescriptor, SampleFormat};
pub use header::read_header;
pub use parser::FourCc;

/// The only encoding we decode: integer PCM.
pub(crate) const PCM_FORMAT_ID: u16 = 0x0001;

static WAV_CODEC_REGISTER: &[(u16, &str)] = &[
    (0x0000, "unknown"),
    (PCM_FORMAT_ID, "pcm"),
    (0x0002, "ms-adpcm"),
    (0x0003, "pcm-float"),
    (0x0006, "a-law"),
    (0x0007, "mu-law"),
    (0x0011, "ima-adpcm-ms"),
    (0x0055, "mp3"),
    (0x0061, "adpcm-dk4"),
    (0x0062, "adpcm-dk3"),
    (0x0401, "imc"),
    (0x0402, "iac"),
    (0x0500, "on2avc-500"),
    (0x0501, "on2avc-501"),
    (0xfffe, "extensible"),
];

/// Name of a WAV encoding tag, for diagnostics.
pub(crate) fn codec_name(tcc: u16) -> &'static str {
    WAV_CODEC_REGISTER
        .iter()
        .find(|(twocc, _)| *twocc == tcc)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}
