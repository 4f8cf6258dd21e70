//! Stream-driven walk over the RIFF framing up to the PCM payload.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};
use nom::IResult;

use crate::error::{Error, Result};
use crate::format::{AudioStreamDescriptor, SampleFormat};
use crate::parser::{
    chunk_header, format_record, preamble_words, ChunkHeader, FormatRecord, FourCc, Preamble,
    CHUNK_HEADER, PREAMBLE_WORDS, WAVEFORMAT,
};
use crate::{codec_name, PCM_FORMAT_ID};

/// Parses a WAV header and leaves `src` on the first payload byte.
///
/// Only canonical PCM files are accepted: `fact` and `LIST` chunks may come
/// before `fmt `, anything may come between `fmt ` and `data`. On error the
/// position of `src` is unspecified.
pub fn read_header<R: Read + Seek>(src: &mut R) -> Result<AudioStreamDescriptor> {
    let preamble = read_preamble(src)?;
    if !preamble.is_valid() {
        return Err(Error::InvalidContainer {
            riff: preamble.riff,
            wave: preamble.wave,
        });
    }

    let fmt = find_format_chunk(src)?;
    let format = read_format_record(src, fmt.len)?;

    if format.encoding != PCM_FORMAT_ID {
        return Err(Error::UnsupportedEncoding {
            code: format.encoding,
            name: codec_name(format.encoding),
        });
    }

    let sample_format =
        SampleFormat::from_bits(format.bits_per_sample).ok_or(Error::UnsupportedSampleFormat {
            bits: format.bits_per_sample,
        })?;

    let invalid_channels = || Error::InvalidChannelCount {
        channels: format.channels,
    };
    let channels = u8::try_from(format.channels)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(invalid_channels)?;

    let data = find_data_chunk(src)?;
    let descriptor =
        AudioStreamDescriptor::new(format.sample_rate, channels, sample_format, data.len)
            .ok_or_else(invalid_channels)?;

    debug!(
        "wav: {} Hz, {} channel(s), {} bit, {} payload bytes (declared {})",
        descriptor.sample_rate(),
        descriptor.channels(),
        descriptor.bits_per_sample(),
        descriptor.payload_len(),
        data.len
    );

    Ok(descriptor)
}

fn read_preamble<R: Read>(src: &mut R) -> Result<Preamble> {
    let words: [u8; PREAMBLE_WORDS] = read_array(src, "RIFF header")?;
    let (first, second) = parsed(preamble_words(&words), "RIFF header")?;

    if let Some(preamble) = Preamble::recover(first, second) {
        warn!("wav: RIFF tag missing, reading header 4 bytes early");
        return Ok(preamble);
    }

    let third = u32::from_le_bytes(read_array(src, "WAVE tag")?);
    Ok(Preamble::canonical(first, second, third))
}

fn find_format_chunk<R: Read + Seek>(src: &mut R) -> Result<ChunkHeader> {
    loop {
        let chunk = read_chunk_header(src)?;
        if chunk.tag != FourCc::FACT && chunk.tag != FourCc::LIST {
            if chunk.tag != FourCc::FMT {
                return Err(Error::UnsupportedContainer { tag: chunk.tag });
            }
            return Ok(chunk);
        }
        skip_chunk(src, &chunk)?;
    }
}

fn read_format_record<R: Read>(src: &mut R, len: u32) -> Result<FormatRecord> {
    let mut payload = Vec::new();
    let read = src.by_ref().take(u64::from(len)).read_to_end(&mut payload)?;
    if read < len as usize {
        return Err(Error::eof("fmt chunk"));
    }
    if payload.len() < WAVEFORMAT {
        return Err(Error::eof("fmt record"));
    }
    parsed(format_record(&payload), "fmt record")
}

fn find_data_chunk<R: Read + Seek>(src: &mut R) -> Result<ChunkHeader> {
    loop {
        let chunk = read_chunk_header(src)?;
        if chunk.tag == FourCc::DATA {
            return Ok(chunk);
        }
        skip_chunk(src, &chunk)?;
    }
}

fn read_chunk_header<R: Read>(src: &mut R) -> Result<ChunkHeader> {
    let bytes: [u8; CHUNK_HEADER] = read_array(src, "chunk header")?;
    parsed(chunk_header(&bytes), "chunk header")
}

fn skip_chunk<R: Seek>(src: &mut R, chunk: &ChunkHeader) -> Result<()> {
    debug!("wav: skipping {:?} chunk ({} bytes)", chunk.tag, chunk.len);
    if chunk.len != 0 {
        src.seek(SeekFrom::Current(i64::from(chunk.len)))?;
    }
    Ok(())
}

fn read_array<const N: usize, R: Read>(src: &mut R, what: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    src.read_exact(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::eof(what),
        _ => Error::Io(e),
    })?;
    Ok(buf)
}

fn parsed<T>(result: IResult<&[u8], T>, what: &str) -> Result<T> {
    result.map(|(_, v)| v).map_err(|_| Error::eof(what))
}
