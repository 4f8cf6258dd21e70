//! Access to the PCM payload of a WAV file.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::format::AudioStreamDescriptor;
use crate::header::read_header;

/// Read-ahead used when streaming from the source.
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Read the payload from the source as it is consumed.
    #[default]
    Stream,
    /// Copy the whole payload into memory at load time.
    Preload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub mode: LoadMode,
    /// Read-ahead for [`LoadMode::Stream`]; ignored when preloading.
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            mode: LoadMode::Stream,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ReaderConfig {
    pub fn stream() -> Self {
        Self::default()
    }

    pub fn preload() -> Self {
        ReaderConfig {
            mode: LoadMode::Preload,
            ..Self::default()
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

enum Payload<R> {
    /// `start` is the source offset of the first payload byte.
    Stream { reader: BufReader<R>, start: u64 },
    Preload(Cursor<Vec<u8>>),
}

impl<R: Read + Seek> Payload<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Payload::Stream { reader, .. } => reader.read(buf),
            Payload::Preload(c) => c.read(buf),
        }
    }

    /// Moves from payload offset `pos` by `offset`.
    ///
    /// A failed stream seek may already have dropped the read buffer, so the
    /// source is put back on `pos` before the error is returned.
    fn seek_relative(&mut self, pos: u64, offset: i64) -> io::Result<()> {
        match self {
            Payload::Stream { reader, start } => {
                reader.seek_relative(offset).map_err(|e| {
                    if let Err(resync) = reader.seek(SeekFrom::Start(*start + pos)) {
                        warn!("wav: lost payload position after failed seek: {}", resync);
                    }
                    e
                })
            }
            Payload::Preload(c) => c.seek(SeekFrom::Current(offset)).map(|_| ()),
        }
    }
}

/// A WAV file opened for playback.
///
/// The header is parsed on construction; afterwards reads and seeks move a
/// cursor inside the payload, which starts at 0 and never passes
/// [`AudioStreamDescriptor::payload_len`].
pub struct WavAudioData<R> {
    descriptor: AudioStreamDescriptor,
    payload: Payload<R>,
    pos: u64,
}

impl WavAudioData<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ReaderConfig::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, config: &ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        debug!("wav: loading {} ({:?})", path.display(), config.mode);
        File::open(path)
            .map_err(Error::from)
            .and_then(|file| Self::from_reader(file, config))
            .map_err(|e| Error::Load {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
    }
}

impl<R: Read + Seek> WavAudioData<R> {
    /// Parses the header from the current position of `src`.
    pub fn from_reader(mut src: R, config: &ReaderConfig) -> Result<Self> {
        let descriptor = read_header(&mut src)?;

        let payload = match config.mode {
            LoadMode::Stream => Payload::Stream {
                start: src.stream_position()?,
                reader: BufReader::with_capacity(config.buffer_size.max(1), src),
            },
            LoadMode::Preload => {
                let len = u64::from(descriptor.payload_len());
                let mut data = Vec::new();
                src.take(len).read_to_end(&mut data)?;
                if (data.len() as u64) < len {
                    return Err(Error::eof("data chunk"));
                }
                Payload::Preload(Cursor::new(data))
            }
        };

        Ok(WavAudioData {
            descriptor,
            payload,
            pos: 0,
        })
    }

    pub fn descriptor(&self) -> AudioStreamDescriptor {
        self.descriptor
    }

    /// Offset of the cursor from the first payload byte.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        u64::from(self.descriptor.payload_len()) - self.pos
    }

    /// Fills `buf` with the next payload bytes.
    ///
    /// Returns how many bytes were copied; fewer than `buf.len()` at the end
    /// of the payload (or of a truncated source), 0 once exhausted. A source
    /// error after some bytes were copied ends the read early; it is returned
    /// by the next call if it persists.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = usize::try_from(self.remaining())
            .unwrap_or(usize::MAX)
            .min(buf.len());

        let mut filled = 0;
        while filled < want {
            match self.payload.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if filled == 0 => return Err(e.into()),
                Err(e) => {
                    debug!("wav: short read at {}: {}", self.pos + filled as u64, e);
                    break;
                }
            }
        }

        self.pos += filled as u64;
        trace!("wav: read {} of {} bytes, at {}", filled, buf.len(), self.pos);
        Ok(filled)
    }

    /// Moves the cursor by `offset` bytes and returns the new position.
    pub fn seek(&mut self, offset: i64) -> Result<u64> {
        let len = self.descriptor.payload_len();
        let target = i64::try_from(self.pos)
            .ok()
            .and_then(|pos| pos.checked_add(offset))
            .filter(|t| (0..=i64::from(len)).contains(t))
            .ok_or(Error::SeekOutOfRange {
                offset,
                position: self.pos,
                len,
            })?;

        self.payload.seek_relative(self.pos, offset)?;
        self.pos = target as u64;
        trace!("wav: seek by {} to {}", offset, self.pos);
        Ok(self.pos)
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(-(self.pos as i64)).map(|_| ())
    }
}

impl<R: Read + Seek> Read for WavAudioData<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_payload(buf).map_err(|e| match e {
            Error::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        })
    }
}
