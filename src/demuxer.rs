use std::io::{Cursor, SeekFrom};

use log::debug;

use av_data::{packet::Packet, params::*, rational::Rational64, timeinfo::TimeInfo};
use av_format::{
    buffer::Buffered,
    common::GlobalInfo,
    demuxer::{Demuxer, Descr, Descriptor, Event},
    error::*,
    stream::Stream,
};

use crate::format::AudioStreamDescriptor;
use crate::header::read_header;
use crate::parser::riff_preamble;

/// Frames per emitted packet.
pub const PACKET_FRAMES: usize = 1024;

// Extra bytes asked for whenever the header walk runs off the buffer.
const HEADER_READAHEAD: usize = 1024;

#[derive(Debug, Clone, Default)]
pub struct WavDemuxer {
    pub descriptor: Option<AudioStreamDescriptor>,
    delivered: u32,
}

impl WavDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the header out of `input`, returning how many bytes it used.
    ///
    /// On a short buffer the returned error satisfies `is_eof()`, together
    /// with how far into `input` the parser tried to go.
    pub fn parse_headers(
        &mut self,
        input: &[u8],
    ) -> std::result::Result<usize, (crate::Error, u64)> {
        let mut cursor = Cursor::new(input);
        match read_header(&mut cursor) {
            Ok(descriptor) => {
                self.descriptor = Some(descriptor);
                self.delivered = 0;
                Ok(cursor.position() as usize)
            }
            Err(e) => Err((e, cursor.position())),
        }
    }
}

impl Demuxer for WavDemuxer {
    fn read_headers(&mut self, buf: &mut dyn Buffered, info: &mut GlobalInfo) -> Result<SeekFrom> {
        let data = buf.data();
        let header_len = match self.parse_headers(data) {
            Ok(len) => len,
            Err((e, reached)) if e.is_eof() => {
                let short = (reached as usize).saturating_sub(data.len());
                return Err(Error::MoreDataNeeded(data.len() + short + HEADER_READAHEAD));
            }
            Err((e, _)) => {
                debug!("wav: rejecting stream: {}", e);
                return Err(Error::InvalidData);
            }
        };

        let descriptor = match self.descriptor {
            Some(d) if d.sample_rate() > 0 => d,
            _ => return Err(Error::InvalidData),
        };

        let stream = Stream {
            id: 0,
            index: 0,
            start: None,
            duration: Some(u64::from(descriptor.frames())),
            timebase: Rational64::new(1, i64::from(descriptor.sample_rate())),
            params: CodecParams {
                extradata: None,
                bit_rate: usize::try_from(descriptor.bit_rate()).unwrap_or(usize::MAX),
                delay: 0,
                convergence_window: 0,
                codec_id: Some("pcm".to_owned()),
                kind: Some(MediaKind::Audio(descriptor.audio_info())),
            },
            user_private: None,
        };
        info.duration = Some(descriptor.duration_ms());
        info.add_stream(stream);

        Ok(SeekFrom::Current(header_len as i64))
    }

    fn read_event(&mut self, buf: &mut dyn Buffered) -> Result<(SeekFrom, Event)> {
        let descriptor = self.descriptor.ok_or(Error::InvalidData)?;
        let block = descriptor.block_size() as usize;

        let remaining = (descriptor.payload_len() - self.delivered) as usize;
        if remaining == 0 {
            return Ok((SeekFrom::Current(0), Event::Eof));
        }

        let want = remaining.min(PACKET_FRAMES * block);
        let data = buf.data().get(..want).ok_or(Error::MoreDataNeeded(want))?;

        let frames = want / block;
        let pts = (self.delivered as usize / block) as i64;
        let packet = Packet {
            data: data.to_vec(),
            t: TimeInfo {
                pts: Some(pts),
                dts: Some(pts),
                duration: Some(frames as u64),
                timebase: Some(Rational64::new(1, i64::from(descriptor.sample_rate()))),
                user_private: None,
            },
            pos: None,
            stream_index: 0,
            is_key: true,
            is_corrupted: false,
        };

        self.delivered += want as u32;
        Ok((SeekFrom::Current(want as i64), Event::NewPacket(packet)))
    }
}

struct Des {
    d: Descr,
}

impl Descriptor for Des {
    type OutputDemuxer = WavDemuxer;

    fn create(&self) -> Self::OutputDemuxer {
        WavDemuxer::new()
    }
    fn describe(&self) -> &Descr {
        &self.d
    }
    fn probe(&self, data: &[u8]) -> u8 {
        match riff_preamble(data) {
            Ok((_, preamble)) if preamble.is_valid() => preamble.byte_len() as u8,
            _ => 0,
        }
    }
}

pub const WAV_DESC: &dyn Descriptor<OutputDemuxer = WavDemuxer> = &Des {
    d: Descr {
        name: "wav",
        demuxer: "wav",
        description: "PCM WAV demuxer",
        extensions: &["wav"],
        mime: &["audio/x-wav", "audio/wav"],
    },
};
