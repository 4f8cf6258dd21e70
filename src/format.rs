//! The audio description handed to playback code.

use std::sync::Arc;

use av_data::{
    audiosample::{ChannelMap, Soniton},
    params::AudioInfo,
};

/// PCM sample layouts a WAV file may carry.
///
/// 8-bit WAV samples are unsigned, wider ones are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    S16,
    S32,
}

impl SampleFormat {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(SampleFormat::U8),
            16 => Some(SampleFormat::S16),
            32 => Some(SampleFormat::S32),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            SampleFormat::U8 => 8,
            SampleFormat::S16 => 16,
            SampleFormat::S32 => 32,
        }
    }

    pub fn bytes(self) -> u8 {
        self.bits() / 8
    }

    /// Little-endian, interleaved, integer.
    pub fn soniton(self) -> Soniton {
        Soniton::new(self.bits(), false, false, false, false, self != SampleFormat::U8)
    }
}

/// What a parsed WAV header says about its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStreamDescriptor {
    sample_rate: u32,
    channels: u8,
    sample_format: SampleFormat,
    payload_len: u32,
}

impl AudioStreamDescriptor {
    /// Builds a descriptor, trimming `data_len` to whole blocks.
    ///
    /// Returns `None` for zero channels.
    pub fn new(
        sample_rate: u32,
        channels: u8,
        sample_format: SampleFormat,
        data_len: u32,
    ) -> Option<Self> {
        if channels == 0 {
            return None;
        }
        let block = u32::from(sample_format.bytes()) * u32::from(channels);
        Some(AudioStreamDescriptor {
            sample_rate,
            channels,
            sample_format,
            payload_len: data_len - data_len % block,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn bits_per_sample(&self) -> u8 {
        self.sample_format.bits()
    }

    /// Payload length in bytes, always a multiple of [`block_size`](Self::block_size).
    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// Bytes taken by one sample of every channel.
    pub fn block_size(&self) -> u32 {
        u32::from(self.sample_format.bytes()) * u32::from(self.channels)
    }

    pub fn frames(&self) -> u32 {
        self.payload_len / self.block_size()
    }

    pub fn bit_rate(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.block_size()) * 8
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        u64::from(self.frames()) * 1000 / u64::from(self.sample_rate)
    }

    /// Parameters for opening a playback device or a rust-av stream.
    pub fn audio_info(&self) -> AudioInfo {
        AudioInfo {
            rate: self.sample_rate as usize,
            map: Some(ChannelMap::default_map(self.channels as usize)),
            format: Some(Arc::new(self.sample_format.soniton())),
        }
    }
}
