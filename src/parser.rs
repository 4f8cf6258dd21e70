use std::fmt;

use nom::{
    combinator::map,
    number::complete::{le_u16, le_u32},
    sequence::{pair, tuple},
    IResult,
};

/// Size of the two preamble words every file starts with.
pub(crate) const PREAMBLE_WORDS: usize = 8;
pub(crate) const CHUNK_HEADER: usize = 8;
/// Size of the `fmt ` fields we read; anything past it is ignored.
pub(crate) const WAVEFORMAT: usize = 16;

/// A RIFF four-character code, stored in file order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    pub const WAVE: FourCc = FourCc(*b"WAVE");
    pub const FMT: FourCc = FourCc(*b"fmt ");
    pub const FACT: FourCc = FourCc(*b"fact");
    pub const LIST: FourCc = FourCc(*b"LIST");
    pub const DATA: FourCc = FourCc(*b"data");

    /// Interprets a little-endian word as it was laid out on disk.
    pub fn from_word(word: u32) -> Self {
        FourCc(word.to_le_bytes())
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// The `RIFF <len> WAVE` framing at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    pub riff: FourCc,
    pub file_len: u32,
    pub wave: FourCc,
    /// Set when the file had no `RIFF` tag and every field sat 4 bytes early.
    pub riff_missing: bool,
}

impl Preamble {
    /// Recovers a preamble whose `RIFF` tag is absent.
    ///
    /// Such files carry the length first and `WAVE` second. A genuine file
    /// whose length field happens to spell `WAVE` is taken for one of these
    /// as well; there is no way to tell them apart from the first 8 bytes.
    /// Returns `None` when the WAVE tag still has to be read as a third word.
    pub(crate) fn recover(first: u32, second: u32) -> Option<Self> {
        if FourCc::from_word(second) == FourCc::WAVE {
            Some(Preamble {
                riff: FourCc::RIFF,
                file_len: first,
                wave: FourCc::WAVE,
                riff_missing: true,
            })
        } else {
            None
        }
    }

    pub(crate) fn canonical(first: u32, second: u32, third: u32) -> Self {
        Preamble {
            riff: FourCc::from_word(first),
            file_len: second,
            wave: FourCc::from_word(third),
            riff_missing: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.riff == FourCc::RIFF && self.wave == FourCc::WAVE
    }

    /// Bytes the preamble occupied in the file.
    pub fn byte_len(&self) -> usize {
        if self.riff_missing {
            PREAMBLE_WORDS
        } else {
            PREAMBLE_WORDS + 4
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: FourCc,
    pub len: u32,
}

/// The fixed part of a `fmt ` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatRecord {
    pub encoding: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

pub(crate) fn four_cc(input: &[u8]) -> IResult<&[u8], FourCc> {
    map(le_u32, FourCc::from_word)(input)
}

pub(crate) fn preamble_words(input: &[u8]) -> IResult<&[u8], (u32, u32)> {
    pair(le_u32, le_u32)(input)
}

pub(crate) fn riff_preamble(input: &[u8]) -> IResult<&[u8], Preamble> {
    let (i, (first, second)) = preamble_words(input)?;
    match Preamble::recover(first, second) {
        Some(preamble) => Ok((i, preamble)),
        None => map(le_u32, |third| Preamble::canonical(first, second, third))(i),
    }
}

pub(crate) fn chunk_header(input: &[u8]) -> IResult<&[u8], ChunkHeader> {
    map(pair(four_cc, le_u32), |(tag, len)| ChunkHeader { tag, len })(input)
}

pub(crate) fn format_record(input: &[u8]) -> IResult<&[u8], FormatRecord> {
    map(
        tuple((le_u16, le_u16, le_u32, le_u32, le_u16, le_u16)),
        |t| FormatRecord {
            encoding: t.0,
            channels: t.1,
            sample_rate: t.2,
            byte_rate: t.3,
            block_align: t.4,
            bits_per_sample: t.5,
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_preamble() {
        let (rest, p) = riff_preamble(b"RIFF\x24\x00\x00\x00WAVEfmt ").unwrap();
        assert_eq!(rest, b"fmt ");
        assert!(p.is_valid());
        assert!(!p.riff_missing);
        assert_eq!(p.file_len, 36);
        assert_eq!(p.byte_len(), 12);
    }

    #[test]
    fn preamble_without_riff_tag() {
        let (rest, p) = riff_preamble(b"\x24\x00\x00\x00WAVEfmt ").unwrap();
        assert_eq!(rest, b"fmt ");
        assert!(p.is_valid());
        assert!(p.riff_missing);
        assert_eq!(p.file_len, 36);
        assert_eq!(p.byte_len(), 8);
    }

    #[test]
    fn bad_preamble() {
        let (_, p) = riff_preamble(b"RIFX\x24\x00\x00\x00WAVE").unwrap();
        assert!(!p.is_valid());
        assert_eq!(p.riff, FourCc(*b"RIFX"));

        assert!(riff_preamble(b"RIFF\x24\x00").is_err());
    }

    #[test]
    fn fmt_record() {
        let bytes = [
            0x01, 0x00, 0x02, 0x00, 0x44, 0xac, 0x00, 0x00, 0x10, 0xb1, 0x02, 0x00, 0x04, 0x00,
            0x10, 0x00,
        ];
        let (rest, f) = format_record(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            f,
            FormatRecord {
                encoding: 1,
                channels: 2,
                sample_rate: 44100,
                byte_rate: 176400,
                block_align: 4,
                bits_per_sample: 16,
            }
        );
        assert!(format_record(&bytes[..14]).is_err());
    }

    #[test]
    fn chunk_tags() {
        let (_, h) = chunk_header(b"LIST\x1a\x00\x00\x00").unwrap();
        assert_eq!(h.tag, FourCc::LIST);
        assert_eq!(h.len, 26);
        assert_eq!(FourCc(*b"ab\x00c").to_string(), "ab\\x00c");
        assert_eq!(format!("{:?}", FourCc::FMT), "\"fmt \"");
    }
}
