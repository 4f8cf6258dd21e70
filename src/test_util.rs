//! In-memory WAV images for tests.

use std::cell::Cell;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic payload bytes.
pub(crate) fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub(crate) struct WavBuilder {
    encoding: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    fmt_extra: Vec<u8>,
    before_fmt: Vec<([u8; 4], Vec<u8>)>,
    before_data: Vec<([u8; 4], Vec<u8>)>,
    data: Vec<u8>,
    riff_tag: bool,
}

impl WavBuilder {
    pub(crate) fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        WavBuilder {
            encoding: 1,
            channels,
            sample_rate,
            bits_per_sample,
            fmt_extra: Vec::new(),
            before_fmt: Vec::new(),
            before_data: Vec::new(),
            data: Vec::new(),
            riff_tag: true,
        }
    }

    pub(crate) fn encoding(mut self, code: u16) -> Self {
        self.encoding = code;
        self
    }

    pub(crate) fn fmt_extra(mut self, extra: Vec<u8>) -> Self {
        self.fmt_extra = extra;
        self
    }

    pub(crate) fn before_fmt(mut self, tag: [u8; 4], payload: Vec<u8>) -> Self {
        self.before_fmt.push((tag, payload));
        self
    }

    pub(crate) fn before_data(mut self, tag: [u8; 4], payload: Vec<u8>) -> Self {
        self.before_data.push((tag, payload));
        self
    }

    pub(crate) fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Drops the leading `RIFF`, shifting everything 4 bytes early.
    pub(crate) fn without_riff_tag(mut self) -> Self {
        self.riff_tag = false;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let block_align = self.channels * (self.bits_per_sample / 8);
        let byte_rate = self.sample_rate * u32::from(block_align);

        let mut fmt = Vec::new();
        fmt.write_all(&self.encoding.to_le_bytes()).unwrap();
        fmt.write_all(&self.channels.to_le_bytes()).unwrap();
        fmt.write_all(&self.sample_rate.to_le_bytes()).unwrap();
        fmt.write_all(&byte_rate.to_le_bytes()).unwrap();
        fmt.write_all(&block_align.to_le_bytes()).unwrap();
        fmt.write_all(&self.bits_per_sample.to_le_bytes()).unwrap();
        fmt.extend_from_slice(&self.fmt_extra);

        let mut body = b"WAVE".to_vec();
        for (tag, payload) in &self.before_fmt {
            put_chunk(&mut body, tag, payload);
        }
        put_chunk(&mut body, b"fmt ", &fmt);
        for (tag, payload) in &self.before_data {
            put_chunk(&mut body, tag, payload);
        }
        put_chunk(&mut body, b"data", &self.data);

        let mut buf = Vec::new();
        if self.riff_tag {
            buf.extend_from_slice(b"RIFF");
        }
        buf.write_all(&(body.len() as u32).to_le_bytes()).unwrap();
        buf.extend_from_slice(&body);
        buf
    }
}

fn put_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
}

/// A source that hands out at most `chunk` bytes per read and can be told to
/// fail one read at a given offset or the next seeks.
pub(crate) struct FlakySource {
    inner: Cursor<Vec<u8>>,
    chunk: usize,
    fail_read_at: Option<u64>,
    failing_seeks: Rc<Cell<usize>>,
}

impl FlakySource {
    pub(crate) fn new(bytes: Vec<u8>, chunk: usize) -> Self {
        FlakySource {
            inner: Cursor::new(bytes),
            chunk,
            fail_read_at: None,
            failing_seeks: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn fail_read_at(mut self, offset: u64) -> Self {
        self.fail_read_at = Some(offset);
        self
    }

    /// Count of upcoming seeks that will fail; shared with the source.
    pub(crate) fn failing_seeks(&self) -> Rc<Cell<usize>> {
        self.failing_seeks.clone()
    }
}

impl Read for FlakySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_read_at == Some(self.inner.position()) {
            self.fail_read_at = None;
            return Err(io::Error::new(io::ErrorKind::Other, "transient read failure"));
        }
        let n = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..n])
    }
}

impl Seek for FlakySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let failing = self.failing_seeks.get();
        if failing > 0 {
            self.failing_seeks.set(failing - 1);
            return Err(io::Error::new(io::ErrorKind::Other, "transient seek failure"));
        }
        self.inner.seek(pos)
    }
}
