use crate::prelude::{SweepError, SweepResult};
use crate::protocol::segment::Segment;
use log::{debug, warn};
use std::io::{self, BufReader, ErrorKind, Read};

pub const LENGTH_PREFIX_LEN: usize = 4;
/// Far above anything the capture tool writes; a larger prefix means a corrupt stream.
pub const MAX_FRAME_LEN: usize = 1 << 20;
/// Consecutive channel-absent reads tolerated before the stream is declared lost.
pub const MAX_TRANSIENT_READS: usize = 16;

/// Outcome of one attempt to pull a frame off the stream.
#[derive(Debug, PartialEq)]
pub enum FrameRead {
    Frame(Vec<u8>),
    /// The channel was unavailable for this attempt; the frame is abandoned.
    Transient,
    End,
}

/// Reads `[u32 little-endian length][payload]` records from a byte stream.
pub struct FrameReader<R: Read> {
    inner: BufReader<R>,
    transient_reads: usize,
    finished: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            transient_reads: 0,
            finished: false,
        }
    }

    /// Blocks until a whole frame, the end of the stream, or a failure.
    pub fn read_frame(&mut self) -> SweepResult<FrameRead> {
        if self.finished {
            return Ok(FrameRead::End);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        match self.fill(&mut prefix)? {
            Fill::Done => {}
            Fill::Short => return Ok(self.finish()),
            Fill::Transient => return self.transient(),
        }

        let record_length = u32::from_le_bytes(prefix) as usize;
        if record_length == 0 {
            return Ok(self.finish());
        }
        if record_length > MAX_FRAME_LEN {
            return Err(SweepError::MalformedFrame(format!(
                "record length {} exceeds {} bytes",
                record_length, MAX_FRAME_LEN
            )));
        }

        let mut payload = vec![0u8; record_length];
        match self.fill(&mut payload)? {
            Fill::Done => {
                self.transient_reads = 0;
                Ok(FrameRead::Frame(payload))
            }
            Fill::Short => Ok(self.finish()),
            Fill::Transient => self.transient(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn fill(&mut self, buf: &mut [u8]) -> SweepResult<Fill> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(Fill::Done),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(Fill::Short),
            Err(err) if is_channel_absent(&err) => {
                warn!("capture channel unavailable: {}", err);
                Ok(Fill::Transient)
            }
            Err(err) => Err(SweepError::Stream(err)),
        }
    }

    fn transient(&mut self) -> SweepResult<FrameRead> {
        self.transient_reads += 1;
        if self.transient_reads > MAX_TRANSIENT_READS {
            return Err(SweepError::Stream(io::Error::new(
                ErrorKind::NotConnected,
                format!("channel unavailable for {} reads", self.transient_reads),
            )));
        }
        Ok(FrameRead::Transient)
    }

    fn finish(&mut self) -> FrameRead {
        debug!("capture stream ended");
        self.finished = true;
        FrameRead::End
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = SweepResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_frame() {
                Ok(FrameRead::Frame(payload)) => return Some(Ok(payload)),
                Ok(FrameRead::Transient) => continue,
                Ok(FrameRead::End) => return None,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

enum Fill {
    Done,
    Short,
    Transient,
}

/// Reads against a torn-down channel, as happens while the capture process exits.
fn is_channel_absent(err: &io::Error) -> bool {
    err.kind() == ErrorKind::NotConnected
}

/// Wraps a segment payload in its length prefix.
pub fn encode_frame(segment: &Segment) -> Vec<u8> {
    let payload = segment.encode();
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    frame
}
