use crate::prelude::{SweepError, SweepResult};

/// Two little-endian u64 band edges.
pub const HEADER_LEN: usize = 16;
pub const SAMPLE_LEN: usize = 4;

/// One decoded record: a sub-band `[low_edge_hz, high_edge_hz)` and its power bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub low_edge_hz: u64,
    pub high_edge_hz: u64,
    /// dBm, in ascending frequency order within the sub-band.
    pub samples: Vec<f32>,
}

impl Segment {
    pub fn new(low_edge_hz: u64, high_edge_hz: u64, samples: Vec<f32>) -> Self {
        Self {
            low_edge_hz,
            high_edge_hz,
            samples,
        }
    }

    pub fn decode(payload: &[u8]) -> SweepResult<Self> {
        if payload.len() < HEADER_LEN {
            return Err(SweepError::MalformedFrame(format!(
                "payload of {} bytes is shorter than the {} byte header",
                payload.len(),
                HEADER_LEN
            )));
        }
        let (header, body) = payload.split_at(HEADER_LEN);
        if body.len() % SAMPLE_LEN != 0 {
            return Err(SweepError::MalformedFrame(format!(
                "{} sample bytes are not a whole number of f32 samples",
                body.len()
            )));
        }

        let low_edge_hz = read_u64_le(&header[..8]);
        let high_edge_hz = read_u64_le(&header[8..]);
        if high_edge_hz < low_edge_hz {
            return Err(SweepError::MalformedFrame(format!(
                "high edge {} Hz below low edge {} Hz",
                high_edge_hz, low_edge_hz
            )));
        }

        let samples = body
            .chunks_exact(SAMPLE_LEN)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            low_edge_hz,
            high_edge_hz,
            samples,
        })
    }

    /// Serializes the segment as a frame payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.payload_len());
        payload.extend_from_slice(&self.low_edge_hz.to_le_bytes());
        payload.extend_from_slice(&self.high_edge_hz.to_le_bytes());
        for sample in &self.samples {
            payload.extend_from_slice(&sample.to_le_bytes());
        }
        payload
    }

    pub fn payload_len(&self) -> usize {
        HEADER_LEN + self.samples.len() * SAMPLE_LEN
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Width of one bin in Hz, `None` for a segment without samples.
    pub fn step_hz(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some((self.high_edge_hz - self.low_edge_hz) as f64 / self.samples.len() as f64)
    }
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(low: u64, high: u64, samples: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&low.to_le_bytes());
        bytes.extend_from_slice(&high.to_le_bytes());
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_edges_and_samples() {
        let bytes = payload(2_400_000_000, 2_405_000_000, &[-70.5, -68.25, -90.0]);
        let segment = Segment::decode(&bytes).unwrap();
        assert_eq!(segment.low_edge_hz, 2_400_000_000);
        assert_eq!(segment.high_edge_hz, 2_405_000_000);
        assert_eq!(segment.samples, vec![-70.5, -68.25, -90.0]);
        assert_eq!(segment.sample_count(), (bytes.len() - HEADER_LEN) / SAMPLE_LEN);
    }

    #[test]
    fn rejects_short_payload() {
        let err = Segment::decode(&[0u8; 15]).unwrap_err();
        assert!(matches!(err, SweepError::MalformedFrame(_)));
    }

    #[test]
    fn rejects_unaligned_samples() {
        let mut bytes = payload(0, 20_000_000, &[-50.0]);
        bytes.push(0);
        assert!(matches!(
            Segment::decode(&bytes),
            Err(SweepError::MalformedFrame(_))
        ));
    }

    #[test]
    fn rejects_inverted_edges() {
        let bytes = payload(20_000_000, 0, &[-50.0]);
        assert!(matches!(
            Segment::decode(&bytes),
            Err(SweepError::MalformedFrame(_))
        ));
    }

    #[test]
    fn header_only_payload_has_no_samples() {
        let segment = Segment::decode(&payload(0, 5_000_000, &[])).unwrap();
        assert_eq!(segment.sample_count(), 0);
        assert_eq!(segment.step_hz(), None);
    }

    #[test]
    fn step_divides_band_evenly() {
        let segment = Segment::new(0, 20_000_000, vec![0.0; 4]);
        assert_eq!(segment.step_hz(), Some(5_000_000.0));
        assert_eq!(Segment::decode(&segment.encode()).unwrap(), segment);
    }
}
