use anyhow::Context;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use sweepcore::processing::CompletedSweep;
use sweepcore::publish::SweepSink;

/// Appends one JSON document per published sweep.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let file = File::create(path_ref)
            .with_context(|| format!("creating sweep output {}", path_ref.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_line(&mut self, sweep: &CompletedSweep) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, sweep)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SweepSink for JsonLinesSink<W> {
    fn update(&mut self, sweep: &CompletedSweep) {
        if let Err(err) = self.write_line(sweep) {
            warn!("writing sweep {}: {}", sweep.sequence, err);
        }
    }
}

/// Logs a one-line summary of every sweep.
pub struct SummarySink;

impl SweepSink for SummarySink {
    fn update(&mut self, sweep: &CompletedSweep) {
        match sweep.peak() {
            Some((frequency, power)) => info!(
                "sweep {}: {} bins, mean {:.1} dBm, peak {:.1} dBm at {:.3} MHz",
                sweep.sequence,
                sweep.len(),
                sweep.mean_power(),
                power,
                frequency / 1e6
            ),
            None => info!("sweep {}: no bins", sweep.sequence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(sequence: u64) -> CompletedSweep {
        CompletedSweep {
            sequence,
            frequencies: vec![2_500_000.0, 7_500_000.0],
            powers: vec![-71.5, -64.0],
        }
    }

    #[test]
    fn writes_one_line_per_sweep() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.update(&sweep(1));
        sink.update(&sweep(2));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: CompletedSweep = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, sweep(2));
    }

    #[test]
    fn create_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweeps.jsonl");
        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.update(&sweep(5));
        drop(sink);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\"sequence\":5"));
    }
}
