//! Hand-off of completed sweeps to whatever displays or stores them.

use crate::processing::assembler::CompletedSweep;
use log::{debug, warn};
use tokio::sync::{mpsc, watch};

/// Downstream consumer of completed sweeps.
pub trait SweepSink: Send {
    fn update(&mut self, sweep: &CompletedSweep);
}

impl<F> SweepSink for F
where
    F: FnMut(&CompletedSweep) + Send,
{
    fn update(&mut self, sweep: &CompletedSweep) {
        self(sweep)
    }
}

/// Passes completed sweeps to a sink, in completion order.
pub struct Publisher {
    sink: Box<dyn SweepSink>,
    published: u64,
}

impl Publisher {
    pub fn new(sink: Box<dyn SweepSink>) -> Self {
        Self { sink, published: 0 }
    }

    pub fn publish(&mut self, sweep: &CompletedSweep) {
        debug!(
            "publishing sweep {} with {} points",
            sweep.sequence,
            sweep.len()
        );
        self.sink.update(sweep);
        self.published += 1;
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

/// Forwards every sweep over an unbounded tokio channel.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<CompletedSweep>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CompletedSweep>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SweepSink for ChannelSink {
    fn update(&mut self, sweep: &CompletedSweep) {
        if self.sender.send(sweep.clone()).is_err() {
            warn!("sweep receiver dropped, discarding sweep {}", sweep.sequence);
        }
    }
}

/// Keeps only the most recent sweep observable.
pub struct LatestSink {
    sender: watch::Sender<Option<CompletedSweep>>,
}

impl LatestSink {
    pub fn new() -> (Self, watch::Receiver<Option<CompletedSweep>>) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, receiver)
    }
}

impl SweepSink for LatestSink {
    fn update(&mut self, sweep: &CompletedSweep) {
        self.sender.send_replace(Some(sweep.clone()));
    }
}

/// Delivers each sweep to several sinks, in the order they were added.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn SweepSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl SweepSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn SweepSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SweepSink for FanoutSink {
    fn update(&mut self, sweep: &CompletedSweep) {
        for sink in &mut self.sinks {
            sink.update(sweep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sweep(sequence: u64) -> CompletedSweep {
        CompletedSweep {
            sequence,
            frequencies: vec![1.0, 2.0],
            powers: vec![-50.0, -60.0],
        }
    }

    #[test]
    fn publisher_forwards_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_sink = seen.clone();
        let mut publisher = Publisher::new(Box::new(move |s: &CompletedSweep| {
            seen_by_sink.lock().unwrap().push(s.sequence);
        }));
        publisher.publish(&sweep(1));
        publisher.publish(&sweep(2));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(publisher.published(), 2);
    }

    #[test]
    fn channel_sink_delivers_clones() {
        let (mut sink, mut receiver) = ChannelSink::new();
        sink.update(&sweep(7));
        assert_eq!(receiver.try_recv().unwrap(), sweep(7));
        drop(receiver);
        sink.update(&sweep(8));
    }

    #[test]
    fn latest_sink_keeps_most_recent() {
        let (mut sink, receiver) = LatestSink::new();
        assert!(receiver.borrow().is_none());
        sink.update(&sweep(1));
        sink.update(&sweep(2));
        assert_eq!(receiver.borrow().as_ref().map(|s| s.sequence), Some(2));
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let (first, mut first_rx) = ChannelSink::new();
        let (second, second_rx) = LatestSink::new();
        let mut fanout = FanoutSink::new().with(first).with(second);
        assert_eq!(fanout.len(), 2);
        fanout.update(&sweep(3));
        assert_eq!(first_rx.try_recv().unwrap().sequence, 3);
        assert_eq!(second_rx.borrow().as_ref().unwrap().sequence, 3);
    }

    #[test]
    fn completed_sweep_serializes_parallel_sequences() {
        let json = serde_json::to_value(sweep(4)).unwrap();
        assert_eq!(json["sequence"], 4);
        assert_eq!(json["frequencies"].as_array().unwrap().len(), 2);
        assert_eq!(json["powers"][1], -60.0);
    }
}
