use serde::Serialize;
use sweepcore::engine::EngineState;
use sweepcore::processing::CompletedSweep;
use sweepcore::telemetry::MetricsSnapshot;

/// What the HTTP bridge serves to a display client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepModel {
    pub sweep: Option<CompletedSweep>,
    pub status: Option<EngineState>,
    pub metrics: MetricsSnapshot,
}
