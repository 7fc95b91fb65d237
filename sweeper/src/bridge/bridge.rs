use crate::bridge::model::SweepModel;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use sweepcore::engine::EngineState;
use sweepcore::processing::CompletedSweep;
use sweepcore::publish::SweepSink;
use sweepcore::telemetry::MetricsSnapshot;
use tokio::runtime::Builder;
use warp::Filter;

pub fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Holds the latest sweep and session status for display clients.
#[derive(Clone, Default)]
pub struct SweepBridge {
    state: Arc<RwLock<SweepModel>>,
}

impl SweepBridge {
    /// Creates a bridge without an HTTP endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bridge and serves it on `addr` from a background thread.
    pub fn serve(addr: SocketAddr) -> Self {
        let bridge = Self::new();
        let state_for_filter = bridge.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let sweep_route = warp::path("sweep")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<SweepModel>>| {
                let model = read_model(&state);
                warp::reply::json(&json!({ "sweep": model.sweep }))
            });

        let status_route = warp::path("status")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<SweepModel>>| {
                let model = read_model(&state);
                warp::reply::json(&json!({
                    "status": model.status,
                    "metrics": model.metrics,
                    "points": model.sweep.as_ref().map(CompletedSweep::len).unwrap_or(0),
                }))
            });

        thread::spawn(move || {
            let routes = sweep_route.or(status_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("bridge runtime: {}", err);
                    return;
                }
            };
            info!("serving sweeps on http://{}", addr);
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        });

        bridge
    }

    pub fn publish(&self, sweep: &CompletedSweep) {
        if let Ok(mut guard) = self.state.write() {
            guard.sweep = Some(sweep.clone());
        }
    }

    pub fn publish_status(&self, status: &EngineState, metrics: MetricsSnapshot) {
        if let Ok(mut guard) = self.state.write() {
            guard.status = Some(status.clone());
            guard.metrics = metrics;
        }
    }

    pub fn snapshot(&self) -> SweepModel {
        read_model(&self.state)
    }
}

impl SweepSink for SweepBridge {
    fn update(&mut self, sweep: &CompletedSweep) {
        self.publish(sweep);
    }
}

fn read_model(state: &RwLock<SweepModel>) -> SweepModel {
    state
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}
