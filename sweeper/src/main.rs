use anyhow::Context;
use bridge::{bridge::bridge_bind_address, SweepBridge};
use clap::Parser;
use generator::GeneratorConfig;
use log::{info, warn};
use std::path::PathBuf;
use sweepcore::publish::FanoutSink;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::{JsonLinesSink, Overrides, Runner, SessionConfig, SourceKind, SummarySink};

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Run hackrf_sweep sessions and publish reassembled sweeps")]
struct Args {
    /// Load the session (request and launch settings) from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sweep start in MHz
    #[arg(long)]
    start: Option<u64>,
    /// Sweep stop in MHz
    #[arg(long)]
    stop: Option<u64>,
    /// Bin width in kHz
    #[arg(long)]
    bin_size: Option<u32>,
    /// Minimum seconds between published sweeps
    #[arg(long)]
    interval: Option<f64>,
    /// Total gain in dB, negative for automatic
    #[arg(long, allow_hyphen_values = true)]
    gain: Option<i32>,
    /// LNB local-oscillator offset in Hz
    #[arg(long, allow_hyphen_values = true)]
    lnb_lo: Option<i64>,
    #[arg(long, default_value_t = false)]
    single_shot: bool,
    /// Capture tool to run instead of `hackrf_sweep` from PATH
    #[arg(long)]
    executable: Option<String>,
    /// Extra argument passed to the capture tool (repeatable)
    #[arg(long = "extra-arg", allow_hyphen_values = true)]
    extra_args: Vec<String>,
    /// Replay a capture recorded with `hackrf_sweep -B -r <file>`
    #[arg(long, conflicts_with = "synthetic")]
    replay: Option<PathBuf>,
    /// Feed this many generated sweeps instead of running the capture tool
    #[arg(long)]
    synthetic: Option<usize>,
    /// Seed for the synthetic generator
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write every published sweep as a JSON line
    #[arg(long)]
    output: Option<PathBuf>,
    /// Serve the latest sweep over HTTP
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Print the capture command line and exit
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            start_freq: self.start,
            stop_freq: self.stop,
            bin_size: self.bin_size,
            interval: self.interval,
            gain_db: self.gain,
            lnb_lo: self.lnb_lo,
            single_shot: self.single_shot,
            executable: self.executable.clone(),
            extra_args: self.extra_args.clone(),
        }
    }

    fn source(&self) -> SourceKind {
        if let Some(path) = &self.replay {
            SourceKind::Replay(path.clone())
        } else if let Some(sweeps) = self.synthetic {
            SourceKind::Synthetic(GeneratorConfig {
                sweeps,
                seed: self.seed,
                ..Default::default()
            })
        } else {
            SourceKind::Process
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = if let Some(path) = &args.config {
        SessionConfig::load(path)?
    } else {
        SessionConfig::default()
    };
    session.apply(&args.overrides());

    let runner = Runner::new(session);
    if args.dry_run {
        println!("{}", runner.command_line()?.join(" "));
        return Ok(());
    }

    let bridge = if args.serve {
        SweepBridge::serve(bridge_bind_address())
    } else {
        SweepBridge::new()
    };

    let mut sink = FanoutSink::new().with(SummarySink).with(bridge.clone());
    if let Some(path) = &args.output {
        sink.push(Box::new(JsonLinesSink::create(path)?));
    }

    let handle = runner.start(&args.source(), Box::new(sink))?;

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    runtime.block_on(async {
        let mut states = handle.subscribe();
        loop {
            let status = states.borrow_and_update().clone();
            bridge.publish_status(&status, handle.metrics());
            if status.is_stopped() {
                break;
            }
            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                result = signal::ctrl_c() => {
                    result.context("awaiting Ctrl+C")?;
                    info!("stop requested");
                    handle.stop();
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    })?;

    handle.stop();
    let states = handle.subscribe();
    let outcome = handle.join();
    let metrics = match &outcome {
        Ok(snapshot) => *snapshot,
        Err(_) => bridge.snapshot().metrics,
    };
    bridge.publish_status(&states.borrow().clone(), metrics);
    let summary = outcome.context("sweep session failed")?;
    info!(
        "session finished: {} frames, {} sweeps published, {} throttled",
        summary.frames, summary.sweeps_published, summary.sweeps_throttled
    );

    if args.serve {
        warn!("session ended; bridge keeps serving the last sweep until Ctrl+C");
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
