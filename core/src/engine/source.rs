use crate::engine::cancel::CancellationToken;
use crate::prelude::{SweepError, SweepResult};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

pub type CaptureStream = Box<dyn Read + Send>;

/// Whatever produces the binary sweep stream: normally the capture process.
pub trait CaptureSource: Send {
    /// Starts producing data for `argv` and returns the stream to read.
    fn launch(&mut self, argv: &[String], cancel: &CancellationToken) -> SweepResult<CaptureStream>;

    /// Releases whatever `launch` started. Called once the stream is no longer read.
    fn terminate(&mut self) -> SweepResult<()>;
}

/// Spawns the capture tool and reads its standard output.
#[derive(Default)]
pub struct HackrfProcess {
    child: Arc<Mutex<Option<Child>>>,
}

impl HackrfProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.child.lock().map(|c| c.is_some()).unwrap_or(false)
    }
}

impl CaptureSource for HackrfProcess {
    fn launch(&mut self, argv: &[String], cancel: &CancellationToken) -> SweepResult<CaptureStream> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| SweepError::Launch("empty command line".into()))?;

        let mut guard = self
            .child
            .lock()
            .map_err(|_| SweepError::Launch("process handle poisoned".into()))?;
        if guard.is_some() {
            return Err(SweepError::Launch("capture process already running".into()));
        }

        info!("starting backend: {}", argv.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| SweepError::Launch(format!("{}: {}", program, err)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SweepError::Launch("capture process has no stdout".into()))?;
        *guard = Some(child);
        drop(guard);

        let handle = self.child.clone();
        cancel.on_cancel(move || {
            if let Ok(mut guard) = handle.lock() {
                if let Some(child) = guard.as_mut() {
                    debug!("killing capture process {}", child.id());
                    let _ = child.kill();
                }
            }
        });

        Ok(Box::new(stdout))
    }

    fn terminate(&mut self) -> SweepResult<()> {
        let child = self
            .child
            .lock()
            .map_err(|_| SweepError::Launch("process handle poisoned".into()))?
            .take();
        let Some(mut child) = child else {
            return Ok(());
        };

        match child.kill() {
            Ok(()) => {}
            // Already exited on its own.
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => {}
            Err(err) => warn!("failed to kill capture process {}: {}", child.id(), err),
        }
        let status = child.wait()?;
        debug!("capture process exited with {}", status);
        Ok(())
    }
}

/// Replays an already captured stream, such as the output of `hackrf_sweep -B -r <file>`.
pub struct ReplaySource<R> {
    reader: Option<R>,
}

impl<R: Read + Send + 'static> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl ReplaySource<File> {
    pub fn open(path: impl AsRef<Path>) -> SweepResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| SweepError::Launch(format!("{}: {}", path.display(), err)))?;
        Ok(Self::new(file))
    }
}

impl<R: Read + Send + 'static> CaptureSource for ReplaySource<R> {
    fn launch(&mut self, argv: &[String], _cancel: &CancellationToken) -> SweepResult<CaptureStream> {
        debug!("replaying capture in place of: {}", argv.join(" "));
        let reader = self
            .reader
            .take()
            .ok_or_else(|| SweepError::Launch("replay stream already consumed".into()))?;
        Ok(Box::new(reader))
    }

    fn terminate(&mut self) -> SweepResult<()> {
        Ok(())
    }
}
