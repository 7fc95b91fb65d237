use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Closer = Box<dyn FnOnce() + Send>;

/// Stop request shared between the sweep worker and its controller.
///
/// The flag is only looked at between frames, so a blocked read is released by
/// the closers registered here (typically killing the capture process, which
/// closes its output pipe).
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    closers: Mutex<Vec<Closer>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let closers = match self.inner.closers.lock() {
            Ok(mut closers) => std::mem::take(&mut *closers),
            Err(_) => return,
        };
        for close in closers {
            close();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Runs `close` on cancellation, or right away if already cancelled.
    pub fn on_cancel(&self, close: impl FnOnce() + Send + 'static) {
        if let Ok(mut closers) = self.inner.closers.lock() {
            if !self.is_cancelled() {
                closers.push(Box::new(close));
                return;
            }
        }
        close();
    }
}
