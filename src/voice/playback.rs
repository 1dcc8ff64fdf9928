//! Audio playback to speakers
//!
//! [`AudioPlayback`] is the externally visible surface of the engine: hand it
//! encoded speech bytes, get back a [`SessionHandle`] to stop or wait on. One
//! session plays at a time; starting a new clip first cancels and drains the
//! previous one so two callbacks never drive the device concurrently.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::PlaybackConfig;
use crate::voice::container;
use crate::voice::normalize;
use crate::voice::session::{self, BlockSource, PlaybackOutcome};
use crate::{Error, Result};

/// Handle to a running (or finished) playback session
///
/// Cheap to clone; all clones refer to the same session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    source: Arc<BlockSource>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    fn new(source: Arc<BlockSource>, thread: JoinHandle<()>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                source,
                thread: Mutex::new(Some(thread)),
            }),
        }
    }

    /// Handle for a session that never opened a device (empty audio)
    fn completed(source: Arc<BlockSource>) -> Self {
        source.cancel();
        source.resolve();
        Self {
            inner: Arc::new(HandleInner {
                source,
                thread: Mutex::new(None),
            }),
        }
    }

    /// Request cancellation
    ///
    /// Idempotent: safe to call repeatedly or after natural completion, in
    /// which case nothing happens. Observed within one block duration.
    pub fn stop(&self) {
        self.inner.source.cancel();
    }

    /// Block until the session reaches a terminal state
    ///
    /// Joins the playback thread, so the device stream is closed before this
    /// returns. Callable more than once, including from concurrent clones:
    /// the join happens under the handle's lock, so every waiter blocks until
    /// the outcome is recorded and later calls return it immediately.
    #[must_use]
    pub fn wait(&self) -> PlaybackOutcome {
        let mut slot = match self.inner.thread.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(thread) = slot.take() {
            let _ = thread.join();
        }
        drop(slot);
        self.inner
            .source
            .outcome()
            .unwrap_or(PlaybackOutcome::Completed)
    }

    /// Whether the session is still streaming
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.source.is_active()
    }

    /// Frames delivered to the device so far
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.source.position()
    }
}

/// Plays synthesized speech clips to an output device
pub struct AudioPlayback {
    settings: PlaybackConfig,
    current: Mutex<Option<SessionHandle>>,
}

impl AudioPlayback {
    /// Create a playback controller with the given settings
    ///
    /// No device is opened until [`Self::start`]; device selection happens
    /// per session since the stream layout depends on the clip.
    #[must_use]
    pub const fn new(settings: PlaybackConfig) -> Self {
        Self {
            settings,
            current: Mutex::new(None),
        }
    }

    /// Decode, normalize, and start playing a WAV clip
    ///
    /// Returns once the output stream is open; playback continues in the
    /// background. An empty clip yields an already-completed handle without
    /// touching the device. If a previous session is still streaming it is
    /// stopped and drained first.
    ///
    /// # Errors
    ///
    /// Returns decode and normalization errors before any device resource is
    /// opened, and [`Error::DeviceOpen`] if the output stream cannot start.
    pub fn start(&self, wav_bytes: &[u8]) -> Result<SessionHandle> {
        let clip = container::decode(wav_bytes)?;
        let buffer = match normalize::normalize(clip) {
            Ok(buffer) => buffer,
            Err(Error::EmptyAudio) => {
                tracing::debug!("empty clip, completing without playback");
                let source = Arc::new(BlockSource::new(normalize::NormalizedBuffer::empty()));
                return Ok(SessionHandle::completed(source));
            }
            Err(e) => return Err(e),
        };

        // One session at a time: drain the previous one before opening a
        // second stream on the device.
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = current.take() {
            previous.stop();
            let _ = previous.wait();
        }

        let source = Arc::new(BlockSource::new(buffer));
        let thread = session::spawn(Arc::clone(&source), &self.settings)?;
        let handle = SessionHandle::new(source, thread);
        *current = Some(handle.clone());

        tracing::debug!(frames = handle.inner.source.frame_count(), "playback session started");
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::SessionHandle;
    use crate::voice::normalize::NormalizedBuffer;
    use crate::voice::session::{BlockSource, PlaybackOutcome};
    use crate::voice::{container, normalize, wav};

    fn buffer(frames: usize) -> NormalizedBuffer {
        let samples: Vec<f32> = (0..frames)
            .map(|i| if i % 2 == 0 { 0.25 } else { -0.25 })
            .collect();
        let bytes = wav::samples_to_wav(&samples, 1, 24_000).unwrap();
        normalize::normalize(container::decode(&bytes).unwrap()).unwrap()
    }

    /// Drive a source the way the session thread does, without a device
    fn spawn_paced_session(frames: usize) -> SessionHandle {
        let source = Arc::new(BlockSource::new(buffer(frames)));
        let worker = Arc::clone(&source);
        let thread = thread::spawn(move || {
            let mut out = vec![0.0_f32; 100];
            while worker.fill(&mut out, 1) {
                thread::sleep(Duration::from_millis(10));
            }
            worker.resolve();
        });
        SessionHandle::new(source, thread)
    }

    #[test]
    fn concurrent_waits_both_block_until_terminal() {
        let handle = spawn_paced_session(1_000);
        let clone = handle.clone();

        // Both waiters must observe a terminal session, no matter which one
        // ends up joining the playback thread.
        let waiter = thread::spawn(move || {
            let outcome = clone.wait();
            assert!(!clone.is_active());
            assert_eq!(clone.position(), 1_000);
            outcome
        });

        let first = handle.wait();
        assert!(!handle.is_active());
        assert_eq!(handle.position(), 1_000);

        let second = waiter.join().unwrap();
        assert_eq!(first, PlaybackOutcome::Completed);
        assert_eq!(second, PlaybackOutcome::Completed);
    }

    #[test]
    fn wait_after_stop_reports_cancellation_to_all_clones() {
        let handle = spawn_paced_session(10_000);
        let clone = handle.clone();

        handle.stop();
        let waiter = thread::spawn(move || clone.wait());

        assert_eq!(handle.wait(), PlaybackOutcome::Cancelled);
        assert_eq!(waiter.join().unwrap(), PlaybackOutcome::Cancelled);
        assert!(handle.position() < 10_000);
    }
}
