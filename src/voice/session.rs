//! Playback session: block-fill state machine and device stream lifecycle
//!
//! A session has two actors. The device callback pulls fixed-size blocks of
//! f32 frames through [`BlockSource::fill`]; it never blocks, never allocates,
//! and always leaves the output block fully written. A supervising thread owns
//! the `cpal::Stream` (it is not `Send` on every platform), polls the active
//! flag with bounded sleeps, and drops the stream once the source leaves the
//! streaming state.
//!
//! Single-writer discipline: the cursor is advanced only by the callback; the
//! active flag is cleared by the callback on natural completion and by
//! external cancellation.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};

use crate::config::PlaybackConfig;
use crate::voice::normalize::NormalizedBuffer;
use crate::{Error, Result};

/// Terminal state of a playback session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every frame was delivered to the device
    Completed,
    /// Playback was stopped before the last frame
    Cancelled,
    /// The device layer reported an error mid-stream
    Failed(String),
}

/// Terminal outcome codes, compare-and-swapped from `PENDING` exactly once
const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;
const FAILED: u8 = 3;

/// Shared playback state: normalized buffer, cursor, and active flag
///
/// The buffer is read-only after creation. The terminal outcome is an atomic
/// code recorded first-wins, so the data callback stays lock-free; only the
/// failure message (written by the device error callback, never the data
/// callback) lives behind a lock.
#[derive(Debug)]
pub struct BlockSource {
    buffer: NormalizedBuffer,
    cursor: AtomicUsize,
    active: AtomicBool,
    outcome: AtomicU8,
    failure: Mutex<Option<String>>,
}

impl BlockSource {
    /// Create a source in the streaming state over a normalized buffer
    #[must_use]
    pub fn new(buffer: NormalizedBuffer) -> Self {
        Self {
            buffer,
            cursor: AtomicUsize::new(0),
            active: AtomicBool::new(true),
            outcome: AtomicU8::new(PENDING),
            failure: Mutex::new(None),
        }
    }

    /// Whether the session is still streaming
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Frames delivered to the device so far
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Total frames in the buffer
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.buffer.frame_count()
    }

    /// Request cancellation; observed at the next block boundary
    ///
    /// Idempotent, and a no-op after natural completion.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Terminal outcome, if the session has reached one
    #[must_use]
    pub fn outcome(&self) -> Option<PlaybackOutcome> {
        match self.outcome.load(Ordering::Acquire) {
            COMPLETED => Some(PlaybackOutcome::Completed),
            CANCELLED => Some(PlaybackOutcome::Cancelled),
            FAILED => {
                let message = match self.failure.lock() {
                    Ok(slot) => slot.clone().unwrap_or_default(),
                    Err(_) => String::new(),
                };
                Some(PlaybackOutcome::Failed(message))
            }
            _ => None,
        }
    }

    /// Fill one output block with interleaved f32 frames
    ///
    /// Always writes every sample of `out` (zero for any unused tail) so the
    /// device never sees stale data. Returns `false` once the session has
    /// reached a terminal state and no further blocks carry audio.
    pub fn fill(&self, out: &mut [f32], out_channels: usize) -> bool {
        if out_channels == 0 {
            return false;
        }

        if !self.is_active() {
            out.fill(0.0);
            self.record(CANCELLED);
            return false;
        }

        let cursor = self.cursor.load(Ordering::Relaxed);
        let frame_count = self.buffer.frame_count();

        if cursor >= frame_count {
            out.fill(0.0);
            self.finish(COMPLETED);
            return false;
        }

        let block_frames = out.len() / out_channels;
        let copied = block_frames.min(frame_count - cursor);
        let src_channels = usize::from(self.buffer.channels());

        if src_channels == out_channels {
            let start = cursor * src_channels;
            let len = copied * src_channels;
            out[..len].copy_from_slice(&self.buffer.samples()[start..start + len]);
        } else {
            // Channel layout mismatch: fan the frame's channels across the
            // device layout, repeating the last source channel as needed.
            for (i, frame) in out.chunks_exact_mut(out_channels).take(copied).enumerate() {
                let src = self.buffer.frame(cursor + i);
                for (c, sample) in frame.iter_mut().enumerate() {
                    *sample = src[c.min(src_channels - 1)];
                }
            }
        }

        // Silence-pad the tail so a short final block carries no garbage
        out[copied * out_channels..].fill(0.0);

        self.cursor.store(cursor + copied, Ordering::Release);

        if cursor + copied >= frame_count {
            self.finish(COMPLETED);
            return false;
        }
        true
    }

    /// Record a device-layer failure and leave the streaming state
    ///
    /// Called from the device error callback, never from the data callback.
    /// The message is stored before the failure code is published, so a
    /// reader that observes `FAILED` sees the message.
    pub(crate) fn fail(&self, message: String) {
        if let Ok(mut slot) = self.failure.lock() {
            if slot.is_none() {
                *slot = Some(message);
            }
        }
        self.record(FAILED);
        self.active.store(false, Ordering::Release);
    }

    /// Resolve the terminal outcome after the stream has closed
    ///
    /// Covers cancellation observed by the supervisor before the callback ran
    /// again (the callback may never fire after a stop request).
    pub(crate) fn resolve(&self) {
        if self.position() >= self.frame_count() {
            self.record(COMPLETED);
        } else {
            self.record(CANCELLED);
        }
    }

    /// Record the terminal outcome and leave the streaming state
    fn finish(&self, code: u8) {
        self.record(code);
        self.active.store(false, Ordering::Release);
    }

    /// First terminal outcome wins; later records are ignored
    fn record(&self, code: u8) {
        let _ = self
            .outcome
            .compare_exchange(PENDING, code, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// Open the device stream on a dedicated thread and supervise it
///
/// Returns once the stream is open and playing; the thread keeps running
/// until the source leaves the streaming state, then drops the stream.
pub(crate) fn spawn(
    source: Arc<BlockSource>,
    settings: &PlaybackConfig,
) -> Result<thread::JoinHandle<()>> {
    let settings = settings.clone();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

    let thread_source = Arc::clone(&source);
    let handle = thread::Builder::new()
        .name("voicepipe-playback".to_string())
        .spawn(move || run_stream(&thread_source, &settings, &ready_tx))
        .map_err(|e| Error::DeviceOpen(format!("failed to spawn playback thread: {e}")))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(Error::DeviceOpen(
                "playback thread exited before opening the stream".to_string(),
            ))
        }
    }
}

/// Playback thread body: open, play, poll until inactive, drop the stream
fn run_stream(source: &Arc<BlockSource>, settings: &PlaybackConfig, ready: &mpsc::Sender<Result<()>>) {
    let stream = match open_stream(source, settings) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(Error::DeviceOpen(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(()));

    let interval = Duration::from_millis(settings.poll_interval_ms.max(1));
    while source.is_active() {
        thread::sleep(interval);
    }

    drop(stream);
    source.resolve();
    tracing::debug!(
        frames = source.position(),
        outcome = ?source.outcome(),
        "playback stream closed"
    );
}

/// Select the output device and open a stream at the buffer's layout
fn open_stream(source: &Arc<BlockSource>, settings: &PlaybackConfig) -> Result<cpal::Stream> {
    let host = cpal::default_host();

    let device = match &settings.device {
        Some(name) => host
            .output_devices()
            .map_err(|e| Error::DeviceOpen(e.to_string()))?
            .find(|d| d.name().is_ok_and(|n| &n == name))
            .ok_or_else(|| Error::DeviceOpen(format!("output device not found: {name}")))?,
        None => host
            .default_output_device()
            .ok_or_else(|| Error::DeviceOpen("no output device available".to_string()))?,
    };

    let sample_rate = settings
        .sample_rate_override
        .unwrap_or_else(|| source.buffer.sample_rate());
    let want_channels = source.buffer.channels();

    let supported = device
        .supported_output_configs()
        .map_err(|e| Error::DeviceOpen(e.to_string()))?
        .find(|c| {
            c.channels() == want_channels
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .or_else(|| {
            // Fallback: stereo devices playing mono TTS
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
        })
        .ok_or_else(|| Error::DeviceOpen("no suitable output config found".to_string()))?;

    let out_channels = supported.channels();
    let block_frames = block_frames(sample_rate, settings.block_ms);
    let config = StreamConfig {
        channels: out_channels,
        sample_rate: SampleRate(sample_rate),
        buffer_size: BufferSize::Fixed(block_frames),
    };

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels = out_channels,
        block_frames,
        "opening playback stream"
    );

    let cb_source = Arc::clone(source);
    let err_source = Arc::clone(source);
    let stride = usize::from(out_channels);

    device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                cb_source.fill(data, stride);
            },
            move |err| {
                tracing::error!(error = %err, "audio playback error");
                err_source.fail(err.to_string());
            },
            None,
        )
        .map_err(|e| Error::DeviceOpen(e.to_string()))
}

/// Frames per callback block for a given rate and block duration
#[allow(clippy::cast_possible_truncation)]
fn block_frames(sample_rate: u32, block_ms: u64) -> u32 {
    let frames = u64::from(sample_rate) * block_ms / 1000;
    frames.max(1) as u32
}
