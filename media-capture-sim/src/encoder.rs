//! Simulated chunked encoder.
//!
//! Each started encoder runs an emission loop on its own thread, producing a
//! fragment whenever a timeslice elapses. Fragment size is proportional to
//! the time covered. Every emitted fragment is recorded in a ledger shared by
//! all encoders of one factory, so tests can compare a session's output
//! against what the engine actually produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use media_capture_core::models::error::CaptureError;
use media_capture_core::models::media_models::EncoderStatus;
use media_capture_core::traits::capture_host::StreamHandle;
use media_capture_core::traits::encoder::{
    ChunkedEncoder, EncoderFactory, EncoderOptions, FragmentCallback, StopCallback,
};

/// Granularity of the emission loop.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Behavior of the simulated engine.
#[derive(Debug, Clone)]
pub struct SimEncoderConfig {
    /// Whether the engine exists at all.
    pub available: bool,
    pub supported_formats: Vec<String>,
    /// Output rate; a fragment covering N ms is `bytes_per_second * N / 1000` bytes.
    pub bytes_per_second: u64,
    pub fail_create: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    /// Keep emitting after a stop request and never report completion.
    pub stall_stop: bool,
}

impl Default for SimEncoderConfig {
    fn default() -> Self {
        Self {
            available: true,
            supported_formats: vec![
                "video/webm;codecs=vp9,opus".into(),
                "video/webm;codecs=vp8,opus".into(),
                "video/webm".into(),
            ],
            bytes_per_second: 40_000,
            fail_create: false,
            fail_start: false,
            fail_stop: false,
            stall_stop: false,
        }
    }
}

impl SimEncoderConfig {
    /// An environment without an encoding engine.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            supported_formats: Vec::new(),
            ..Self::default()
        }
    }
}

/// One fragment as produced by an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmittedFragment {
    pub encoder_id: u64,
    pub size: usize,
}

struct FactoryInner {
    config: Mutex<SimEncoderConfig>,
    ledger: Mutex<Vec<EmittedFragment>>,
    created: Mutex<u64>,
}

/// In-process `EncoderFactory`.
///
/// Cheap to clone; clones share the configuration and the ledger.
#[derive(Clone)]
pub struct SimulatedEncoderFactory {
    inner: Arc<FactoryInner>,
}

impl SimulatedEncoderFactory {
    pub fn new(config: SimEncoderConfig) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                config: Mutex::new(config),
                ledger: Mutex::new(Vec::new()),
                created: Mutex::new(0),
            }),
        }
    }

    /// Make subsequent `request_stop` calls fail.
    pub fn set_fail_stop(&self, fail: bool) {
        self.inner.config.lock().fail_stop = fail;
    }

    /// Make subsequent `create` calls fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.inner.config.lock().fail_create = fail;
    }

    /// Make subsequent `start` calls fail.
    pub fn set_fail_start(&self, fail: bool) {
        self.inner.config.lock().fail_start = fail;
    }

    /// While set, stop requests are ignored until cleared again.
    pub fn set_stall_stop(&self, stall: bool) {
        self.inner.config.lock().stall_stop = stall;
    }

    /// Number of encoders created so far.
    pub fn encoders_created(&self) -> u64 {
        *self.inner.created.lock()
    }

    /// All fragments emitted so far, in emission order.
    pub fn emitted(&self) -> Vec<EmittedFragment> {
        self.inner.ledger.lock().clone()
    }

    /// Sum of every fragment's size.
    pub fn emitted_bytes(&self) -> u64 {
        self.inner.ledger.lock().iter().map(|f| f.size as u64).sum()
    }

    /// Fragments emitted by a single encoder.
    pub fn emitted_by(&self, encoder_id: u64) -> Vec<EmittedFragment> {
        self.inner
            .ledger
            .lock()
            .iter()
            .filter(|f| f.encoder_id == encoder_id)
            .copied()
            .collect()
    }
}

impl Default for SimulatedEncoderFactory {
    fn default() -> Self {
        Self::new(SimEncoderConfig::default())
    }
}

impl EncoderFactory for SimulatedEncoderFactory {
    fn is_available(&self) -> bool {
        self.inner.config.lock().available
    }

    fn supports_format(&self, mime_type: &str) -> bool {
        self.inner
            .config
            .lock()
            .supported_formats
            .iter()
            .any(|f| f == mime_type)
    }

    fn create(
        &self,
        stream: StreamHandle,
        options: &EncoderOptions,
    ) -> Result<Box<dyn ChunkedEncoder>, CaptureError> {
        let config = self.inner.config.lock().clone();
        if !config.available {
            return Err(CaptureError::UnsupportedEnvironment);
        }
        if config.fail_create {
            return Err(CaptureError::EncoderFailed("simulated create failure".into()));
        }
        if options.mime_type.is_empty() || !config.supported_formats.contains(&options.mime_type) {
            return Err(CaptureError::EncoderFailed(format!(
                "unsupported mime type {:?}",
                options.mime_type
            )));
        }
        let tracks = stream.tracks();
        if tracks.is_empty() || tracks.iter().any(|t| !t.is_live()) {
            return Err(CaptureError::EncoderFailed(format!(
                "stream {} has ended tracks",
                stream.id()
            )));
        }

        let id = {
            let mut created = self.inner.created.lock();
            *created += 1;
            *created
        };
        log::debug!(
            "Created simulated encoder {} ({}) for stream {}",
            id,
            options.mime_type,
            stream.id()
        );

        Ok(Box::new(SimulatedEncoder {
            id,
            stream,
            factory: Arc::clone(&self.inner),
            status: Arc::new(Mutex::new(EncoderStatus::Inactive)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            abandoned: Arc::new(AtomicBool::new(false)),
            handle: None,
        }))
    }
}

/// Encoder bound to one stream, created by `SimulatedEncoderFactory`.
pub struct SimulatedEncoder {
    id: u64,
    stream: StreamHandle,
    factory: Arc<FactoryInner>,
    status: Arc<Mutex<EncoderStatus>>,
    stop_requested: Arc<AtomicBool>,
    /// Set on drop; ends the loop even while stalled.
    abandoned: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ChunkedEncoder for SimulatedEncoder {
    fn start(
        &mut self,
        timeslice: Duration,
        on_data: FragmentCallback,
        on_stop: StopCallback,
    ) -> Result<(), CaptureError> {
        if self.factory.config.lock().fail_start {
            return Err(CaptureError::EncoderFailed("simulated start failure".into()));
        }
        if self.handle.is_some() {
            return Err(CaptureError::EncoderFailed(format!(
                "encoder {} already started",
                self.id
            )));
        }

        *self.status.lock() = EncoderStatus::Recording;

        let emitter = Emitter {
            id: self.id,
            factory: Arc::clone(&self.factory),
            on_data,
        };
        let status = Arc::clone(&self.status);
        let stop_requested = Arc::clone(&self.stop_requested);
        let abandoned = Arc::clone(&self.abandoned);

        let handle = thread::Builder::new()
            .name(format!("sim-encoder-{}", self.id))
            .spawn(move || {
                emission_loop(&emitter, timeslice, &stop_requested, &abandoned);
                *status.lock() = EncoderStatus::Inactive;
                log::debug!("Simulated encoder {} finalized", emitter.id);
                if !abandoned.load(Ordering::SeqCst) {
                    on_stop();
                }
            })
            .map_err(|e| {
                *self.status.lock() = EncoderStatus::Inactive;
                CaptureError::EncoderFailed(format!("failed to spawn encoder thread: {}", e))
            })?;

        self.handle = Some(handle);
        log::debug!("Simulated encoder {} recording stream {}", self.id, self.stream.id());
        Ok(())
    }

    fn request_stop(&mut self) -> Result<(), CaptureError> {
        if self.factory.config.lock().fail_stop {
            return Err(CaptureError::FinalizeFailed("simulated stop failure".into()));
        }
        if self.handle.is_none() {
            return Err(CaptureError::FinalizeFailed(format!(
                "encoder {} was never started",
                self.id
            )));
        }
        self.stop_requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn status(&self) -> EncoderStatus {
        *self.status.lock()
    }
}

impl Drop for SimulatedEncoder {
    fn drop(&mut self) {
        self.abandoned.store(true, Ordering::SeqCst);
        self.stop_requested.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Simulated encoder {} thread panicked", self.id);
            }
        }
    }
}

struct Emitter {
    id: u64,
    factory: Arc<FactoryInner>,
    on_data: FragmentCallback,
}

impl Emitter {
    fn stalled(&self) -> bool {
        self.factory.config.lock().stall_stop
    }

    /// Emit a fragment covering `covered`. Recorded in the ledger before delivery.
    fn emit(&self, covered: Duration) {
        let bytes_per_second = self.factory.config.lock().bytes_per_second;
        let size = (bytes_per_second as u128 * covered.as_millis() / 1000) as usize;
        let data = vec![(self.id & 0xff) as u8; size];

        self.factory.ledger.lock().push(EmittedFragment {
            encoder_id: self.id,
            size,
        });
        (self.on_data)(&data);
    }
}

/// Emit a fragment every `timeslice` until stop is requested, then flush the
/// remainder as a final, possibly empty, fragment.
fn emission_loop(emitter: &Emitter, timeslice: Duration, stop_requested: &AtomicBool, abandoned: &AtomicBool) {
    let mut pending_since = Instant::now();
    let mut next_flush = pending_since + timeslice;

    loop {
        if abandoned.load(Ordering::SeqCst) {
            break;
        }
        if stop_requested.load(Ordering::SeqCst) && !emitter.stalled() {
            break;
        }
        let now = Instant::now();
        if now >= next_flush {
            emitter.emit(now - pending_since);
            pending_since = now;
            next_flush += timeslice;
            continue;
        }
        thread::sleep(POLL_INTERVAL.min(next_flush - now));
    }

    emitter.emit(pending_since.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use media_capture_core::models::media_models::MediaConstraints;
    use media_capture_core::processing::completion::Completion;
    use media_capture_core::traits::capture_host::CaptureHost;

    fn options(mime: &str) -> EncoderOptions {
        EncoderOptions {
            mime_type: mime.into(),
            audio_bits_per_second: 128_000,
            video_bits_per_second: 2_500_000,
        }
    }

    fn stream() -> StreamHandle {
        SimulatedHost::default()
            .acquire(&MediaConstraints::audio_video())
            .unwrap()
    }

    #[test]
    fn rejects_unsupported_and_empty_formats() {
        let factory = SimulatedEncoderFactory::default();
        assert!(matches!(
            factory.create(stream(), &options("")).err(),
            Some(CaptureError::EncoderFailed(_))
        ));
        assert!(matches!(
            factory.create(stream(), &options("video/mp4")).err(),
            Some(CaptureError::EncoderFailed(_))
        ));
        assert_eq!(factory.encoders_created(), 0);
    }

    #[test]
    fn rejects_stream_with_ended_tracks() {
        let factory = SimulatedEncoderFactory::default();
        let stream = stream();
        stream.stop_tracks();

        assert!(factory.create(stream, &options("video/webm")).is_err());
    }

    #[test]
    fn emits_per_timeslice_and_flushes_on_stop() {
        let factory = SimulatedEncoderFactory::default();
        let mut encoder = factory.create(stream(), &options("video/webm")).unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let stopped = Completion::new();
        let done = stopped.clone();

        encoder
            .start(
                Duration::from_millis(50),
                Arc::new(move |data: &[u8]| sink.lock().push(data.len())),
                Arc::new(move || {
                    done.complete(());
                }),
            )
            .unwrap();
        assert_eq!(encoder.status(), EncoderStatus::Recording);

        thread::sleep(Duration::from_millis(180));
        encoder.request_stop().unwrap();
        assert!(stopped.wait(Duration::from_secs(2)).is_some());
        assert_eq!(encoder.status(), EncoderStatus::Inactive);

        let received = received.lock();
        assert!(received.len() >= 3);
        assert_eq!(
            received.iter().map(|&s| s as u64).sum::<u64>(),
            factory.emitted_bytes()
        );
        assert_eq!(factory.emitted_by(1).len(), received.len());
    }

    #[test]
    fn stop_failure_and_unstarted_stop() {
        let factory = SimulatedEncoderFactory::default();
        let mut encoder = factory.create(stream(), &options("video/webm")).unwrap();

        assert!(matches!(
            encoder.request_stop(),
            Err(CaptureError::FinalizeFailed(_))
        ));

        factory.set_fail_stop(true);
        encoder
            .start(Duration::from_millis(20), Arc::new(|_: &[u8]| {}), Arc::new(|| {}))
            .unwrap();
        assert!(matches!(
            encoder.request_stop(),
            Err(CaptureError::FinalizeFailed(_))
        ));
        assert_eq!(encoder.status(), EncoderStatus::Recording);

        factory.set_fail_stop(false);
        assert!(encoder.request_stop().is_ok());
    }

    #[test]
    fn start_failure_spawns_nothing() {
        let factory = SimulatedEncoderFactory::default();
        let mut encoder = factory.create(stream(), &options("video/webm")).unwrap();

        factory.set_fail_start(true);
        assert!(matches!(
            encoder.start(Duration::from_millis(20), Arc::new(|_: &[u8]| {}), Arc::new(|| {})),
            Err(CaptureError::EncoderFailed(_))
        ));
        assert_eq!(encoder.status(), EncoderStatus::Inactive);
        assert!(matches!(
            encoder.request_stop(),
            Err(CaptureError::FinalizeFailed(_))
        ));
    }

    #[test]
    fn stalled_stop_completes_once_released() {
        let factory = SimulatedEncoderFactory::default();
        let mut encoder = factory.create(stream(), &options("video/webm")).unwrap();
        let stopped = Completion::new();
        let done = stopped.clone();
        encoder
            .start(
                Duration::from_millis(20),
                Arc::new(|_: &[u8]| {}),
                Arc::new(move || {
                    done.complete(());
                }),
            )
            .unwrap();

        factory.set_stall_stop(true);
        encoder.request_stop().unwrap();
        assert!(stopped.wait(Duration::from_millis(80)).is_none());
        assert_eq!(encoder.status(), EncoderStatus::Recording);

        factory.set_stall_stop(false);
        assert!(stopped.wait(Duration::from_secs(2)).is_some());
        assert_eq!(encoder.status(), EncoderStatus::Inactive);
    }

    #[test]
    fn dropping_stalled_encoder_does_not_hang() {
        let factory = SimulatedEncoderFactory::default();
        let mut encoder = factory.create(stream(), &options("video/webm")).unwrap();
        encoder
            .start(Duration::from_millis(20), Arc::new(|_: &[u8]| {}), Arc::new(|| {}))
            .unwrap();

        factory.set_stall_stop(true);
        encoder.request_stop().unwrap();
        drop(encoder);
        assert!(!factory.emitted().is_empty());
    }
}
