use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::media_models::{EncoderStatus, MediaConstraints};
use crate::models::recording_result::{RecordingResult, RecordingStats};
use crate::models::state::{RecordingState, SessionEvent};
use crate::processing::completion::Completion;
use crate::processing::format::negotiate_mime_type;
use crate::processing::fragment_buffer::FragmentBuffer;
use crate::storage::local_file::save_recording;
use crate::traits::capture_host::{CaptureHost, StreamHandle};
use crate::traits::encoder::{ChunkedEncoder, EncoderFactory, EncoderOptions, FragmentCallback, StopCallback};
use crate::traits::preview_surface::PreviewSurface;
use crate::traits::session_delegate::SessionDelegate;

/// How long a retired encoder gets to flush during a device switch or teardown.
const RETIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Session data shared with encoder callbacks, protected by `parking_lot::Mutex`.
struct SessionInner {
    state: RecordingState,
    fragments: FragmentBuffer,
    started_at: Option<Instant>,
    started_at_wall: Option<DateTime<Utc>>,
    ended_at_wall: Option<DateTime<Utc>>,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            state: RecordingState::Inactive,
            fragments: FragmentBuffer::new(),
            started_at: None,
            started_at_wall: None,
            ended_at_wall: None,
            delegate: None,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

/// An encoder that has been started, with the signal its stop callback resolves.
struct ActiveEncoder {
    handle: Box<dyn ChunkedEncoder>,
    stopped: Completion<()>,
}

/// Recording-session lifecycle manager.
///
/// Generic over the host's acquisition API and chunked-encoding engine.
/// Owns the active stream and at most one encoder; fragments from every
/// encoder used during one logical recording land in a single ordered buffer:
/// ```text
/// [CaptureHost] → stream ─┬→ [PreviewSurface]
///                         └→ [ChunkedEncoder] → fragments → [FragmentBuffer] → RecordingResult
/// ```
///
/// Operations take `&mut self`; callers must not interleave them.
pub struct CaptureSession<H: CaptureHost, F: EncoderFactory> {
    host: H,
    encoders: F,
    config: RecorderConfiguration,
    mime_type: String,
    inner: Arc<Mutex<SessionInner>>,
    stream: Option<StreamHandle>,
    encoder: Option<ActiveEncoder>,
    preview: Option<Arc<dyn PreviewSurface>>,
}

impl<H: CaptureHost, F: EncoderFactory> CaptureSession<H, F> {
    /// Build a session. The output format is negotiated once, here.
    pub fn new(host: H, encoders: F, config: RecorderConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        let mime_type = negotiate_mime_type(&config.mime_preferences, &encoders);

        Ok(Self {
            host,
            encoders,
            config,
            mime_type,
            inner: Arc::new(Mutex::new(SessionInner::new())),
            stream: None,
            encoder: None,
            preview: None,
        })
    }

    /// Install the event delegate. Takes effect immediately, including for
    /// fragments of a recording already in progress.
    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.inner.lock().delegate = Some(delegate);
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn encoders(&self) -> &F {
        &self.encoders
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    /// Output format chosen at construction; empty if nothing was supported.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn state(&self) -> RecordingState {
        self.inner.lock().state
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().state.is_recording()
    }

    /// Live status of the current encoder, for diagnostics.
    pub fn encoder_status(&self) -> Option<EncoderStatus> {
        self.encoder.as_ref().map(|e| e.handle.status())
    }

    pub fn current_stream(&self) -> Option<StreamHandle> {
        self.stream.clone()
    }

    pub fn preview_surface(&self) -> Option<Arc<dyn PreviewSurface>> {
        self.preview.clone()
    }

    /// Acquire a stream and show it, muted, on `surface`.
    ///
    /// On failure the surface keeps whatever it displayed before. The
    /// previously held stream is released only once the new one plays. If a
    /// recording is running, its encoder moves to the new stream the same way
    /// `switch_device` does.
    pub fn begin_preview(
        &mut self,
        surface: Arc<dyn PreviewSurface>,
        constraints: &MediaConstraints,
    ) -> Result<(), CaptureError> {
        let stream = self.acquire(constraints, "starting preview")?;
        let pending = self.prepare_encoder(&stream)?;

        let previous_source = surface.source();
        surface.attach(Some(Arc::clone(&stream)));
        surface.set_muted(true);
        if let Err(e) = surface.play() {
            surface.attach(previous_source);
            stream.stop_tracks();
            self.report("starting preview playback", &e);
            return Err(e);
        }

        self.preview = Some(surface);
        self.commit_stream(stream, pending)?;
        log::info!("Preview started");
        Ok(())
    }

    /// Acquire a fresh stream and start recording it.
    ///
    /// Transitions: inactive → recording.
    pub fn begin_recording(&mut self, constraints: &MediaConstraints) -> Result<(), CaptureError> {
        let state = self.state();
        if let Err(e) = state.transition(SessionEvent::BeginRecording) {
            self.report("starting recording", &e);
            return Err(e);
        }

        let stream = self.acquire(constraints, "starting recording")?;
        let handle = match self.create_encoder(&stream) {
            Ok(handle) => handle,
            Err(e) => {
                stream.stop_tracks();
                self.report("creating encoder", &e);
                return Err(e);
            }
        };

        self.release_stream();
        self.stream = Some(Arc::clone(&stream));
        self.rebind_preview(&stream);

        {
            let mut s = self.inner.lock();
            s.fragments.clear();
            s.started_at = Some(Instant::now());
            s.started_at_wall = Some(Utc::now());
            s.ended_at_wall = None;
        }

        let active = match self.start_encoder(handle) {
            Ok(active) => active,
            Err(e) => {
                self.report("starting encoder", &e);
                return Err(e);
            }
        };
        self.encoder = Some(active);
        self.set_state(RecordingState::Recording);

        log::info!("Recording started ({})", self.mime_type);
        Ok(())
    }

    /// Move the session to a stream matching `constraints`.
    ///
    /// While recording, the current encoder is stopped and flushed, a new
    /// encoder is bound to the new stream and keeps appending to the same
    /// fragment buffer. The recording start time is kept. While inactive,
    /// only the stream (and the preview) change.
    ///
    /// Transitions: recording → recording, inactive → inactive.
    pub fn switch_device(&mut self, constraints: &MediaConstraints) -> Result<(), CaptureError> {
        let state = self.state();
        if let Err(e) = state.transition(SessionEvent::SwitchDevice) {
            self.report("switching device", &e);
            return Err(e);
        }

        let stream = self.acquire(constraints, "switching device")?;
        let pending = self.prepare_encoder(&stream)?;
        self.commit_stream(Arc::clone(&stream), pending)?;

        if let Some(surface) = self.preview.clone() {
            surface.attach(Some(Arc::clone(&stream)));
            if let Err(e) = surface.play() {
                // The stream and recording are already switched.
                self.report("resuming preview after device switch", &e);
            }
        }

        log::info!("Switched capture device (recording: {})", self.is_recording());
        Ok(())
    }

    /// Finalize the recording and hand back the concatenated data.
    ///
    /// Blocks until the encoder reports that all buffered data was flushed.
    /// If the encoder refuses to stop or never reports back, the session is
    /// left as it was and the call may be retried.
    ///
    /// Transitions: recording → inactive.
    pub fn stop_recording(&mut self) -> Result<RecordingResult, CaptureError> {
        let Some(active) = self.encoder.as_mut() else {
            let e = CaptureError::NoActiveRecording;
            self.report("stopping recording", &e);
            return Err(e);
        };

        if let Err(e) = active.handle.request_stop() {
            let e = match e {
                CaptureError::FinalizeFailed(_) => e,
                other => CaptureError::FinalizeFailed(other.to_string()),
            };
            self.report("stopping encoder", &e);
            return Err(e);
        }

        if active.stopped.wait(self.config.stop_timeout).is_none() {
            let e = CaptureError::Timeout;
            self.report("waiting for encoder to flush", &e);
            return Err(e);
        }

        self.encoder = None;

        let (data, duration_ms) = {
            let mut s = self.inner.lock();
            let duration_ms = s.elapsed_ms();
            s.ended_at_wall = Some(Utc::now());
            (s.fragments.take(), duration_ms)
        };
        self.set_state(RecordingState::Inactive);

        let result = RecordingResult::new(data, &self.mime_type, duration_ms);
        log::info!(
            "Recording finished: {} bytes over {} ms",
            result.size_bytes,
            result.duration_ms
        );

        if let Some(delegate) = self.delegate() {
            delegate.on_recording_finished(&result);
        }
        Ok(result)
    }

    /// Snapshot of the session. Duration and size are computed live.
    pub fn stats(&self) -> RecordingStats {
        let s = self.inner.lock();
        let recording = s.state.is_recording();
        RecordingStats {
            started_at: s.started_at_wall,
            ended_at: if recording {
                None
            } else {
                Some(s.ended_at_wall.unwrap_or_else(Utc::now))
            },
            duration_ms: if recording { s.elapsed_ms() } else { 0 },
            state: s.state,
            mime_type: self.mime_type.clone(),
            size_bytes: s.fragments.total_size(),
        }
    }

    /// Save `result` into the configured output directory.
    ///
    /// Fire-and-forget: failures are logged and reported to the delegate.
    pub fn persist_to_local_file(&self, result: &RecordingResult, name: &str) {
        if let Err(e) = save_recording(result, &self.config.output_directory, name) {
            self.report("saving recording", &e);
        }
    }

    /// Stop any encoder and release the held stream.
    ///
    /// Data still buffered from an unfinished recording is discarded.
    pub fn release(&mut self) {
        if let Some(active) = self.encoder.take() {
            log::warn!("Releasing session with an unfinished recording");
            self.retire_encoder(active);
            self.inner.lock().fragments.clear();
        }
        self.release_stream();
        if !self.state().is_inactive() {
            self.set_state(RecordingState::Inactive);
        }
    }

    // --- Internal helpers ---

    fn delegate(&self) -> Option<Arc<dyn SessionDelegate>> {
        self.inner.lock().delegate.clone()
    }

    fn set_state(&self, new_state: RecordingState) {
        let delegate = {
            let mut s = self.inner.lock();
            s.state = new_state;
            s.delegate.clone()
        };
        if let Some(delegate) = delegate {
            delegate.on_state_changed(new_state);
        }
    }

    /// Log a caught error and forward it to the delegate.
    fn report(&self, context: &str, error: &CaptureError) {
        if error.is_acquisition_failure() {
            log::warn!("Error {}: {}", context, error);
        } else {
            log::error!("Error {}: {}", context, error);
        }
        if let Some(delegate) = self.delegate() {
            delegate.on_error(error);
        }
    }

    fn acquire(&self, constraints: &MediaConstraints, context: &str) -> Result<StreamHandle, CaptureError> {
        let result = if constraints.is_empty() {
            Err(CaptureError::AcquisitionFailed("no audio or video requested".into()))
        } else {
            self.host.acquire(constraints)
        };

        result.map_err(|e| {
            self.report(context, &e);
            e
        })
    }

    fn create_encoder(&self, stream: &StreamHandle) -> Result<Box<dyn ChunkedEncoder>, CaptureError> {
        let options = EncoderOptions {
            mime_type: self.mime_type.clone(),
            audio_bits_per_second: self.config.audio_bits_per_second,
            video_bits_per_second: self.config.video_bits_per_second,
        };
        self.encoders.create(Arc::clone(stream), &options)
    }

    /// Create (but do not start) the encoder a stream swap will need.
    ///
    /// On failure the new stream is released and nothing else changes.
    fn prepare_encoder(&self, stream: &StreamHandle) -> Result<Option<Box<dyn ChunkedEncoder>>, CaptureError> {
        if !self.is_recording() {
            return Ok(None);
        }
        match self.create_encoder(stream) {
            Ok(handle) => Ok(Some(handle)),
            Err(e) => {
                stream.stop_tracks();
                self.report("creating encoder for new stream", &e);
                Err(e)
            }
        }
    }

    fn start_encoder(&self, mut handle: Box<dyn ChunkedEncoder>) -> Result<ActiveEncoder, CaptureError> {
        let stopped = Completion::new();
        let signal = stopped.clone();
        let on_stop: StopCallback = Arc::new(move || {
            if !signal.complete(()) {
                log::debug!("Ignoring repeated encoder stop notification");
            }
        });

        handle.start(self.config.flush_interval(), self.fragment_callback(), on_stop)?;
        Ok(ActiveEncoder { handle, stopped })
    }

    fn fragment_callback(&self) -> FragmentCallback {
        let inner = Arc::clone(&self.inner);

        Arc::new(move |fragment: &[u8]| {
            let (total, delegate) = {
                let mut s = inner.lock();
                if !s.fragments.push(fragment) {
                    log::debug!("Dropped empty fragment");
                    return;
                }
                (s.fragments.total_size(), s.delegate.clone())
            };
            log::debug!("Buffered fragment of {} bytes ({} total)", fragment.len(), total);
            if let Some(d) = delegate {
                d.on_fragment(fragment.len(), total);
            }
        })
    }

    /// Stop an encoder that is being replaced and wait for its final fragment.
    fn retire_encoder(&self, mut active: ActiveEncoder) {
        if let Err(e) = active.handle.request_stop() {
            self.report("stopping replaced encoder", &e);
            return;
        }
        if active.stopped.wait(RETIRE_TIMEOUT).is_none() {
            log::warn!("Replaced encoder did not report stop within {:?}", RETIRE_TIMEOUT);
        }
    }

    /// Swap in `stream`, moving a running recording onto `pending`.
    fn commit_stream(
        &mut self,
        stream: StreamHandle,
        pending: Option<Box<dyn ChunkedEncoder>>,
    ) -> Result<(), CaptureError> {
        if pending.is_some() {
            if let Some(active) = self.encoder.take() {
                self.retire_encoder(active);
            }
        }

        self.release_stream();
        self.stream = Some(stream);

        if let Some(handle) = pending {
            match self.start_encoder(handle) {
                Ok(active) => self.encoder = Some(active),
                Err(e) => {
                    // Fragments stay buffered until the next recording starts.
                    self.report("restarting encoder on new stream", &e);
                    self.set_state(RecordingState::Inactive);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn rebind_preview(&self, stream: &StreamHandle) {
        if let Some(ref surface) = self.preview {
            surface.attach(Some(Arc::clone(stream)));
            if let Err(e) = surface.play() {
                self.report("resuming preview", &e);
            }
        }
    }

    /// Stop every track of the held stream and drop it.
    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("Releasing stream {}", stream.id());
            stream.stop_tracks();
        }
    }
}

impl<H: CaptureHost, F: EncoderFactory> Drop for CaptureSession<H, F> {
    fn drop(&mut self) {
        self.release();
    }
}
