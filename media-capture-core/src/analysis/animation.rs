use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::error::CaptureError;

/// Roughly one display refresh.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Repeating task owned by one component instance.
///
/// Runs `tick` on a dedicated thread every `interval`, first tick
/// immediately. Independent loops never share a scheduler.
pub struct AnimationLoop {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AnimationLoop {
    pub fn start<T>(name: &str, interval: Duration, mut tick: T) -> Result<Self, CaptureError>
    where
        T: FnMut() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    tick();
                    thread::sleep(interval);
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn {} thread: {}", name, e)))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop and wait for the current tick to finish.
    ///
    /// Returns `false` if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        self.running.store(false, Ordering::SeqCst);
        if handle.join().is_err() {
            log::error!("Animation loop thread panicked");
        }
        true
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let mut animation = AnimationLoop::start("test-loop", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        thread::sleep(Duration::from_millis(60));
        assert!(animation.is_running());
        assert!(animation.cancel());
        assert!(!animation.is_running());

        let after_cancel = ticks.load(Ordering::SeqCst);
        assert!(after_cancel >= 2);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn cancel_is_single_shot() {
        let mut animation = AnimationLoop::start("test-loop", Duration::from_millis(5), || {}).unwrap();
        assert!(animation.cancel());
        assert!(!animation.cancel());
    }
}
