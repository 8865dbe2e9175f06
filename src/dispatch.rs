//! Hop from the tracking thread onto the UI thread
//!
//! Anchor notifications arrive on whatever thread the tracking subsystem
//! uses. They are never applied there: the tracking side only holds an
//! [`AnchorSender`], and the UI thread drains the [`MainQueue`] once per
//! frame before touching session state.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use crate::session::AnchorEvent;

/// Surface orientation the tracker should detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaneDetection {
    #[default]
    Horizontal,
}

/// Configuration handed to the tracker when the session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingConfig {
    pub plane_detection: PlaneDetection,
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            plane_detection: PlaneDetection::Horizontal,
            reset_tracking: true,
            remove_existing_anchors: true,
        }
    }
}

/// Sending half, safe to move onto the tracking thread
#[derive(Debug, Clone)]
pub struct AnchorSender {
    tx: Sender<AnchorEvent>,
}

impl AnchorSender {
    /// Queue an event for the UI thread. Returns `false` once the session is gone.
    pub fn send(&self, event: AnchorEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Receiving half, owned by the UI thread
#[derive(Debug)]
pub struct MainQueue {
    tx: Sender<AnchorEvent>,
    rx: Receiver<AnchorEvent>,
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> AnchorSender {
        AnchorSender {
            tx: self.tx.clone(),
        }
    }

    /// Take everything queued so far, in arrival order, without blocking
    pub fn drain(&self) -> Vec<AnchorEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Anything that can deliver anchor events
pub trait TrackingSource {
    /// Begin tracking with `config`, delivering events through `sink`
    fn start(&mut self, config: TrackingConfig, sink: AnchorSender);
}

/// Tracking source replaying a fixed script from its own thread
///
/// Stands in for a real tracker in headless runs.
#[derive(Debug, Default)]
pub struct ScriptedTracking {
    script: Vec<(Duration, AnchorEvent)>,
    handle: Option<JoinHandle<usize>>,
}

impl ScriptedTracking {
    /// Each entry is sent after waiting its delay
    pub fn new(script: Vec<(Duration, AnchorEvent)>) -> Self {
        Self {
            script,
            handle: None,
        }
    }

    /// Wait for the script to finish; returns how many events were delivered
    pub fn join(&mut self) -> usize {
        self.handle
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or(0)
    }
}

impl TrackingSource for ScriptedTracking {
    fn start(&mut self, config: TrackingConfig, sink: AnchorSender) {
        log::info!("Tracking started: {:?}", config);
        let script = std::mem::take(&mut self.script);
        let spawned = thread::Builder::new()
            .name("tracking".to_string())
            .spawn(move || {
                let mut delivered = 0;
                for (delay, event) in script {
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    if !sink.send(event) {
                        break;
                    }
                    delivered += 1;
                }
                delivered
            });

        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("Failed to spawn tracking thread: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_drain_preserves_order() {
        let queue = MainQueue::new();
        let sender = queue.sender();
        sender.send(AnchorEvent::Added(Mat4::IDENTITY));
        sender.send(AnchorEvent::Removed);

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.drain(),
            vec![AnchorEvent::Added(Mat4::IDENTITY), AnchorEvent::Removed]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_events_cross_threads() {
        let queue = MainQueue::new();
        let sender = queue.sender();

        let handle = thread::spawn(move || {
            for _ in 0..3 {
                sender.send(AnchorEvent::Updated(Mat4::IDENTITY));
            }
        });
        handle.join().unwrap();

        assert_eq!(queue.drain().len(), 3);
    }

    #[test]
    fn test_scripted_tracking_delivers_script() {
        let queue = MainQueue::new();
        let mut tracking = ScriptedTracking::new(vec![
            (Duration::ZERO, AnchorEvent::Added(Mat4::IDENTITY)),
            (Duration::from_millis(1), AnchorEvent::Removed),
        ]);

        tracking.start(TrackingConfig::default(), queue.sender());
        assert_eq!(tracking.join(), 2);
        assert_eq!(queue.drain().len(), 2);
    }

    #[test]
    fn test_default_config_detects_horizontal_planes() {
        let config = TrackingConfig::default();
        assert_eq!(config.plane_detection, PlaneDetection::Horizontal);
        assert!(config.reset_tracking);
        assert!(config.remove_existing_anchors);
    }
}
