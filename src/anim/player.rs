//! Clip playback on the hand model
//!
//! Clips are keyed: different keys run side by side, starting a key that is
//! already running restarts it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::library::AnimationClip;

/// Playback state of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipState {
    #[default]
    Playing,
    Finished,
}

/// A clip running on a model
#[derive(Debug, Clone)]
pub struct ActiveClip {
    pub clip: Arc<AnimationClip>,
    /// Time since the clip (re)started
    pub elapsed: Duration,
    pub state: ClipState,
}

impl ActiveClip {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            elapsed: Duration::ZERO,
            state: ClipState::Playing,
        }
    }

    /// Rewind and play from the start
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = ClipState::Playing;
    }

    pub fn update(&mut self, delta: Duration) {
        if self.state == ClipState::Finished {
            return;
        }

        self.elapsed += delta;
        if self.elapsed >= self.clip.total_length() {
            self.elapsed = self.clip.total_length();
            self.state = ClipState::Finished;
        }
    }

    /// Blend weight in `[0, 1]`: ramps up over blend-in, down over blend-out
    pub fn weight(&self) -> f32 {
        let total = self.clip.total_length();
        if total.is_zero() {
            return 0.0;
        }

        let t = self.elapsed.as_secs_f32();
        let fade_in = if self.clip.blend_in.is_zero() {
            1.0
        } else {
            t / self.clip.blend_in.as_secs_f32()
        };

        let remaining = total.saturating_sub(self.elapsed).as_secs_f32();
        let fade_out = if self.clip.blend_out.is_zero() {
            1.0
        } else {
            remaining / self.clip.blend_out.as_secs_f32()
        };

        fade_in.min(fade_out).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.state == ClipState::Finished
    }
}

/// Set of clips active on one model
#[derive(Debug, Default)]
pub struct ClipPlayer {
    active: BTreeMap<String, ActiveClip>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a clip under its key. Returns `true` if it replaced a running one.
    pub fn play(&mut self, clip: Arc<AnimationClip>) -> bool {
        match self.active.get_mut(&clip.key) {
            Some(existing) => {
                existing.clip = clip;
                existing.restart();
                true
            }
            None => {
                self.active.insert(clip.key.clone(), ActiveClip::new(clip));
                false
            }
        }
    }

    /// Advance every clip; finished auto-removing clips are dropped
    pub fn update(&mut self, delta: Duration) {
        for active in self.active.values_mut() {
            active.update(delta);
        }
        self.active
            .retain(|_, a| !(a.is_finished() && a.clip.removed_on_completion));
    }

    pub fn get(&self, key: &str) -> Option<&ActiveClip> {
        self.active.get(key)
    }

    /// Active clips by key, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActiveClip)> {
        self.active.iter().map(|(key, active)| (key.as_str(), active))
    }

    /// Keys of clips currently in the player, sorted
    pub fn active_keys(&self) -> Vec<&str> {
        self.active.keys().map(String::as_str).collect()
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }
}
