//! Sign playback
//!
//! Plays a sign on the anchored model: starts its clip, narrates the word and
//! shows the caption, which fades after a fixed delay.

use std::sync::Arc;
use std::time::Duration;

use crate::anim::AnimationLibrary;
use crate::catalog::Sign;
use crate::feedback::TimedFeedbackScheduler;
use crate::host::{NarrationService, Notice, SceneHost, UiElement, UiPresenter};
use crate::layout::{CaptionLayout, Size, MENU_BUTTON_SIDE};
use crate::session::SessionStateMachine;

/// Narration rate relative to the default speaking rate
pub const NARRATION_RATE: f32 = 0.5;
/// How long captions stay up before fading
pub const CAPTION_HIDE_DELAY: Duration = Duration::from_secs(6);

/// Measurement bounds for text that never wraps
pub(crate) const UNBOUNDED: Size = Size::new(f32::INFINITY, f32::INFINITY);

/// Tunables for playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub narration_rate: f32,
    pub caption_delay: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            narration_rate: NARRATION_RATE,
            caption_delay: CAPTION_HIDE_DELAY,
        }
    }
}

/// What a play request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Clip started; `restarted` if the same key was already running
    Started { restarted: bool },
    /// No clip for the sign's key; a notice was shown
    NotFound,
    /// Session not ready; nothing happened
    NotReady,
}

/// Orchestrates clip, narration and caption for a selected sign
pub struct PlaybackController {
    library: Arc<AnimationLibrary>,
    scene: Arc<dyn SceneHost>,
    narration: Arc<dyn NarrationService>,
    ui: Arc<dyn UiPresenter>,
    settings: PlaybackSettings,
}

impl PlaybackController {
    pub fn new(
        library: Arc<AnimationLibrary>,
        scene: Arc<dyn SceneHost>,
        narration: Arc<dyn NarrationService>,
        ui: Arc<dyn UiPresenter>,
        settings: PlaybackSettings,
    ) -> Self {
        Self {
            library,
            scene,
            narration,
            ui,
            settings,
        }
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Play `sign` on the anchored model
    ///
    /// Requests before the session is ready are dropped silently. A key
    /// without a clip shows one notice and changes nothing else. Earlier
    /// narration is not interrupted.
    pub fn play(
        &self,
        sign: &Sign,
        session: &mut SessionStateMachine,
        scheduler: &mut TimedFeedbackScheduler,
        view: Size,
    ) -> PlayOutcome {
        if !session.is_ready() {
            log::debug!("Ignoring play of '{}' before the session is ready", sign.key);
            return PlayOutcome::NotReady;
        }
        let Some(model) = session.model_mut() else {
            return PlayOutcome::NotReady;
        };

        let Some(clip) = self.library.lookup(&sign.key) else {
            log::warn!("No animation for sign '{}'", sign.key);
            self.ui.show_notice(&Notice::animation_not_found());
            return PlayOutcome::NotFound;
        };

        let restarted = model.clips.play(Arc::clone(&clip));
        self.scene.play_clip(model.node, &clip);
        log::info!(
            "Playing '{}' on model {}{}",
            sign.key,
            model.node,
            if restarted { " (restart)" } else { "" }
        );

        self.narration.speak(&sign.word, self.settings.narration_rate);
        self.show_caption(sign, scheduler, view);

        PlayOutcome::Started { restarted }
    }

    fn show_caption(&self, sign: &Sign, scheduler: &mut TimedFeedbackScheduler, view: Size) {
        self.ui.set_text(UiElement::CaptionWord, &sign.word);
        self.ui.set_text(UiElement::CaptionNote, &sign.note);
        self.ui.reveal(UiElement::CaptionNote);
        self.ui.reveal(UiElement::CaptionWord);

        let note_bounds = CaptionLayout::note_bounds(view, MENU_BUTTON_SIDE);
        let note = self
            .ui
            .measure_text(UiElement::CaptionNote, &sign.note, note_bounds);
        let word = self
            .ui
            .measure_text(UiElement::CaptionWord, &sign.word, UNBOUNDED);
        let layout = CaptionLayout::compute(view, note, word);
        self.ui.set_frame(UiElement::CaptionNote, layout.note);
        self.ui.set_frame(UiElement::CaptionWord, layout.word);

        scheduler.hide(UiElement::CaptionWord, self.settings.caption_delay);
        scheduler.hide(UiElement::CaptionNote, self.settings.caption_delay);
    }
}
