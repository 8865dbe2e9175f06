//! Session runtime
//!
//! Owns every piece of mutable session state and is driven from the single
//! UI-owning thread: input callbacks and the per-frame tick call in here,
//! tracking events reach it only through the [`MainQueue`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::anim::{AnimationLibrary, ClipPolicy, SceneAsset};
use crate::catalog::{Sign, SignCatalog};
use crate::dispatch::{AnchorSender, MainQueue, TrackingConfig, TrackingSource};
use crate::error::AssetError;
use crate::feedback::{TimedFeedbackScheduler, HIDE_FADE};
use crate::gesture::{GestureAccumulator, GesturePhase, GESTURE_SMOOTHING};
use crate::host::{NarrationService, Recorder, SceneHost, UiElement, UiPresenter};
use crate::layout::{ChromeLayout, Rect, Size};
use crate::menu::MenuState;
use crate::playback::{PlayOutcome, PlaybackController, PlaybackSettings, UNBOUNDED};
use crate::session::{
    AnchorEvent, Effect, SessionPhase, SessionStateMachine, Transition, GESTURE_HINT_DELAY,
};

/// Fade used when the menu closes
pub const MENU_FADE: Duration = Duration::from_millis(100);

/// The injected collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub scene: Arc<dyn SceneHost>,
    pub narration: Arc<dyn NarrationService>,
    pub ui: Arc<dyn UiPresenter>,
}

impl Collaborators {
    /// Use one recorder for all three roles
    pub fn recorded(recorder: &Recorder) -> Self {
        Self {
            scene: Arc::new(recorder.clone()),
            narration: Arc::new(recorder.clone()),
            ui: Arc::new(recorder.clone()),
        }
    }
}

/// Loaded catalog and animation library, plus whatever went wrong loading them
#[derive(Debug, Default)]
pub struct Assets {
    pub catalog: SignCatalog,
    pub library: AnimationLibrary,
    pub problems: Vec<AssetError>,
}

impl Assets {
    pub fn new(catalog: SignCatalog, library: AnimationLibrary) -> Self {
        Self {
            catalog,
            library,
            problems: Vec::new(),
        }
    }

    /// Load both assets from disk; failures leave the respective part empty
    pub fn load(catalog_path: &Path, scene_path: &Path, policy: &ClipPolicy) -> Self {
        let mut problems = Vec::new();

        let loaded = SignCatalog::load(catalog_path);
        problems.extend(loaded.problem);

        let library = match SceneAsset::load(scene_path) {
            Ok(asset) => AnimationLibrary::load_with(&asset, policy),
            Err(e) => {
                log::error!("{}", e);
                problems.push(e);
                AnimationLibrary::empty()
            }
        };

        Self {
            catalog: loaded.catalog,
            library,
            problems,
        }
    }
}

/// Timing and geometry of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeSettings {
    pub view: Size,
    pub hint_delay: Duration,
    pub hide_fade: Duration,
    pub gesture_smoothing: Duration,
    pub playback: PlaybackSettings,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            view: Size::new(640.0, 480.0),
            hint_delay: GESTURE_HINT_DELAY,
            hide_fade: HIDE_FADE,
            gesture_smoothing: GESTURE_SMOOTHING,
            playback: PlaybackSettings::default(),
        }
    }
}

/// A running AR sign session
pub struct Runtime {
    session: SessionStateMachine,
    controller: PlaybackController,
    gestures: GestureAccumulator,
    scheduler: TimedFeedbackScheduler,
    catalog: SignCatalog,
    menu: MenuState,
    queue: MainQueue,
    scene: Arc<dyn SceneHost>,
    ui: Arc<dyn UiPresenter>,
    settings: RuntimeSettings,
}

impl Runtime {
    /// Build the runtime and present the initial (searching) state
    ///
    /// Asset problems are surfaced as notices; the session still starts,
    /// possibly with nothing to play.
    pub fn new(assets: Assets, hosts: Collaborators, settings: RuntimeSettings) -> Self {
        for problem in &assets.problems {
            hosts.ui.show_notice(&problem.to_notice());
        }

        let controller = PlaybackController::new(
            Arc::new(assets.library),
            Arc::clone(&hosts.scene),
            hosts.narration,
            Arc::clone(&hosts.ui),
            settings.playback,
        );

        let mut runtime = Self {
            session: SessionStateMachine::with_hint_delay(settings.hint_delay),
            controller,
            gestures: GestureAccumulator::new(),
            scheduler: TimedFeedbackScheduler::new(settings.hide_fade),
            catalog: assets.catalog,
            menu: MenuState::new(),
            queue: MainQueue::new(),
            scene: hosts.scene,
            ui: hosts.ui,
            settings,
        };

        runtime.ui.set_menu_rows(&runtime.catalog.menu_rows());
        runtime.layout_chrome();
        let effects = runtime.session.enter_effects();
        runtime.apply(effects);
        runtime
    }

    /// Configure and start a tracker; its events are marshalled onto this thread
    pub fn start_tracking(&self, source: &mut dyn TrackingSource) {
        source.start(TrackingConfig::default(), self.queue.sender());
    }

    /// Handle for delivering anchor events from another thread
    pub fn anchor_sender(&self) -> AnchorSender {
        self.queue.sender()
    }

    /// Apply an anchor event. Must run on the UI-owning thread.
    pub fn handle_anchor(&mut self, event: AnchorEvent) -> Transition {
        let transition = self.session.handle(event);
        if transition.from == SessionPhase::Ready && transition.to != SessionPhase::Ready {
            self.gestures.reset();
            self.menu.close();
        }
        self.apply(transition.effects.clone());
        transition
    }

    /// Play a sign on the anchored model
    pub fn play(&mut self, sign: &Sign) -> PlayOutcome {
        self.controller.play(
            sign,
            &mut self.session,
            &mut self.scheduler,
            self.settings.view,
        )
    }

    /// Play the catalog entry at `index` and close the menu
    pub fn select_sign(&mut self, index: usize) -> Option<PlayOutcome> {
        let sign = self.catalog.get(index)?.clone();
        let outcome = self.play(&sign);
        if self.menu.is_open() {
            self.menu.close();
            self.ui.fade_out(UiElement::Menu, MENU_FADE);
        }
        Some(outcome)
    }

    /// Open or close the sign menu; ignored until the session is ready
    pub fn toggle_menu(&mut self) -> bool {
        if !self.session.is_ready() {
            return false;
        }
        if self.menu.toggle() {
            self.ui.reveal(UiElement::Menu);
        } else {
            self.ui.fade_out(UiElement::Menu, MENU_FADE);
        }
        self.menu.is_open()
    }

    /// Pinch sample; returns `true` if taken (the recogniser should reset to 1.0)
    pub fn pinch(&mut self, phase: GesturePhase, scale: f32) -> bool {
        if !self.session.is_ready() {
            return false;
        }
        self.gestures.pinch(phase, scale)
    }

    /// Pan translation; only applies while a model is anchored
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if self.session.model().is_some() {
            self.gestures.pan(dx, dy);
        }
    }

    /// New view bounds: re-layout the chrome
    pub fn resize(&mut self, view: Size) {
        self.settings.view = view;
        self.layout_chrome();
    }

    /// One render tick
    pub fn frame(&mut self, delta: Duration) {
        for event in self.queue.drain() {
            self.handle_anchor(event);
        }

        for task in self.scheduler.advance(delta) {
            self.ui.fade_out(task.element, task.fade);
        }

        let smoothing = self.settings.gesture_smoothing;
        let actions = self.gestures.take_frame();
        if let Some(model) = self.session.model_mut() {
            model.clips.update(delta);
            for (key, active) in model.clips.iter() {
                self.scene.set_clip_weight(model.node, key, active.weight());
            }
            if let Some(factor) = actions.scale_by {
                self.scene.run_scale_action(model.node, factor, smoothing);
            }
            let (axis, angle) = actions.rotate_to;
            self.scene.run_rotate_action(model.node, axis, angle, smoothing);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn session(&self) -> &SessionStateMachine {
        &self.session
    }

    pub fn catalog(&self) -> &SignCatalog {
        &self.catalog
    }

    pub fn library(&self) -> &AnimationLibrary {
        self.controller.library()
    }

    pub fn scheduler(&self) -> &TimedFeedbackScheduler {
        &self.scheduler
    }

    pub fn gestures(&self) -> &GestureAccumulator {
        &self.gestures
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn view(&self) -> Size {
        self.settings.view
    }

    fn layout_chrome(&self) {
        let chrome = ChromeLayout::compute(self.settings.view);
        self.ui.set_frame(UiElement::MenuButton, chrome.menu_button);
        self.ui.set_frame(UiElement::Menu, chrome.menu);
    }

    fn center_text(&self, element: UiElement, text: &str) {
        let size = self.ui.measure_text(element, text, UNBOUNDED);
        self.ui
            .set_frame(element, Rect::centered(self.settings.view, size));
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AttachModel { node, position } => self.scene.attach_model(node, position),
                Effect::DetachModel { node } => self.scene.detach_model(node),
                Effect::SetPosition { node, position } => self.scene.set_position(node, position),
                Effect::SetText { element, text } => {
                    self.ui.set_text(element, text);
                    self.center_text(element, text);
                }
                Effect::Reveal(element) => {
                    self.scheduler.cancel(element);
                    self.ui.reveal(element);
                }
                Effect::Conceal(element) => {
                    self.scheduler.cancel(element);
                    self.ui.conceal(element);
                }
                Effect::HideAfter { element, delay } => {
                    self.scheduler.hide(element, delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostCall;
    use glam::{Mat4, Vec3};

    fn runtime() -> (Runtime, Recorder) {
        let asset = SceneAsset::from_json(
            "Animations",
            r#"{"root": {"name": "root", "children": [
                {"name": "hands", "animations": [{"key": "yes", "duration": 2.0}]}
            ]}}"#,
        )
        .unwrap();
        let catalog = SignCatalog::new(vec![Sign::new("yes", "Yes", "ASL", "Nod your head", "✅")]);
        let recorder = Recorder::new();
        let rt = Runtime::new(
            Assets::new(catalog, AnimationLibrary::load(&asset)),
            Collaborators::recorded(&recorder),
            RuntimeSettings::default(),
        );
        (rt, recorder)
    }

    #[test]
    fn test_initial_presentation() {
        let (_rt, recorder) = runtime();
        assert!(recorder.is_visible(UiElement::SurfacePrompt));
        assert!(!recorder.is_visible(UiElement::MenuButton));
        assert_eq!(
            recorder.text_of(UiElement::SurfacePrompt).as_deref(),
            Some("Move around\nto find surface")
        );
        assert!(recorder
            .calls()
            .contains(&HostCall::MenuRows(vec!["✅ Yes".to_string()])));
    }

    #[test]
    fn test_asset_problems_become_notices() {
        let recorder = Recorder::new();
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(
            &dir.path().join("Data.json"),
            &dir.path().join("Animations.json"),
            &ClipPolicy::default(),
        );
        assert_eq!(assets.problems.len(), 2);

        let rt = Runtime::new(
            assets,
            Collaborators::recorded(&recorder),
            RuntimeSettings::default(),
        );
        let bodies: Vec<_> = recorder.notices().into_iter().map(|n| n.body).collect();
        assert_eq!(
            bodies,
            vec!["Signs file not found".to_string(), "Animations file not found".to_string()]
        );
        assert!(rt.catalog().is_empty());
        assert!(rt.library().is_empty());
    }

    #[test]
    fn test_events_marshalled_through_frame() {
        let (mut rt, recorder) = runtime();
        let sender = rt.anchor_sender();
        std::thread::spawn(move || {
            let transform = Mat4::from_translation(Vec3::new(0.0, -1.0, -2.0));
            sender.send(AnchorEvent::Added(transform));
        })
        .join()
        .unwrap();

        assert_eq!(rt.phase(), SessionPhase::SearchingPlane);
        rt.frame(Duration::ZERO);
        assert_eq!(rt.phase(), SessionPhase::Ready);

        let node = rt.session().model().unwrap().node;
        assert!(recorder
            .calls()
            .contains(&HostCall::AttachModel(node, Vec3::new(0.0, -1.0, -2.0))));
    }

    #[test]
    fn test_ready_hides_prompt_and_later_hint() {
        let (mut rt, recorder) = runtime();
        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        assert!(recorder.is_visible(UiElement::GestureHint));
        assert!(recorder.is_visible(UiElement::MenuButton));

        rt.frame(Duration::ZERO);
        assert!(!recorder.is_visible(UiElement::SurfacePrompt));
        assert!(recorder.is_visible(UiElement::GestureHint));

        rt.frame(Duration::from_secs(7));
        assert!(!recorder.is_visible(UiElement::GestureHint));
    }

    #[test]
    fn test_prompt_stays_when_anchor_lost_in_same_frame() {
        let (mut rt, recorder) = runtime();
        let sender = rt.anchor_sender();
        sender.send(AnchorEvent::Added(Mat4::IDENTITY));
        sender.send(AnchorEvent::Removed);

        rt.frame(Duration::from_millis(16));
        assert_eq!(rt.phase(), SessionPhase::SearchingPlane);
        assert!(rt.scheduler().pending_for(UiElement::SurfacePrompt).is_none());
        assert!(recorder.is_visible(UiElement::SurfacePrompt));
        assert_eq!(
            recorder.count(|c| *c == HostCall::FadeOut(UiElement::SurfacePrompt, HIDE_FADE)),
            0
        );
    }

    #[test]
    fn test_clip_weights_reported_each_frame() {
        let (mut rt, recorder) = runtime();
        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        let node = rt.session().model().unwrap().node;
        rt.select_sign(0);

        rt.frame(Duration::from_millis(250));
        rt.frame(Duration::from_millis(750));
        let weights: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::ClipWeight(n, key, w) if n == node && key == "yes" => Some(w),
                _ => None,
            })
            .collect();
        assert_eq!(weights.len(), 2);
        assert!((weights[0] - 0.5).abs() < 1e-6);
        assert_eq!(weights[1], 1.0);
    }

    #[test]
    fn test_anchor_removed_cancels_hint_timer() {
        let (mut rt, _recorder) = runtime();
        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        rt.handle_anchor(AnchorEvent::Removed);
        assert!(rt.scheduler().pending_for(UiElement::GestureHint).is_none());
    }

    #[test]
    fn test_gestures_ignored_before_ready() {
        let (mut rt, recorder) = runtime();
        assert!(!rt.pinch(GesturePhase::Changed, 2.0));
        rt.pan(180.0, 0.0);
        rt.frame(Duration::from_millis(16));

        assert_eq!(rt.gestures().current().rotation_angle, 0.0);
        assert_eq!(
            recorder.count(|c| matches!(c, HostCall::ScaleBy(..) | HostCall::RotateTo(..))),
            0
        );
    }

    #[test]
    fn test_pinch_applied_once() {
        let (mut rt, recorder) = runtime();
        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        let node = rt.session().model().unwrap().node;

        assert!(rt.pinch(GesturePhase::Changed, 2.0));
        rt.frame(Duration::from_millis(16));
        rt.frame(Duration::from_millis(16));

        let scales: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::ScaleBy(..)))
            .collect();
        assert_eq!(scales, vec![HostCall::ScaleBy(node, 2.0, GESTURE_SMOOTHING)]);
    }

    #[test]
    fn test_menu_toggle_and_select() {
        let (mut rt, recorder) = runtime();
        assert!(!rt.toggle_menu());

        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        assert!(rt.toggle_menu());
        assert!(recorder.is_visible(UiElement::Menu));

        assert_eq!(rt.select_sign(0), Some(PlayOutcome::Started { restarted: false }));
        assert!(!rt.is_menu_open());
        assert!(!recorder.is_visible(UiElement::Menu));
        assert!(rt.select_sign(5).is_none());
    }

    #[test]
    fn test_clips_advance_with_frames() {
        let (mut rt, _recorder) = runtime();
        rt.handle_anchor(AnchorEvent::Added(Mat4::IDENTITY));
        rt.select_sign(0);
        assert_eq!(rt.session().model().unwrap().clips.count(), 1);

        rt.frame(Duration::from_secs(2));
        assert_eq!(rt.session().model().unwrap().clips.count(), 0);
    }

    #[test]
    fn test_resize_relayouts_chrome() {
        let (mut rt, recorder) = runtime();
        rt.resize(Size::new(1024.0, 768.0));
        assert_eq!(
            recorder.frame_of(UiElement::MenuButton),
            Some(Rect::new(938.0, 682.0, 70.0, 70.0))
        );
        assert_eq!(rt.view(), Size::new(1024.0, 768.0));
    }
}
