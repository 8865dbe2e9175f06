//! Collaborator interfaces
//!
//! The core never touches rendering, speech synthesis or widgets directly.
//! It drives them through the traits below, which are injected at
//! construction time. [`Recorder`] implements all of them for headless runs.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use parking_lot::Mutex;

use crate::anim::AnimationClip;
use crate::layout::{Rect, Size};

/// Handle of a node owned by the scene host
pub type NodeId = u64;

/// UI elements the core reveals, hides and positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiElement {
    /// "Move around" / "Tap to confirm" prompt
    SurfacePrompt,
    /// Pinch-and-pan hint shown once the model is placed
    GestureHint,
    /// Button that toggles the sign menu
    MenuButton,
    /// The sign list itself
    Menu,
    /// Large caption line with the sign's word
    CaptionWord,
    /// Wrapped caption paragraph with the sign's note
    CaptionNote,
}

/// A modal notice (title + body) surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    /// Notice for a sign whose key has no animation clip
    pub fn animation_not_found() -> Self {
        Self::new("Something went wrong", "Animation not found")
    }
}

/// Scene graph and render host
pub trait SceneHost: Send + Sync {
    /// Attach a freshly instantiated model at a world position
    fn attach_model(&self, node: NodeId, position: Vec3);

    /// Detach and discard a model
    fn detach_model(&self, node: NodeId);

    /// Move a model to a world position
    fn set_position(&self, node: NodeId, position: Vec3);

    /// Start (or restart) a clip on a model, keyed by the clip's key
    fn play_clip(&self, node: NodeId, clip: &AnimationClip);

    /// Blend weight of a running clip for this frame, in `[0, 1]`
    fn set_clip_weight(&self, node: NodeId, key: &str, weight: f32);

    /// Multiply the model's scale by `factor`, tweened over `duration`
    fn run_scale_action(&self, node: NodeId, factor: f32, duration: Duration);

    /// Rotate the model to an absolute axis/angle, tweened over `duration`
    fn run_rotate_action(&self, node: NodeId, axis: Vec3, angle: f32, duration: Duration);
}

/// Text-to-speech narration
pub trait NarrationService: Send + Sync {
    /// Speak `text` at `rate` (1.0 = default rate). Fire-and-forget.
    fn speak(&self, text: &str, rate: f32);
}

/// Presentation layer for captions, prompts, menu and notices
pub trait UiPresenter: Send + Sync {
    fn set_text(&self, element: UiElement, text: &str);

    /// Make an element fully visible immediately
    fn reveal(&self, element: UiElement);

    /// Make an element invisible immediately
    fn conceal(&self, element: UiElement);

    /// Fade an element to invisible over `duration`
    fn fade_out(&self, element: UiElement, duration: Duration);

    fn set_frame(&self, element: UiElement, frame: Rect);

    /// Size `text` would occupy in `element` when constrained to `max`
    fn measure_text(&self, element: UiElement, text: &str, max: Size) -> Size;

    fn show_notice(&self, notice: &Notice);

    /// Render the selectable sign rows
    fn set_menu_rows(&self, rows: &[String]);
}

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    AttachModel(NodeId, Vec3),
    DetachModel(NodeId),
    SetPosition(NodeId, Vec3),
    PlayClip(NodeId, String),
    ClipWeight(NodeId, String, f32),
    ScaleBy(NodeId, f32, Duration),
    RotateTo(NodeId, Vec3, f32, Duration),
    Speak(String, f32),
    SetText(UiElement, String),
    Reveal(UiElement),
    Conceal(UiElement),
    FadeOut(UiElement, Duration),
    SetFrame(UiElement, Rect),
    Notice(Notice),
    MenuRows(Vec<String>),
}

/// Width of one glyph in the recorder's monospace text metric
pub const RECORDER_CHAR_WIDTH: f32 = 10.0;
/// Height of one line in the recorder's monospace text metric
pub const RECORDER_LINE_HEIGHT: f32 = 20.0;

/// Headless host that records every call
///
/// Cloning shares the underlying log, so one clone can be injected as all
/// three collaborators while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: HostCall) {
        log::debug!("host: {:?}", call);
        self.calls.lock().push(call);
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Drain the call log
    pub fn take(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Count calls matching a predicate
    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Every narration request, in order
    pub fn spoken(&self) -> Vec<(String, f32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                HostCall::Speak(text, rate) => Some((text.clone(), *rate)),
                _ => None,
            })
            .collect()
    }

    /// Every notice shown, in order
    pub fn notices(&self) -> Vec<Notice> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                HostCall::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last text set on an element
    pub fn text_of(&self, element: UiElement) -> Option<String> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            HostCall::SetText(e, text) if *e == element => Some(text.clone()),
            _ => None,
        })
    }

    /// Last frame assigned to an element
    pub fn frame_of(&self, element: UiElement) -> Option<Rect> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            HostCall::SetFrame(e, rect) if *e == element => Some(*rect),
            _ => None,
        })
    }

    /// Whether the last visibility call left `element` visible
    pub fn is_visible(&self, element: UiElement) -> bool {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                HostCall::Reveal(e) if *e == element => Some(true),
                HostCall::Conceal(e) | HostCall::FadeOut(e, _) if *e == element => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl SceneHost for Recorder {
    fn attach_model(&self, node: NodeId, position: Vec3) {
        self.record(HostCall::AttachModel(node, position));
    }

    fn detach_model(&self, node: NodeId) {
        self.record(HostCall::DetachModel(node));
    }

    fn set_position(&self, node: NodeId, position: Vec3) {
        self.record(HostCall::SetPosition(node, position));
    }

    fn play_clip(&self, node: NodeId, clip: &AnimationClip) {
        self.record(HostCall::PlayClip(node, clip.key.clone()));
    }

    fn set_clip_weight(&self, node: NodeId, key: &str, weight: f32) {
        self.record(HostCall::ClipWeight(node, key.to_string(), weight));
    }

    fn run_scale_action(&self, node: NodeId, factor: f32, duration: Duration) {
        self.record(HostCall::ScaleBy(node, factor, duration));
    }

    fn run_rotate_action(&self, node: NodeId, axis: Vec3, angle: f32, duration: Duration) {
        self.record(HostCall::RotateTo(node, axis, angle, duration));
    }
}

impl NarrationService for Recorder {
    fn speak(&self, text: &str, rate: f32) {
        self.record(HostCall::Speak(text.to_string(), rate));
    }
}

impl UiPresenter for Recorder {
    fn set_text(&self, element: UiElement, text: &str) {
        self.record(HostCall::SetText(element, text.to_string()));
    }

    fn reveal(&self, element: UiElement) {
        self.record(HostCall::Reveal(element));
    }

    fn conceal(&self, element: UiElement) {
        self.record(HostCall::Conceal(element));
    }

    fn fade_out(&self, element: UiElement, duration: Duration) {
        self.record(HostCall::FadeOut(element, duration));
    }

    fn set_frame(&self, element: UiElement, frame: Rect) {
        self.record(HostCall::SetFrame(element, frame));
    }

    fn measure_text(&self, _element: UiElement, text: &str, max: Size) -> Size {
        monospace_measure(text, max)
    }

    fn show_notice(&self, notice: &Notice) {
        self.record(HostCall::Notice(notice.clone()));
    }

    fn set_menu_rows(&self, rows: &[String]) {
        self.record(HostCall::MenuRows(rows.to_vec()));
    }
}

/// Fixed-pitch text metric with greedy character wrapping
pub fn monospace_measure(text: &str, max: Size) -> Size {
    let per_line = ((max.width / RECORDER_CHAR_WIDTH).floor() as usize).max(1);

    let mut lines = 0usize;
    let mut widest = 0usize;
    for line in text.split('\n') {
        let len = line.chars().count();
        lines += len.div_ceil(per_line).max(1);
        widest = widest.max(len.min(per_line));
    }

    Size::new(
        widest as f32 * RECORDER_CHAR_WIDTH,
        (lines as f32 * RECORDER_LINE_HEIGHT).min(max.height),
    )
}
