//! AR session state machine
//!
//! Tracks surface acquisition and owns the anchored hand model. Transitions
//! are pure: handling an anchor event returns the new phase together with
//! the scene and UI effects the caller must execute on the UI thread.

use std::time::Duration;

use glam::{Mat4, Vec3};

use crate::anim::ClipPlayer;
use crate::host::{NodeId, UiElement};

/// Delay before the gesture hint fades once the model is placed
pub const GESTURE_HINT_DELAY: Duration = Duration::from_secs(7);

pub const SEARCHING_PROMPT: &str = "Move around\nto find surface";
pub const CONFIRM_PROMPT: &str = "Tap to confirm\nsurface";
pub const GESTURE_HINT: &str = "Pinch and pan to\nrotate and scale the hands";

/// Stage of AR session acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    SearchingPlane,
    /// A candidate surface awaiting confirmation. No tracking event leads
    /// here yet; the variant exists so the UI contract is complete.
    PlaneFound,
    Ready,
}

/// Notification from the tracking subsystem
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorEvent {
    Added(Mat4),
    Updated(Mat4),
    Removed,
}

/// World-space translation of an anchor transform
pub fn anchor_position(transform: &Mat4) -> Vec3 {
    transform.w_axis.truncate()
}

/// The hand model placed on the tracked anchor
#[derive(Debug)]
pub struct AnchoredModel {
    pub node: NodeId,
    pub position: Vec3,
    /// Clips currently running on the model
    pub clips: ClipPlayer,
}

/// Work the UI thread performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AttachModel { node: NodeId, position: Vec3 },
    DetachModel { node: NodeId },
    SetPosition { node: NodeId, position: Vec3 },
    SetText { element: UiElement, text: &'static str },
    Reveal(UiElement),
    /// Make invisible immediately, dropping any pending hide
    Conceal(UiElement),
    /// Fade out after a delay via the feedback scheduler
    HideAfter { element: UiElement, delay: Duration },
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Owns the session phase and the anchored model
#[derive(Debug)]
pub struct SessionStateMachine {
    phase: SessionPhase,
    model: Option<AnchoredModel>,
    next_node: NodeId,
    hint_delay: Duration,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::with_hint_delay(GESTURE_HINT_DELAY)
    }

    pub fn with_hint_delay(hint_delay: Duration) -> Self {
        Self {
            phase: SessionPhase::SearchingPlane,
            model: None,
            next_node: 1,
            hint_delay,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn model(&self) -> Option<&AnchoredModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut AnchoredModel> {
        self.model.as_mut()
    }

    /// UI effects of entering the current phase, for initial presentation
    pub fn enter_effects(&self) -> Vec<Effect> {
        self.phase_effects(self.phase)
    }

    /// Apply an anchor event. Must be called on the UI-owning thread.
    pub fn handle(&mut self, event: AnchorEvent) -> Transition {
        let from = self.phase;
        let mut effects = Vec::new();

        match event {
            AnchorEvent::Added(transform) => {
                if self.phase != SessionPhase::SearchingPlane {
                    log::debug!("Ignoring anchor add while {:?}", self.phase);
                    return Transition { from, to: from, effects };
                }

                let node = self.next_node;
                self.next_node += 1;
                let position = anchor_position(&transform);
                self.model = Some(AnchoredModel {
                    node,
                    position,
                    clips: ClipPlayer::new(),
                });
                log::info!("Placed hand model {} at {}", node, position);

                effects.push(Effect::AttachModel { node, position });
                self.phase = SessionPhase::Ready;
                effects.extend(self.phase_effects(SessionPhase::Ready));
            }
            AnchorEvent::Updated(transform) => {
                if let Some(model) = self.model.as_mut() {
                    model.position = anchor_position(&transform);
                    effects.push(Effect::SetPosition {
                        node: model.node,
                        position: model.position,
                    });
                }
            }
            AnchorEvent::Removed => {
                if let Some(model) = self.model.take() {
                    log::info!("Anchor lost, detaching hand model {}", model.node);
                    effects.push(Effect::DetachModel { node: model.node });
                }
                self.phase = SessionPhase::SearchingPlane;
                effects.extend(self.phase_effects(SessionPhase::SearchingPlane));
            }
        }

        Transition {
            from,
            to: self.phase,
            effects,
        }
    }

    fn phase_effects(&self, phase: SessionPhase) -> Vec<Effect> {
        match phase {
            SessionPhase::SearchingPlane => vec![
                Effect::SetText {
                    element: UiElement::SurfacePrompt,
                    text: SEARCHING_PROMPT,
                },
                Effect::Reveal(UiElement::SurfacePrompt),
                Effect::Conceal(UiElement::GestureHint),
                Effect::Conceal(UiElement::MenuButton),
                Effect::Conceal(UiElement::Menu),
            ],
            SessionPhase::PlaneFound => vec![
                Effect::SetText {
                    element: UiElement::SurfacePrompt,
                    text: CONFIRM_PROMPT,
                },
                Effect::Reveal(UiElement::SurfacePrompt),
            ],
            SessionPhase::Ready => vec![
                Effect::HideAfter {
                    element: UiElement::SurfacePrompt,
                    delay: Duration::ZERO,
                },
                Effect::SetText {
                    element: UiElement::GestureHint,
                    text: GESTURE_HINT,
                },
                Effect::Reveal(UiElement::GestureHint),
                Effect::Reveal(UiElement::MenuButton),
                Effect::HideAfter {
                    element: UiElement::GestureHint,
                    delay: self.hint_delay,
                },
            ],
        }
    }
}
