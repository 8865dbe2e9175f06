//! Pinch/pan gesture accumulation
//!
//! Gesture callbacks and render ticks run at unrelated cadences. Callbacks
//! only overwrite the target held here; the frame loop reads it once per
//! tick. A pinch factor is consumed by the tick that applies it, while the
//! pan rotation is an absolute target re-applied every tick.

use std::f32::consts::PI;
use std::time::Duration;

use glam::Vec3;

/// Tween length of the per-frame scale and rotate actions
pub const GESTURE_SMOOTHING: Duration = Duration::from_millis(100);

/// Lifecycle phase reported by a continuous gesture recogniser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_active(self) -> bool {
        matches!(self, GesturePhase::Began | GesturePhase::Changed)
    }
}

/// Target transform produced by gestures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTransform {
    /// Relative scale factor still to be applied
    pub scale: f32,
    pub rotation_axis: Vec3,
    /// Radians
    pub rotation_angle: f32,
}

impl Default for GestureTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_axis: Vec3::ZERO,
            rotation_angle: 0.0,
        }
    }
}

/// Actions the frame loop should run on the model this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameActions {
    /// Scale-by factor, `None` when no pinch arrived since the last tick
    pub scale_by: Option<f32>,
    /// Absolute axis/angle to rotate to
    pub rotate_to: (Vec3, f32),
}

/// Convert a pan translation into a yaw target
///
/// The angle is the translation length in degrees converted to radians. The
/// axis reuses the x translation as its y component and is left unnormalised.
pub fn pan_rotation(dx: f32, dy: f32) -> (Vec3, f32) {
    let y = -dy;
    let angle = (dx * dx + y * y).sqrt() * PI / 180.0;
    (Vec3::new(0.0, dx, 0.0), angle)
}

/// Holds the latest gesture targets
#[derive(Debug, Clone, Default)]
pub struct GestureAccumulator {
    target: GestureTransform,
}

impl GestureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a pinch sample
    ///
    /// `scale` is relative to the previous sample (the recogniser is reset
    /// to 1.0 after each read). Returns `true` if the sample was taken, in
    /// which case the caller resets its recogniser.
    pub fn pinch(&mut self, phase: GesturePhase, scale: f32) -> bool {
        if !phase.is_active() || !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.target.scale = scale;
        true
    }

    /// Feed a pan translation in view coordinates (y grows downwards)
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (axis, angle) = pan_rotation(dx, dy);
        self.target.rotation_axis = axis;
        self.target.rotation_angle = angle;
    }

    /// Current target, without consuming anything
    pub fn current(&self) -> GestureTransform {
        self.target
    }

    /// Read the target for one frame, consuming the pending scale factor
    pub fn take_frame(&mut self) -> FrameActions {
        let scale = std::mem::replace(&mut self.target.scale, 1.0);
        FrameActions {
            scale_by: (scale != 1.0).then_some(scale),
            rotate_to: (self.target.rotation_axis, self.target.rotation_angle),
        }
    }

    /// Forget all targets (model detached)
    pub fn reset(&mut self) {
        self.target = GestureTransform::default();
    }
}
