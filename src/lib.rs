// signhands library
// Session state, playback and gesture handling for AR sign demonstrations

pub mod anim;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dae;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod gesture;
pub mod host;
pub mod layout;
pub mod logging;
pub mod menu;
pub mod playback;
pub mod runtime;
pub mod session;

pub use anim::{AnimationClip, AnimationLibrary, ClipPlayer};
pub use catalog::{Sign, SignCatalog};
pub use cli::Cli;
pub use config::Options;
pub use error::AssetError;
pub use feedback::TimedFeedbackScheduler;
pub use gesture::{GestureAccumulator, GesturePhase};
pub use host::{NarrationService, Notice, Recorder, SceneHost, UiElement, UiPresenter};
pub use logging::LogLevel;
pub use playback::{PlayOutcome, PlaybackController};
pub use runtime::{Assets, Collaborators, Runtime, RuntimeSettings};
pub use session::{AnchorEvent, SessionPhase, SessionStateMachine};
