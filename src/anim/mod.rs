//! Animation clips for the hand model
//!
//! # Architecture
//!
//! - [`SceneAsset`] is the parsed scene description the clips are authored in
//! - [`AnimationLibrary`] indexes every clip found in it by key, with
//!   playback metadata normalised to play-once with fixed blends
//! - [`ClipPlayer`] tracks which clips are currently running on a model

pub mod library;
pub mod player;

pub use library::{
    AnimationClip, AnimationEntry, AnimationLibrary, ClipPolicy, SceneAsset, SceneNode, CLIP_BLEND,
};
pub use player::{ActiveClip, ClipPlayer, ClipState};
