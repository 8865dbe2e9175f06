//! Animation library
//!
//! Built once from a scene asset. Every descendant node of the scene root
//! contributes its animation entries; each is normalised and indexed by key.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AssetError, AssetResult};

/// Blend-in and blend-out applied to every clip
pub const CLIP_BLEND: Duration = Duration::from_millis(500);

/// A clip as authored in the scene asset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationEntry {
    pub key: String,
    /// Length of one cycle in seconds
    pub duration: f32,
    #[serde(default)]
    pub repeat_count: Option<f32>,
    #[serde(default)]
    pub blend_in: Option<f32>,
    #[serde(default)]
    pub blend_out: Option<f32>,
    #[serde(default)]
    pub removed_on_completion: Option<bool>,
}

/// A node of the scene description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Visit every descendant depth-first, pre-order. The node itself is not visited.
    pub fn for_each_descendant<'a>(&'a self, visit: &mut dyn FnMut(&'a SceneNode)) {
        for child in &self.children {
            visit(child);
            child.for_each_descendant(visit);
        }
    }
}

/// Parsed scene description holding the authored clips
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneAsset {
    pub root: SceneNode,
}

impl SceneAsset {
    pub fn from_json(name: &str, json: &str) -> AssetResult<Self> {
        serde_json::from_str(json).map_err(|e| AssetError::Decode {
            name: name.to_string(),
            detail: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> AssetResult<Self> {
        let name = "Animations";
        let json = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AssetError::Missing {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                }
            } else {
                AssetError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_json(name, &json)
    }
}

/// Playback metadata forced onto every clip at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPolicy {
    pub repeat_count: u32,
    pub blend_in: Duration,
    pub blend_out: Duration,
    pub removed_on_completion: bool,
}

impl Default for ClipPolicy {
    fn default() -> Self {
        Self {
            repeat_count: 1,
            blend_in: CLIP_BLEND,
            blend_out: CLIP_BLEND,
            removed_on_completion: true,
        }
    }
}

impl ClipPolicy {
    /// Policy with both blends set to `blend`
    pub fn with_blend(blend: Duration) -> Self {
        Self {
            blend_in: blend,
            blend_out: blend,
            ..Default::default()
        }
    }
}

/// A loaded, normalised animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub key: String,
    /// Name of the scene node the clip was found on
    pub source_node: String,
    /// Length of one cycle
    pub duration: Duration,
    pub repeat_count: u32,
    pub blend_in: Duration,
    pub blend_out: Duration,
    pub removed_on_completion: bool,
}

impl AnimationClip {
    fn from_entry(entry: &AnimationEntry, node: &str, policy: &ClipPolicy) -> Self {
        let duration = Duration::try_from_secs_f32(entry.duration).unwrap_or_else(|_| {
            log::warn!(
                "Clip '{}' on '{}' has invalid duration {}; using zero",
                entry.key,
                node,
                entry.duration
            );
            Duration::ZERO
        });

        Self {
            key: entry.key.clone(),
            source_node: node.to_string(),
            duration,
            repeat_count: policy.repeat_count,
            blend_in: policy.blend_in,
            blend_out: policy.blend_out,
            removed_on_completion: policy.removed_on_completion,
        }
    }

    /// Total play time across all repeats
    pub fn total_length(&self) -> Duration {
        self.duration * self.repeat_count
    }
}

/// Key-indexed set of clips
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    clips: HashMap<String, Arc<AnimationClip>>,
}

impl AnimationLibrary {
    /// An empty library: every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index every clip in the asset using the default policy
    pub fn load(asset: &SceneAsset) -> Self {
        Self::load_with(asset, &ClipPolicy::default())
    }

    /// Index every clip in the asset, normalising with `policy`
    ///
    /// Duplicate keys resolve last-write-wins in traversal order. The
    /// earlier clip is silently lost apart from a warning.
    pub fn load_with(asset: &SceneAsset, policy: &ClipPolicy) -> Self {
        let mut clips: HashMap<String, Arc<AnimationClip>> = HashMap::new();

        asset.root.for_each_descendant(&mut |node| {
            for entry in &node.animations {
                let clip = AnimationClip::from_entry(entry, &node.name, policy);
                if let Some(previous) = clips.insert(clip.key.clone(), Arc::new(clip)) {
                    log::warn!(
                        "Animation key '{}' from '{}' replaced by node '{}'",
                        previous.key,
                        previous.source_node,
                        node.name
                    );
                }
            }
        });

        log::info!("Loaded {} animations", clips.len());
        Self { clips }
    }

    /// Clip for `key`, or `None` if the library has no such clip
    pub fn lookup(&self, key: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.clips.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
