use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::anim::{ClipPolicy, CLIP_BLEND};
use crate::feedback::HIDE_FADE;
use crate::gesture::GESTURE_SMOOTHING;
use crate::layout::Size;
use crate::logging::LogLevel;
use crate::playback::{PlaybackSettings, CAPTION_HIDE_DELAY, NARRATION_RATE};
use crate::runtime::RuntimeSettings;
use crate::session::GESTURE_HINT_DELAY;

/// Name of the optional user config file inside the config directory
pub const CONFIG_FILE: &str = "signhands.cfg";

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub log_file: Option<String>,
    pub config_dir: Option<String>,

    // Commandline and user config options
    pub resolution: Resolution,
    pub catalog_path: PathBuf,
    pub scene_path: PathBuf,
    pub log_level: LogLevel,

    // User config options
    pub narration_rate: f32,
    pub caption_delay: Duration,
    pub hint_delay: Duration,
    pub fade: Duration,
    pub clip_blend: Duration,
    pub gesture_smoothing: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_file: None,
            config_dir: None,
            resolution: Resolution {
                width: 640,
                height: 480,
            },
            catalog_path: PathBuf::from("Data.json"),
            scene_path: PathBuf::from("Animations.json"),
            log_level: LogLevel::Info,
            narration_rate: NARRATION_RATE,
            caption_delay: CAPTION_HIDE_DELAY,
            hint_delay: GESTURE_HINT_DELAY,
            fade: HIDE_FADE,
            clip_blend: CLIP_BLEND,
            gesture_smoothing: GESTURE_SMOOTHING,
        }
    }
}

impl Options {
    pub fn view_size(&self) -> Size {
        Size::new(self.resolution.width as f32, self.resolution.height as f32)
    }

    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            view: self.view_size(),
            hint_delay: self.hint_delay,
            hide_fade: self.fade,
            gesture_smoothing: self.gesture_smoothing,
            playback: PlaybackSettings {
                narration_rate: self.narration_rate,
                caption_delay: self.caption_delay,
            },
        }
    }

    pub fn clip_policy(&self) -> ClipPolicy {
        ClipPolicy::with_blend(self.clip_blend)
    }

    /// Apply one `key = value` setting. Unknown keys are reported, not fatal.
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "resolution" => self.resolution = parse_resolution(value)?,
            "catalog" => self.catalog_path = PathBuf::from(value),
            "scene" => self.scene_path = PathBuf::from(value),
            "loglevel" => self.log_level = LogLevel::parse(value)?,
            "narration_rate" => self.narration_rate = parse_rate(value)?,
            "caption_delay" => self.caption_delay = parse_seconds(value)?,
            "hint_delay" => self.hint_delay = parse_seconds(value)?,
            "fade" => self.fade = parse_seconds(value)?,
            "clip_blend" => self.clip_blend = parse_seconds(value)?,
            "gesture_smoothing" => self.gesture_smoothing = parse_seconds(value)?,
            _ => log::warn!("Unknown config key '{}' ignored", key),
        }
        Ok(())
    }
}

/// Load configuration from signhands.cfg
///
/// A missing file yields the defaults.
pub fn load_config(config_dir: &Option<String>) -> Result<Options> {
    let dir = Path::new(config_dir.as_deref().unwrap_or("."));
    let path = dir.join(CONFIG_FILE);
    let mut opts = Options {
        config_dir: config_dir.clone(),
        ..Options::default()
    };

    if !path.exists() {
        log::debug!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
        return Ok(opts);
    }

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    apply_config_text(&mut opts, &text)
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(opts)
}

/// Apply `key = value` lines; `#` starts a comment
pub fn apply_config_text(opts: &mut Options, text: &str) -> Result<()> {
    for (number, raw) in text.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Line {}: expected key = value, got '{}'", number + 1, line);
            continue;
        };
        opts.apply_setting(key.trim(), value.trim())
            .with_context(|| format!("line {}", number + 1))?;
    }
    Ok(())
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: u32 = parts[0].parse().context("Invalid width value")?;
    let height: u32 = parts[1].parse().context("Invalid height value")?;

    if width == 0 || height == 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Resolution { width, height })
}

/// Parse a non-negative number of seconds
pub fn parse_seconds(s: &str) -> Result<Duration> {
    let secs: f32 = s.parse().context("Invalid duration value")?;
    Duration::try_from_secs_f32(secs)
        .map_err(|_| anyhow::anyhow!("Duration must be a non-negative number of seconds"))
}

/// Parse a narration rate, relative to the default speaking rate
pub fn parse_rate(s: &str) -> Result<f32> {
    let rate: f32 = s.parse().context("Invalid narration rate")?;
    if !rate.is_finite() || rate <= 0.0 {
        anyhow::bail!("Narration rate must be positive");
    }
    Ok(rate)
}
