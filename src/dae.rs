//! COLLADA animation flattener
//!
//! Exporters often wrap every channel in its own `<animation>` element, which
//! scene loaders then expose as separate clips. Collapsing them into the single
//! outermost element makes the whole file play as one clip.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

const OPEN_TAG: &str = "<animation";
const CLOSE_TAG: &str = "</animation>";

/// Remove every nested `<animation>` wrapper, keeping the outermost pair
///
/// The first opening tag and the last closing tag are held back by position,
/// every other `<animation...>` or `</animation...>` tag is dropped.
pub fn flatten_animations(text: &str) -> Result<String> {
    let open = Regex::new(r"<animation(.*?)>").context("Invalid opening tag pattern")?;
    let close = Regex::new(r"</animation(.*?)>").context("Invalid closing tag pattern")?;
    let strip = |segment: &str| -> String {
        let segment = open.replace_all(segment, "");
        close.replace_all(&segment, "").into_owned()
    };

    let start = text.find(OPEN_TAG);
    let end = text
        .rfind(CLOSE_TAG)
        .filter(|&end| start.map_or(true, |start| end > start));

    let mut flattened = String::with_capacity(text.len());
    let mut rest = 0;
    if let Some(start) = start {
        flattened.push_str(&strip(&text[..start]));
        flattened.push_str(OPEN_TAG);
        rest = start + OPEN_TAG.len();
    }
    if let Some(end) = end {
        flattened.push_str(&strip(&text[rest..end]));
        flattened.push_str(CLOSE_TAG);
        rest = end + CLOSE_TAG.len();
    }
    flattened.push_str(&strip(&text[rest..]));
    Ok(flattened)
}

/// Path the untouched original is kept at
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push("-o");
    PathBuf::from(name)
}

/// Flatten a file in place, keeping the original as `<path>-o`
///
/// Returns the backup path.
pub fn flatten_file(path: &Path) -> Result<PathBuf> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let flattened = flatten_animations(&text)?;

    let backup = backup_path(path);
    fs::rename(path, &backup)
        .with_context(|| format!("Failed to move {} to {}", path.display(), backup.display()))?;
    fs::write(path, flattened).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Flattened {} (original kept at {})", path.display(), backup.display());
    Ok(backup)
}
