//! Sign catalog
//!
//! An ordered list of sign records decoded once from a bundled JSON array.
//! Decoding is per entry: a malformed record is dropped and reported, the
//! rest of the catalog still loads.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// A catalog record pairing a gesture key with display/narration text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    /// Animation clip key
    pub key: String,
    /// Word shown in the caption and spoken aloud
    pub word: String,
    pub dialect: String,
    /// Explanatory caption text
    pub note: String,
    /// Display glyph (an emoji in the bundled data)
    #[serde(alias = "emoji")]
    pub glyph: String,
}

impl Sign {
    pub fn new(key: &str, word: &str, dialect: &str, note: &str, glyph: &str) -> Self {
        Self {
            key: key.to_string(),
            word: word.to_string(),
            dialect: dialect.to_string(),
            note: note.to_string(),
            glyph: glyph.to_string(),
        }
    }

    /// Row text for the selection menu
    pub fn menu_row(&self) -> String {
        format!("{} {}", self.glyph, self.word)
    }
}

/// Ordered, immutable set of signs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignCatalog {
    signs: Vec<Sign>,
}

/// Outcome of loading a catalog: whatever decoded, plus at most one problem
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: SignCatalog,
    pub problem: Option<AssetError>,
}

impl SignCatalog {
    pub fn new(signs: Vec<Sign>) -> Self {
        Self { signs }
    }

    /// Decode a JSON array of sign records
    ///
    /// Entries that fail to decode are skipped; their errors are folded into
    /// a single `Decode` problem so the user sees one notice.
    pub fn from_json(name: &str, json: &str) -> CatalogLoad {
        let entries: Vec<serde_json::Value> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                return CatalogLoad {
                    catalog: SignCatalog::default(),
                    problem: Some(AssetError::Decode {
                        name: name.to_string(),
                        detail: e.to_string(),
                    }),
                }
            }
        };

        let mut signs = Vec::with_capacity(entries.len());
        let mut failures = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Sign>(entry) {
                Ok(sign) => signs.push(sign),
                Err(e) => {
                    log::warn!("Skipping catalog entry {}: {}", index, e);
                    failures.push(format!("entry {}: {}", index, e));
                }
            }
        }

        let problem = if failures.is_empty() {
            None
        } else {
            Some(AssetError::Decode {
                name: name.to_string(),
                detail: failures.join("; "),
            })
        };

        log::info!("Loaded {} signs from {}", signs.len(), name);
        CatalogLoad {
            catalog: SignCatalog { signs },
            problem,
        }
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> CatalogLoad {
        let name = "Signs";
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(name, &json),
            Err(e) => {
                let problem = if e.kind() == io::ErrorKind::NotFound {
                    AssetError::Missing {
                        name: name.to_string(),
                        path: path.to_path_buf(),
                    }
                } else {
                    AssetError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    }
                };
                log::error!("{}", problem);
                CatalogLoad {
                    catalog: SignCatalog::default(),
                    problem: Some(problem),
                }
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Sign> {
        self.signs.get(index)
    }

    /// First sign with the given key
    pub fn find(&self, key: &str) -> Option<&Sign> {
        self.signs.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sign> {
        self.signs.iter()
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Menu rows in catalog order
    pub fn menu_rows(&self) -> Vec<String> {
        self.signs.iter().map(Sign::menu_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DATA: &str = r#"[
        {"key": "yes", "word": "Yes", "dialect": "ASL", "note": "Nod your head", "emoji": "✅"},
        {"key": "no", "word": "No", "dialect": "ASL", "note": "Snap two fingers to the thumb", "emoji": "🚫"}
    ]"#;

    #[test]
    fn test_from_json_keeps_order() {
        let load = SignCatalog::from_json("Signs", DATA);
        assert!(load.problem.is_none());
        assert_eq!(load.catalog.len(), 2);
        assert_eq!(load.catalog.get(0).unwrap().key, "yes");
        assert_eq!(load.catalog.get(1).unwrap().key, "no");
    }

    #[test]
    fn test_emoji_alias_maps_to_glyph() {
        let load = SignCatalog::from_json("Signs", DATA);
        assert_eq!(load.catalog.get(0).unwrap().glyph, "✅");
    }

    #[test]
    fn test_glyph_field_accepted() {
        let json = r#"[{"key": "k", "word": "W", "dialect": "ASL", "note": "n", "glyph": "G"}]"#;
        let load = SignCatalog::from_json("Signs", json);
        assert_eq!(load.catalog.get(0).unwrap().glyph, "G");
    }

    #[test]
    fn test_malformed_entry_is_skipped_and_reported() {
        let json = r#"[
            {"key": "yes", "word": "Yes", "dialect": "ASL", "note": "Nod", "emoji": "✅"},
            {"key": "broken"}
        ]"#;
        let load = SignCatalog::from_json("Signs", json);
        assert_eq!(load.catalog.len(), 1);

        let problem = load.problem.expect("decode failure reported");
        let text = problem.to_string();
        assert!(text.starts_with("Couldn't load data: entry 1:"));
        assert!(text.contains("word"));
    }

    #[test]
    fn test_not_an_array_yields_empty_catalog() {
        let load = SignCatalog::from_json("Signs", r#"{"key": "yes"}"#);
        assert!(load.catalog.is_empty());
        assert!(matches!(load.problem, Some(AssetError::Decode { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let load = SignCatalog::load(&dir.path().join("Data.json"));
        assert!(load.catalog.is_empty());
        let problem = load.problem.unwrap();
        assert!(matches!(problem, AssetError::Missing { .. }));
        assert_eq!(problem.to_string(), "Signs file not found");
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();

        let load = SignCatalog::load(file.path());
        assert!(load.problem.is_none());
        assert_eq!(load.catalog.len(), 2);
    }

    #[test]
    fn test_find_and_menu_rows() {
        let catalog = SignCatalog::from_json("Signs", DATA).catalog;
        assert_eq!(catalog.find("no").unwrap().word, "No");
        assert!(catalog.find("maybe").is_none());
        assert_eq!(catalog.menu_rows(), vec!["✅ Yes".to_string(), "🚫 No".to_string()]);
    }
}
