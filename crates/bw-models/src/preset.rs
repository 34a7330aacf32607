//! Preset registry entries.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of the registry object in the media bucket.
pub const PRESETS_OBJECT: &str = "presets.json";

/// A pre-generated city card shown on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
}

impl Preset {
    /// Copy with new display metadata, keeping the generated media URLs.
    pub fn with_metadata(&self, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..self.clone()
        }
    }
}

/// Merge `updates` into `existing`, overwriting by `id`.
///
/// Entries not touched by the update are preserved. Replaced entries keep
/// their slot; new ids are appended in update order. When `updates` repeats
/// an id the last occurrence wins.
pub fn merge_presets(existing: Vec<Preset>, updates: Vec<Preset>) -> Vec<Preset> {
    let mut merged = existing;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect();

    for preset in updates {
        match index.get(&preset.id) {
            Some(&i) => merged[i] = preset,
            None => {
                index.insert(preset.id.clone(), merged.len());
                merged.push(preset);
            }
        }
    }

    merged
}

/// Served when the registry object cannot be read.
pub fn fallback_presets() -> Vec<Preset> {
    vec![Preset {
        id: "ft_collins".to_string(),
        name: "Fort Collins, CO".to_string(),
        category: String::new(),
        image_url: "https://storage.googleapis.com/generative-bazaar-001-banana-weather/image_1764375772967339950.png".to_string(),
        video_url: "https://storage.googleapis.com/generative-bazaar-001-banana-weather/videos/535901273950979597/sample_0.mp4".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: &str, name: &str) -> Preset {
        Preset {
            id: id.to_string(),
            name: name.to_string(),
            category: "General".to_string(),
            image_url: format!("https://img/{}.png", id),
            video_url: format!("https://vid/{}.mp4", id),
        }
    }

    #[test]
    fn test_merge_overwrites_by_id() {
        let existing = vec![preset("paris", "Paris"), preset("tokyo", "Tokyo")];
        let updates = vec![preset("tokyo", "Tokyo, Japan")];

        let merged = merge_presets(existing, updates);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].name, "Tokyo, Japan");
        assert_eq!(merged[0].name, "Paris");
    }

    #[test]
    fn test_merge_preserves_untouched_and_appends_new() {
        let existing = vec![preset("paris", "Paris")];
        let updates = vec![preset("oslo", "Oslo"), preset("lima", "Lima")];

        let merged = merge_presets(existing, updates);
        let ids: Vec<_> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["paris", "oslo", "lima"]);
    }

    #[test]
    fn test_merge_duplicate_updates_last_wins() {
        let merged = merge_presets(
            Vec::new(),
            vec![preset("oslo", "first"), preset("oslo", "second")],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "second");
    }

    #[test]
    fn test_with_metadata_keeps_urls() {
        let original = preset("paris", "Paris");
        let patched = original.with_metadata("Paris, France", "Europe");

        assert_eq!(patched.name, "Paris, France");
        assert_eq!(patched.category, "Europe");
        assert_eq!(patched.image_url, original.image_url);
        assert_eq!(patched.video_url, original.video_url);
    }

    #[test]
    fn test_registry_json_shape() {
        let json = r#"[{"id":"a","name":"A","category":"C","image_url":"i","video_url":"v"},{"id":"b","name":"B"}]"#;
        let presets: Vec<Preset> = serde_json::from_str(json).unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[1].video_url, "");
    }

    #[test]
    fn test_fallback_is_not_empty() {
        let presets = fallback_presets();
        assert_eq!(presets[0].id, "ft_collins");
    }
}
