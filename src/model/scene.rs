use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::fields::FieldId;
use super::values::{FieldValues, SceneDna, ShotData};

/// Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub id: String,
    pub scene_id: String,
    pub shot_specific_data: ShotData,
    /// Cached serializer output for (scene DNA, shot data) at `timestamp`.
    pub generated_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub title: String,
    pub dna: SceneDna,
    #[serde(default)]
    pub storyboard: Vec<Shot>,
    pub timestamp: i64,
}

impl Scene {
    pub fn new(title: impl Into<String>, dna: SceneDna) -> Self {
        Self {
            id: new_id("scene"),
            title: title.into(),
            dna,
            storyboard: Vec::new(),
            timestamp: now_millis(),
        }
    }

    pub fn shot(&self, shot_id: &str) -> Option<&Shot> {
        self.storyboard.iter().find(|shot| shot.id == shot_id)
    }

    pub fn shot_mut(&mut self, shot_id: &str) -> Option<&mut Shot> {
        self.storyboard.iter_mut().find(|shot| shot.id == shot_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTemplate {
    pub id: String,
    pub name: String,
    pub scene_title: String,
    pub scene_dna: SceneDna,
    #[serde(default)]
    pub is_user_defined: bool,
}

/// Built-in templates, re-seeded on every start and never persisted.
pub fn builtin_templates() -> Vec<SceneTemplate> {
    let mut bazaar = FieldValues::new();
    bazaar.set_text(FieldId::AspectRatio, "16:9");
    bazaar.set_text(FieldId::Era, "abbasid");
    bazaar.set_text(FieldId::Location, "house_of_wisdom");
    bazaar.set_text(FieldId::TimeOfDay, "golden_hour");
    bazaar.set_text(FieldId::Mood, "bustling_market");
    bazaar.set_text(FieldId::Lighting, "cinematic_lighting");
    bazaar.set_text(FieldId::Palette, "rich_jewel_tones");
    bazaar.set_text(FieldId::ArtisticStyle, "orientalist_oil_painting");
    bazaar.set_list(FieldId::Inspiration, ["1001 Nights illustrations"]);
    bazaar.set_list(
        FieldId::NegativePrompt,
        ["text, watermarks, modern clothing"],
    );

    let mut meditation = FieldValues::new();
    meditation.set_text(FieldId::AspectRatio, "21:9");
    meditation.set_text(FieldId::Era, "edo_japan");
    meditation.set_text(FieldId::Location, "serene_temple_garden");
    meditation.set_text(FieldId::TimeOfDay, "spring_morning");
    meditation.set_text(FieldId::Mood, "peaceful_serene");
    meditation.set_text(FieldId::ArtisticStyle, "ukiyo_e_woodblock");
    meditation.set_text(FieldId::Weather, "clear_sky_cherry_blossoms_falling");
    meditation.set_list(
        FieldId::NegativePrompt,
        ["people in background, modern structures"],
    );

    vec![
        SceneTemplate {
            id: "template-scene-1".to_string(),
            name: "Baghdad Golden Hour Bazaar Scene".to_string(),
            scene_title: "Baghdad Bazaar at Golden Hour".to_string(),
            scene_dna: SceneDna::from_values(bazaar),
            is_user_defined: false,
        },
        SceneTemplate {
            id: "template-scene-2".to_string(),
            name: "Feudal Japan Cherry Blossom Scene".to_string(),
            scene_title: "Samurai Meditation in Spring".to_string(),
            scene_dna: SceneDna::from_values(meditation),
            is_user_defined: false,
        },
    ]
}
