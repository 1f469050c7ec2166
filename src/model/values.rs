use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::fields::{
    fields_of, Cardinality, FieldDefault, FieldDescriptor, FieldGroup, FieldId, FieldScope,
    DEFAULT_ASPECT_RATIO, SCENE_DNA_GROUPS, SHOT_GROUPS,
};

/// A stored field value. Single-select fields hold `Text`, everything else holds `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            FieldValue::List(items) => items,
            FieldValue::Text(_) => &[],
        }
    }

    /// Coerces the value into the shape the descriptor declares.
    pub fn normalize_for(self, descriptor: &FieldDescriptor) -> FieldValue {
        match (descriptor.cardinality(), self) {
            (Cardinality::Single, FieldValue::Text(text)) => FieldValue::Text(text),
            (Cardinality::Single, FieldValue::List(items)) => FieldValue::Text(
                items
                    .into_iter()
                    .find(|item| !item.trim().is_empty())
                    .unwrap_or_default(),
            ),
            (Cardinality::Multiple, FieldValue::Text(text)) => {
                if text.trim().is_empty() {
                    FieldValue::List(Vec::new())
                } else {
                    FieldValue::List(vec![text])
                }
            }
            (Cardinality::Multiple, FieldValue::List(items)) => FieldValue::List(
                items
                    .into_iter()
                    .filter(|item| !item.trim().is_empty())
                    .collect(),
            ),
        }
    }

    fn from_default(default: FieldDefault) -> FieldValue {
        match default {
            FieldDefault::Text(text) => FieldValue::Text(text.to_string()),
            FieldDefault::List(items) => {
                FieldValue::List(items.iter().map(|item| item.to_string()).collect())
            }
        }
    }
}

/// Typed field map. Every stored value already matches its descriptor's cardinality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<FieldId, FieldValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults_for(groups: &[FieldGroup]) -> Self {
        let mut values = Self::new();
        for field in fields_of(groups) {
            values
                .0
                .insert(field.id, FieldValue::from_default(field.default));
        }
        values
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldValue> {
        self.0.get(&id)
    }

    pub fn text(&self, id: FieldId) -> Option<&str> {
        self.get(id).and_then(FieldValue::as_text)
    }

    pub fn list(&self, id: FieldId) -> &[String] {
        self.get(id).map(FieldValue::as_list).unwrap_or(&[])
    }

    pub fn set(&mut self, id: FieldId, value: FieldValue) {
        let normalized = value.normalize_for(id.descriptor());
        self.0.insert(id, normalized);
    }

    pub fn set_text(&mut self, id: FieldId, text: impl Into<String>) {
        self.set(id, FieldValue::Text(text.into()));
    }

    pub fn set_list<I, S>(&mut self, id: FieldId, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(id, FieldValue::List(items.into_iter().map(Into::into).collect()));
    }

    /// Appends to a multiple-cardinality field, or replaces a single one.
    pub fn push(&mut self, id: FieldId, item: impl Into<String>) {
        let item = item.into();
        match id.descriptor().cardinality() {
            Cardinality::Single => self.set_text(id, item),
            Cardinality::Multiple => {
                let mut items = self.list(id).to_vec();
                items.push(item);
                self.set(id, FieldValue::List(items));
            }
        }
    }

    pub fn remove(&mut self, id: FieldId) -> Option<FieldValue> {
        self.0.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldValue)> {
        self.0.iter().map(|(id, value)| (*id, value))
    }

    /// Overlays every entry of `other` on top of `self`.
    pub fn merge(&mut self, other: &FieldValues) {
        for (id, value) in other.iter() {
            self.0.insert(id, value.clone());
        }
    }

    fn retain_scope(&mut self, scope: FieldScope) {
        self.0.retain(|id, _| id.scope() == scope);
    }
}

/// Loosely-typed persisted value; anything that is neither a string nor a list of strings
/// is dropped during normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Text(String),
    List(Vec<serde_json::Value>),
    #[allow(dead_code)]
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for FieldValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, LooseValue>::deserialize(deserializer)?;
        let mut values = FieldValues::new();
        for (key, loose) in raw {
            let Some(id) = FieldId::parse(&key) else {
                tracing::debug!(field = %key, "Dropping unknown field from stored data");
                continue;
            };
            let value = match loose {
                LooseValue::Text(text) => FieldValue::Text(text),
                LooseValue::List(items) => FieldValue::List(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                ),
                LooseValue::Other(_) => {
                    tracing::debug!(field = %id, "Dropping malformed value from stored data");
                    continue;
                }
            };
            values.set(id, value);
        }
        Ok(values)
    }
}

/// Scene-wide attributes shared by every shot of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SceneDna {
    values: FieldValues,
}

impl Default for SceneDna {
    fn default() -> Self {
        Self::with_aspect_ratio(DEFAULT_ASPECT_RATIO)
    }
}

impl SceneDna {
    pub fn with_aspect_ratio(aspect_ratio: &str) -> Self {
        let mut values = FieldValues::defaults_for(SCENE_DNA_GROUPS);
        values.set_text(FieldId::AspectRatio, aspect_ratio);
        Self { values }
    }

    /// Builds DNA from arbitrary values: shot fields are dropped, defaults fill the gaps.
    pub fn from_values(values: FieldValues) -> Self {
        let mut dna = Self::default();
        dna.apply(values);
        dna.ensure_invariants(DEFAULT_ASPECT_RATIO);
        dna
    }

    /// Overlays `values` (scene fields only) on the current DNA. A blank aspect ratio is kept
    /// as given; the owner fills it with its own fallback via [`Self::ensure_invariants`].
    pub fn apply(&mut self, mut values: FieldValues) {
        values.retain_scope(FieldScope::Scene);
        self.values.merge(&values);
    }

    /// Blank aspect ratios fall back to `fallback`; key elements always exist.
    pub fn ensure_invariants(&mut self, fallback_aspect_ratio: &str) {
        if self.aspect_ratio().is_none() {
            self.values
                .set_text(FieldId::AspectRatio, fallback_aspect_ratio);
        }
        if self.values.get(FieldId::KeyElements).is_none() {
            self.values
                .set(FieldId::KeyElements, FieldValue::List(Vec::new()));
        }
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn set(&mut self, id: FieldId, value: FieldValue) {
        if id.scope() == FieldScope::Scene {
            self.values.set(id, value);
        }
    }

    pub fn aspect_ratio(&self) -> Option<&str> {
        self.values
            .text(FieldId::AspectRatio)
            .map(str::trim)
            .filter(|ratio| !ratio.is_empty())
    }

    pub fn era(&self) -> Option<&str> {
        self.values
            .text(FieldId::Era)
            .map(str::trim)
            .filter(|era| !era.is_empty())
    }

    pub fn key_elements(&self) -> &[String] {
        self.values.list(FieldId::KeyElements)
    }
}

impl<'de> Deserialize<'de> for SceneDna {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FieldValues::deserialize(deserializer).map(SceneDna::from_values)
    }
}

/// Fields unique to one shot plus its optional creative concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotData {
    #[serde(flatten)]
    values: FieldValues,
    #[serde(
        default,
        rename = "selectedCreativeConceptId",
        skip_serializing_if = "Option::is_none"
    )]
    concept_id: Option<String>,
}

impl Default for ShotData {
    fn default() -> Self {
        Self {
            values: FieldValues::defaults_for(SHOT_GROUPS),
            concept_id: None,
        }
    }
}

impl ShotData {
    pub fn from_values(mut values: FieldValues) -> Self {
        values.retain_scope(FieldScope::Shot);
        let mut data = Self::default();
        data.values.merge(&values);
        data
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn set(&mut self, id: FieldId, value: FieldValue) {
        if id.scope() == FieldScope::Shot {
            self.values.set(id, value);
        }
    }

    pub fn subject(&self) -> &[String] {
        self.values.list(FieldId::Subject)
    }

    pub fn concept_id(&self) -> Option<&str> {
        self.concept_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn set_concept(&mut self, concept_id: Option<String>) {
        self.concept_id = concept_id;
    }

    pub fn with_concept(mut self, concept_id: impl Into<String>) -> Self {
        self.concept_id = Some(concept_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_lifted_into_list_fields() {
        let mut values = FieldValues::new();
        values.set(FieldId::Subject, FieldValue::Text("A scholar".into()));
        assert_eq!(values.list(FieldId::Subject), ["A scholar".to_string()]);
    }

    #[test]
    fn list_is_collapsed_for_single_fields() {
        let mut values = FieldValues::new();
        values.set(
            FieldId::Mood,
            FieldValue::List(vec!["".into(), "mysterious".into(), "triumphant".into()]),
        );
        assert_eq!(values.text(FieldId::Mood), Some("mysterious"));
    }

    #[test]
    fn default_dna_has_aspect_ratio_and_key_elements() {
        let dna = SceneDna::default();
        assert_eq!(dna.aspect_ratio(), Some("16:9"));
        assert!(dna.key_elements().is_empty());
        assert!(dna.values().get(FieldId::KeyElements).is_some());
    }

    #[test]
    fn dna_ignores_shot_fields() {
        let mut values = FieldValues::new();
        values.set_text(FieldId::Lens, "macro_lens");
        values.set_text(FieldId::Era, "edo_japan");
        let dna = SceneDna::from_values(values);
        assert!(dna.values().get(FieldId::Lens).is_none());
        assert_eq!(dna.era(), Some("edo_japan"));
    }

    #[test]
    fn deserializes_loose_json_once() {
        let json = r#"{
            "era": "edo_japan",
            "keyElements": "A lone samurai.",
            "inspiration": ["Hokusai", 42],
            "mood": 7,
            "unknownField": "ignored",
            "aspectRatio": ""
        }"#;
        let dna: SceneDna = serde_json::from_str(json).expect("dna parses");
        assert_eq!(dna.key_elements(), ["A lone samurai.".to_string()]);
        assert_eq!(
            dna.values().list(FieldId::Inspiration),
            ["Hokusai".to_string()]
        );
        assert_eq!(dna.values().text(FieldId::Mood), Some(""));
        assert_eq!(dna.aspect_ratio(), Some("16:9"));
    }

    #[test]
    fn apply_leaves_blank_aspect_ratio_for_the_owner() {
        let mut dna = SceneDna::with_aspect_ratio("4:3");
        let mut values = FieldValues::new();
        values.set_text(FieldId::AspectRatio, " ");
        dna.apply(values);
        assert_eq!(dna.aspect_ratio(), None);

        dna.ensure_invariants("9:16");
        assert_eq!(dna.aspect_ratio(), Some("9:16"));
    }

    #[test]
    fn shot_data_round_trips_concept_id() {
        let json = r#"{"subject": ["A merchant"], "lens": "50mm_prime", "selectedCreativeConceptId": "object_pov"}"#;
        let shot: ShotData = serde_json::from_str(json).expect("shot parses");
        assert_eq!(shot.subject(), ["A merchant".to_string()]);
        assert_eq!(shot.concept_id(), Some("object_pov"));

        let encoded = serde_json::to_value(&shot).expect("shot encodes");
        assert_eq!(encoded["selectedCreativeConceptId"], "object_pov");
        assert_eq!(encoded["lens"], "50mm_prime");
    }
}
