//! Prompt serialization: Scene DNA + shot fields → one prompt string.
//!
//! Each part (scene, then shot) walks its field groups in declaration order and emits
//! `"<Label>: <text>. "` per non-empty field. The aspect ratio is never inlined; it becomes
//! a trailing `--ar` suffix. Key elements and the active concept's snippet are folded into
//! the shot's subject segment. A final cleanup pass removes doubled periods and whitespace.

pub mod cleanup;

pub use cleanup::{cleanup_prompt, cleanup_prompt_with_steps};

use crate::concepts::{ConceptRegistry, CreativeConcept};
use crate::logging::{pipeline_logging_enabled, record_prompt_pipeline, PromptPipelineRecord};
use crate::model::fields::fields_of;
use crate::model::{
    validate_layouts, FieldDescriptor, FieldGroup, FieldId, FieldKind, FieldValue, FieldValues,
    LayoutError, SceneDna, ShotData, SCENE_DNA_GROUPS, SHOT_GROUPS,
};
use crate::options::OptionResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Scene,
    Shot,
}

/// Text folded into the shot subject segment.
struct SubjectInjection<'a> {
    key_elements: String,
    concept_snippet: Option<&'a str>,
}

impl<'a> SubjectInjection<'a> {
    fn new(dna: &SceneDna, concept: Option<&'a CreativeConcept>) -> Self {
        let elements: Vec<&str> = dna
            .key_elements()
            .iter()
            .map(String::as_str)
            .filter(|element| !element.trim().is_empty())
            .collect();
        let key_elements = if elements.is_empty() {
            String::new()
        } else {
            format!("{}.", elements.join(". "))
        };
        Self {
            key_elements,
            concept_snippet: concept.map(|concept| concept.prompt_snippet),
        }
    }

    fn none() -> Self {
        Self {
            key_elements: String::new(),
            concept_snippet: None,
        }
    }

    fn combine(&self, subject: &[String]) -> String {
        let mut text = subject.join(", ");
        for extra in [Some(self.key_elements.as_str()), self.concept_snippet]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|extra| !extra.is_empty())
        {
            if !text.trim().is_empty() {
                text.push_str(". ");
            }
            text.push_str(extra);
        }
        text
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PromptSerializer<'a> {
    scene_groups: &'a [FieldGroup],
    shot_groups: &'a [FieldGroup],
    resolver: OptionResolver<'a>,
}

impl<'a> PromptSerializer<'a> {
    /// Uses the builtin layouts, which `ConfigManager::load_from` checks at startup.
    pub fn new(resolver: OptionResolver<'a>) -> Self {
        Self {
            scene_groups: SCENE_DNA_GROUPS,
            shot_groups: SHOT_GROUPS,
            resolver,
        }
    }

    pub fn with_groups(
        scene_groups: &'a [FieldGroup],
        shot_groups: &'a [FieldGroup],
        resolver: OptionResolver<'a>,
    ) -> Result<Self, LayoutError> {
        validate_layouts(scene_groups, shot_groups)?;
        Ok(Self {
            scene_groups,
            shot_groups,
            resolver,
        })
    }

    pub fn serialize(
        &self,
        dna: &SceneDna,
        shot: &ShotData,
        concept: Option<&CreativeConcept>,
    ) -> String {
        let scene_part = self
            .render_part(dna.values(), self.scene_groups, Part::Scene, &SubjectInjection::none())
            .trim()
            .to_string();
        let injection = SubjectInjection::new(dna, concept);
        let shot_part = self
            .render_part(shot.values(), self.shot_groups, Part::Shot, &injection)
            .trim()
            .to_string();

        let body = [scene_part.as_str(), shot_part.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let suffix = dna
            .aspect_ratio()
            .map(|ratio| format!("--ar {ratio}"))
            .unwrap_or_default();
        let assembled = match (body.is_empty(), suffix.is_empty()) {
            (_, true) => body,
            (true, false) => suffix.clone(),
            (false, false) => format!("{body} {suffix}"),
        };

        if !pipeline_logging_enabled() {
            return cleanup_prompt(&assembled);
        }

        let (output, steps) = cleanup_prompt_with_steps(&assembled);
        record_prompt_pipeline(&PromptPipelineRecord {
            scene_part,
            shot_part,
            suffix,
            assembled,
            output: output.clone(),
            steps,
        });
        output
    }

    fn render_part(
        &self,
        values: &FieldValues,
        groups: &[FieldGroup],
        part: Part,
        injection: &SubjectInjection<'_>,
    ) -> String {
        let mut rendered = String::new();
        for field in fields_of(groups) {
            if let Some(segment) = self.render_field(values, field, part, injection) {
                rendered.push_str(&segment);
            }
        }
        rendered
    }

    fn render_field(
        &self,
        values: &FieldValues,
        field: &FieldDescriptor,
        part: Part,
        injection: &SubjectInjection<'_>,
    ) -> Option<String> {
        match (field.id, part) {
            (FieldId::AspectRatio, _) | (FieldId::KeyElements, Part::Scene) => return None,
            (FieldId::Subject, Part::Shot) => {
                let combined = injection.combine(values.list(FieldId::Subject));
                let combined = combined.trim();
                return (!combined.is_empty()).then(|| segment(field.label, combined));
            }
            _ => {}
        }

        let value = values.get(field.id).filter(|value| !value.is_empty())?;
        let text = match field.kind {
            FieldKind::Select => {
                let stored = value.as_text()?;
                self.resolver
                    .label_for(field.options.unwrap_or(field.id), stored)
                    .unwrap_or_else(|| stored.to_string())
            }
            FieldKind::MultiSelect => joined(value, "; ")?,
            FieldKind::Text | FieldKind::TextArea => joined(value, ", ")?,
        };
        Some(segment(field.label, &text))
    }
}

fn joined(value: &FieldValue, separator: &str) -> Option<String> {
    let items = value.as_list();
    (!items.is_empty()).then(|| items.join(separator))
}

fn segment(label: &str, text: &str) -> String {
    format!("{label}: {text}. ")
}

/// Serializes with the builtin field layout. The active concept comes from the shot's
/// `selectedCreativeConceptId`; unknown ids are ignored.
pub fn serialize_prompt(
    dna: &SceneDna,
    shot: &ShotData,
    resolver: OptionResolver<'_>,
    concepts: &ConceptRegistry,
) -> String {
    let concept = shot.concept_id().and_then(|id| concepts.find_concept(id));
    PromptSerializer::new(resolver).serialize(dna, shot, concept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields::{FieldDefault, FieldDescriptor, FieldKind};
    use crate::model::FieldScope;
    use crate::options::{CustomOptionStore, OptionCatalog, OptionEntry};

    static SUBJECT_ONLY: &[FieldGroup] = &[FieldGroup {
        id: "shot",
        title: "Shot",
        fields: &[FieldDescriptor {
            id: FieldId::Subject,
            label: "Subject",
            kind: FieldKind::TextArea,
            options: None,
            allow_custom: false,
            default: FieldDefault::List(&[]),
            placeholder: "",
        }],
    }];

    fn empty_dna(aspect_ratio: &str) -> SceneDna {
        let mut dna = SceneDna::default();
        dna.set(FieldId::AspectRatio, FieldValue::Text(aspect_ratio.to_string()));
        dna
    }

    fn builtin(custom: &CustomOptionStore) -> OptionResolver<'_> {
        OptionResolver::new(OptionCatalog::builtin(), custom)
    }

    #[test]
    fn empty_data_yields_only_aspect_ratio() {
        let custom = CustomOptionStore::new();
        let prompt = PromptSerializer::new(builtin(&custom)).serialize(
            &empty_dna("16:9"),
            &ShotData::default(),
            None,
        );
        assert_eq!(prompt, "--ar 16:9");
    }

    #[test]
    fn blank_aspect_ratio_has_no_suffix() {
        let custom = CustomOptionStore::new();
        let mut shot = ShotData::default();
        shot.set(FieldId::Subject, FieldValue::List(vec!["A scholar".into()]));
        let mut dna = SceneDna::default();
        dna.set(FieldId::AspectRatio, FieldValue::Text("  ".into()));
        let prompt = PromptSerializer::new(builtin(&custom)).serialize(&dna, &shot, None);
        assert_eq!(prompt, "Main Subject(s) / Action: A scholar.");
    }

    #[test]
    fn key_elements_are_injected_into_subject() {
        let custom = CustomOptionStore::new();
        let mut dna = empty_dna("");
        dna.set(
            FieldId::KeyElements,
            FieldValue::List(vec!["Desc A.".into(), "Desc B.".into()]),
        );
        let mut shot = ShotData::default();
        shot.set(FieldId::Subject, FieldValue::List(vec!["A merchant".into()]));

        let injection = SubjectInjection::new(&dna, None);
        let raw = segment("Subject", injection.combine(shot.subject()).trim());
        assert_eq!(raw, "Subject: A merchant. Desc A.. Desc B... ");

        let prompt = PromptSerializer::with_groups(&[], SUBJECT_ONLY, builtin(&custom))
            .expect("subject-only layout is valid")
            .serialize(&dna, &shot, None);
        assert_eq!(prompt, "Subject: A merchant. Desc A. Desc B.");
    }

    #[test]
    fn concept_snippet_follows_key_elements() {
        let custom = CustomOptionStore::new();
        let mut dna = empty_dna("");
        dna.set(FieldId::KeyElements, FieldValue::List(vec!["A brass key.".into()]));
        let mut shot = ShotData::default().with_concept("tunnel_focus");
        shot.set(FieldId::Subject, FieldValue::List(vec!["A guard".into(), "a door".into()]));

        let prompt = serialize_prompt(&dna, &shot, builtin(&custom), &ConceptRegistry::builtin());
        assert_eq!(
            prompt,
            "Main Subject(s) / Action: A guard, a door. A brass key. Extreme tunnel vision effect, \
             heavy vignetting with sharp focus only on a very small central detail, rest of the \
             image is dark and blurred."
        );
    }

    #[test]
    fn key_elements_alone_still_fill_subject() {
        let custom = CustomOptionStore::new();
        let mut dna = empty_dna("1:1");
        dna.set(FieldId::KeyElements, FieldValue::List(vec!["An iron key.".into()]));
        let prompt = PromptSerializer::new(builtin(&custom)).serialize(
            &dna,
            &ShotData::default(),
            None,
        );
        assert_eq!(prompt, "Main Subject(s) / Action: An iron key. --ar 1:1");
    }

    #[test]
    fn select_fields_use_resolved_labels_with_raw_fallback() {
        let custom = CustomOptionStore::from_entries([(
            FieldId::Mood,
            vec![OptionEntry::new("Quiet Dread", "quiet_dread")],
        )]);
        let mut dna = empty_dna("16:9");
        dna.set(FieldId::Era, FieldValue::Text("edo_japan".into()));
        dna.set(FieldId::Mood, FieldValue::Text("quiet_dread".into()));
        dna.set(FieldId::Palette, FieldValue::Text("ink and rust".into()));
        let mut shot = ShotData::default();
        shot.set(FieldId::Lens, FieldValue::Text("macro_lens".into()));

        let prompt = PromptSerializer::new(builtin(&custom)).serialize(&dna, &shot, None);
        assert_eq!(
            prompt,
            "Historical Era/Period: Edo Period Japan. Overall Mood: Quiet Dread. \
             Color Palette: ink and rust. Lens Type/Focal Length: Macro Lens (Extreme Close-up). \
             --ar 16:9"
        );
    }

    #[test]
    fn list_fields_join_with_their_separators() {
        let custom = CustomOptionStore::new();
        let mut dna = empty_dna("");
        dna.set(
            FieldId::Inspiration,
            FieldValue::List(vec!["Rembrandt".into(), "Kurosawa".into()]),
        );
        let mut shot = ShotData::default();
        shot.set(
            FieldId::Details,
            FieldValue::List(vec!["ink-stained fingers".into(), "a reed pen".into()]),
        );
        let prompt = PromptSerializer::new(builtin(&custom)).serialize(&dna, &shot, None);
        assert_eq!(
            prompt,
            "Inspirations (Artists/Works): Rembrandt, Kurosawa. \
             Specific Details/Objects (Shot Level): ink-stained fingers, a reed pen."
        );
    }

    #[test]
    fn multi_select_outside_scene_joins_with_semicolons() {
        static MULTI: &[FieldGroup] = &[FieldGroup {
            id: "multi",
            title: "Multi",
            fields: &[FieldDescriptor {
                id: FieldId::KeyElements,
                label: "Elements",
                kind: FieldKind::MultiSelect,
                options: Some(FieldId::KeyElements),
                allow_custom: false,
                default: FieldDefault::List(&[]),
                placeholder: "",
            }],
        }];
        let custom = CustomOptionStore::new();
        let mut values = FieldValues::new();
        values.set_list(FieldId::KeyElements, ["one", "two"]);
        let serializer = PromptSerializer::new(builtin(&custom));
        let rendered = serializer.render_part(&values, MULTI, Part::Shot, &SubjectInjection::none());
        assert_eq!(rendered, "Elements: one; two. ");
    }

    #[test]
    fn custom_layouts_are_checked_on_construction() {
        static SCENE_FIELD_IN_SHOT: &[FieldGroup] = &[FieldGroup {
            id: "shot",
            title: "Shot",
            fields: &[FieldDescriptor {
                id: FieldId::Mood,
                label: "Mood",
                kind: FieldKind::Select,
                options: Some(FieldId::Mood),
                allow_custom: true,
                default: FieldDefault::Text(""),
                placeholder: "",
            }],
        }];
        let custom = CustomOptionStore::new();
        let err = PromptSerializer::with_groups(&[], SCENE_FIELD_IN_SHOT, builtin(&custom))
            .expect_err("scene field in a shot group is rejected");
        assert_eq!(
            err,
            LayoutError::WrongScope {
                field: FieldId::Mood,
                expected: FieldScope::Shot,
            }
        );
        assert!(
            PromptSerializer::with_groups(SCENE_DNA_GROUPS, SHOT_GROUPS, builtin(&custom)).is_ok()
        );
    }

    #[test]
    fn scene_part_skips_key_elements_and_aspect_ratio() {
        let custom = CustomOptionStore::new();
        let mut dna = empty_dna("4:3");
        dna.set(FieldId::KeyElements, FieldValue::List(vec!["A scroll.".into()]));
        let serializer = PromptSerializer::new(builtin(&custom));
        let rendered = serializer.render_part(
            dna.values(),
            SCENE_DNA_GROUPS,
            Part::Scene,
            &SubjectInjection::none(),
        );
        assert_eq!(rendered, "");
    }

    #[test]
    fn unknown_concept_is_ignored() {
        let custom = CustomOptionStore::new();
        let shot = ShotData::default().with_concept("does_not_exist");
        let prompt = serialize_prompt(
            &empty_dna("9:16"),
            &shot,
            builtin(&custom),
            &ConceptRegistry::builtin(),
        );
        assert_eq!(prompt, "--ar 9:16");
    }
}
