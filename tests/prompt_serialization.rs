use scenedna_rs::options::CustomOptionStore;
use scenedna_rs::prompt::cleanup_prompt;
use scenedna_rs::{
    serialize_prompt, ConceptRegistry, FieldId, FieldValue, OptionCatalog, OptionEntry,
    OptionResolver, SceneDna, ShotData,
};

fn prompt(dna: &SceneDna, shot: &ShotData, custom: &CustomOptionStore) -> String {
    let resolver = OptionResolver::new(OptionCatalog::builtin(), custom);
    serialize_prompt(dna, shot, resolver, &ConceptRegistry::builtin())
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

fn list(items: &[&str]) -> FieldValue {
    FieldValue::List(items.iter().map(|item| item.to_string()).collect())
}

#[test]
fn full_shot_renders_scene_then_shot_then_aspect_ratio() {
    let mut dna = SceneDna::default();
    dna.set(FieldId::Era, text("abbasid_caliphate"));
    dna.set(FieldId::Mood, text("mysterious"));
    dna.set(FieldId::Lighting, text("oil_lamp_key"));
    dna.set(FieldId::KeyElements, list(&["Brass astrolabes", "Stacked scrolls"]));
    dna.set(FieldId::Inspiration, list(&["Rembrandt", "Al-Wasiti"]));
    dna.set(FieldId::AspectRatio, text("21:9"));

    let mut shot = ShotData::default();
    shot.set(FieldId::Subject, list(&["A scholar reads by lamplight"]));
    shot.set(FieldId::Lens, text("50mm_prime"));
    shot.set(FieldId::Details, list(&["ink-stained fingers"]));

    assert_eq!(
        prompt(&dna, &shot, &CustomOptionStore::new()),
        "Historical Era/Period: Abbasid Caliphate – Early Golden Age. \
         Overall Mood: Mysterious. \
         Lighting Style: Single Oil‑Lamp Key. \
         Inspirations (Artists/Works): Rembrandt, Al-Wasiti. \
         Main Subject(s) / Action: A scholar reads by lamplight. Brass astrolabes. Stacked scrolls. \
         Lens Type/Focal Length: 50mm Prime Lens (Standard). \
         Specific Details/Objects (Shot Level): ink-stained fingers. \
         --ar 21:9"
    );
}

#[test]
fn custom_label_overrides_catalog_label() {
    let custom = CustomOptionStore::from_entries([(
        FieldId::Mood,
        vec![OptionEntry::new("Hushed Mystery", "mysterious")],
    )]);
    let mut dna = SceneDna::default();
    dna.set(FieldId::Mood, text("mysterious"));

    assert_eq!(
        prompt(&dna, &ShotData::default(), &custom),
        "Overall Mood: Hushed Mystery. --ar 16:9"
    );
}

#[test]
fn concept_snippet_is_appended_to_subject() {
    let shot = ShotData::default().with_concept("ancient_selfie");
    let output = prompt(&SceneDna::default(), &shot, &CustomOptionStore::new());
    assert_eq!(
        output,
        "Main Subject(s) / Action: Subject in historical attire taking a selfie with an \
         anachronistic smartphone, posing with a typical selfie expression. --ar 16:9"
    );
}

#[test]
fn output_is_already_clean() {
    let mut dna = SceneDna::default();
    dna.set(FieldId::KeyElements, list(&["Lanterns...", "  ", "Rain."]));
    let mut shot = ShotData::default();
    shot.set(FieldId::Subject, list(&["Two guards.", "a gate"]));
    shot.set(FieldId::Details, list(&["wet   stone.."]));

    let output = prompt(&dna, &shot, &CustomOptionStore::new());
    assert_eq!(cleanup_prompt(&output), output);
    assert!(!output.contains(".."));
    assert!(!output.contains("  "));
}
