use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::concepts::ConceptRegistry;
use crate::model::scene::{new_id, now_millis};
use crate::model::{
    builtin_templates, FieldId, Scene, SceneDna, SceneTemplate, Shot, ShotData,
    DEFAULT_ASPECT_RATIO,
};
use crate::options::{AddOutcome, CustomOptionStore, OptionCatalog, OptionEntry, OptionResolver};
use crate::prompt::serialize_prompt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("scene not found: {0}")]
    SceneNotFound(String),
    #[error("shot not found: {shot_id} in scene {scene_id}")]
    ShotNotFound { scene_id: String, shot_id: String },
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    #[error("built-in template '{0}' cannot be deleted")]
    BuiltInTemplate(String),
}

/// Everything a user edits: scenes with their storyboards, templates, custom options and
/// display preferences.
#[derive(Debug, Clone)]
pub struct AppState {
    scenes: Vec<Scene>,
    templates: Vec<SceneTemplate>,
    custom_options: CustomOptionStore,
    theme: Theme,
    direction: Direction,
    catalog: &'static OptionCatalog,
    concepts: ConceptRegistry,
    default_aspect_ratio: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            templates: builtin_templates(),
            custom_options: CustomOptionStore::new(),
            theme: Theme::default(),
            direction: Direction::default(),
            catalog: OptionCatalog::builtin(),
            concepts: ConceptRegistry::builtin(),
            default_aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }

    /// Aspect ratio used when a scene is created or saved with a blank one.
    pub fn with_default_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        let aspect_ratio = aspect_ratio.into();
        if !aspect_ratio.trim().is_empty() {
            self.default_aspect_ratio = aspect_ratio.trim().to_string();
        }
        self
    }

    pub(crate) fn restore(
        scenes: Vec<Scene>,
        user_templates: Vec<SceneTemplate>,
        custom_options: CustomOptionStore,
        theme: Theme,
        direction: Direction,
    ) -> Self {
        let mut state = Self::new();
        state.scenes = scenes;
        state.templates.extend(
            user_templates
                .into_iter()
                .filter(|template| template.is_user_defined),
        );
        state.custom_options = custom_options;
        state.theme = theme;
        state.direction = direction;
        state
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn templates(&self) -> &[SceneTemplate] {
        &self.templates
    }

    pub fn custom_options(&self) -> &CustomOptionStore {
        &self.custom_options
    }

    pub fn concepts(&self) -> &ConceptRegistry {
        &self.concepts
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn resolver(&self) -> OptionResolver<'_> {
        OptionResolver::new(self.catalog, &self.custom_options)
    }

    // -- core surfaces -------------------------------------------------------

    pub fn resolve_options(&self, field: FieldId, era: Option<&str>) -> Vec<OptionEntry> {
        self.resolver().resolve(field, era)
    }

    pub fn add_custom_option(
        &mut self,
        field: FieldId,
        label: &str,
        raw_value: &str,
        era_scope: Option<&str>,
    ) -> AddOutcome {
        self.custom_options
            .add(self.catalog, field, label, raw_value, era_scope)
    }

    pub fn serialize_prompt(&self, dna: &SceneDna, shot: &ShotData) -> String {
        serialize_prompt(dna, shot, self.resolver(), &self.concepts)
    }

    // -- scenes --------------------------------------------------------------

    pub fn scene(&self, scene_id: &str) -> Result<&Scene, StoreError> {
        self.scenes
            .iter()
            .find(|scene| scene.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
    }

    fn scene_mut(&mut self, scene_id: &str) -> Result<&mut Scene, StoreError> {
        self.scenes
            .iter_mut()
            .find(|scene| scene.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
    }

    /// DNA for a brand-new scene with nothing selected.
    pub fn fresh_dna(&self) -> SceneDna {
        SceneDna::with_aspect_ratio(&self.default_aspect_ratio)
    }

    pub fn create_scene(&mut self, title: &str, dna: SceneDna) -> &Scene {
        let mut dna = dna;
        dna.ensure_invariants(&self.default_aspect_ratio);
        let scene = Scene::new(title.trim(), dna);
        info!(scene_id = %scene.id, title = %scene.title, "Created scene");
        self.scenes.push(scene);
        &self.scenes[self.scenes.len() - 1]
    }

    /// Seeds a scene from a copy of the template's DNA.
    pub fn create_scene_from_template(
        &mut self,
        template_id: &str,
        title: Option<&str>,
    ) -> Result<&Scene, StoreError> {
        let template = self
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .ok_or_else(|| StoreError::TemplateNotFound(template_id.to_string()))?;

        let mut dna = self.fresh_dna();
        dna.apply(template.scene_dna.values().clone());
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| template.scene_title.clone());
        Ok(self.create_scene(&title, dna))
    }

    /// Replaces title and DNA. With `refresh_prompts`, every shot is re-serialized against the
    /// new DNA; otherwise existing prompts stay as last saved.
    pub fn update_scene(
        &mut self,
        scene_id: &str,
        title: &str,
        dna: SceneDna,
        refresh_prompts: bool,
    ) -> Result<&Scene, StoreError> {
        let mut dna = dna;
        dna.ensure_invariants(&self.default_aspect_ratio);
        {
            let scene = self.scene_mut(scene_id)?;
            scene.title = title.trim().to_string();
            scene.dna = dna;
        }
        if refresh_prompts {
            self.refresh_scene_prompts(scene_id)?;
        }
        info!(scene_id, refresh_prompts, "Updated scene settings");
        self.scene(scene_id)
    }

    /// Re-serializes every shot of a scene against its current DNA.
    pub fn refresh_scene_prompts(&mut self, scene_id: &str) -> Result<usize, StoreError> {
        let scene = self.scene(scene_id)?;
        let prompts: Vec<String> = scene
            .storyboard
            .iter()
            .map(|shot| self.serialize_prompt(&scene.dna, &shot.shot_specific_data))
            .collect();

        let now = now_millis();
        let scene = self.scene_mut(scene_id)?;
        for (shot, prompt) in scene.storyboard.iter_mut().zip(prompts) {
            shot.generated_prompt = prompt;
            shot.timestamp = now;
        }
        debug!(scene_id, shots = scene.storyboard.len(), "Refreshed shot prompts");
        Ok(scene.storyboard.len())
    }

    /// Removes the scene together with its whole storyboard.
    pub fn delete_scene(&mut self, scene_id: &str) -> Result<Scene, StoreError> {
        let index = self
            .scenes
            .iter()
            .position(|scene| scene.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
        let removed = self.scenes.remove(index);
        info!(
            scene_id,
            shots = removed.storyboard.len(),
            "Deleted scene and its shots"
        );
        Ok(removed)
    }

    pub fn duplicate_scene(&mut self, scene_id: &str) -> Result<&Scene, StoreError> {
        let source = self.scene(scene_id)?;
        let mut copy = Scene::new(format!("{} (Copy)", source.title), source.dna.clone());
        copy.storyboard = source
            .storyboard
            .iter()
            .map(|shot| Shot {
                id: new_id("shot"),
                scene_id: copy.id.clone(),
                ..shot.clone()
            })
            .collect();
        info!(source = scene_id, scene_id = %copy.id, "Duplicated scene");
        self.scenes.push(copy);
        Ok(&self.scenes[self.scenes.len() - 1])
    }

    // -- shots ---------------------------------------------------------------

    pub fn shot(&self, scene_id: &str, shot_id: &str) -> Result<&Shot, StoreError> {
        self.scene(scene_id)?
            .shot(shot_id)
            .ok_or_else(|| StoreError::ShotNotFound {
                scene_id: scene_id.to_string(),
                shot_id: shot_id.to_string(),
            })
    }

    /// Looks a shot up by id across every scene.
    pub fn find_shot(&self, shot_id: &str) -> Option<&Shot> {
        self.shots().find(|shot| shot.id == shot_id)
    }

    pub fn shots(&self) -> impl Iterator<Item = &Shot> {
        self.scenes.iter().flat_map(|scene| scene.storyboard.iter())
    }

    pub fn add_shot(
        &mut self,
        scene_id: &str,
        name: Option<&str>,
        data: ShotData,
    ) -> Result<&Shot, StoreError> {
        let scene = self.scene(scene_id)?;
        let generated_prompt = self.serialize_prompt(&scene.dna, &data);
        let shot = Shot {
            id: new_id("shot"),
            scene_id: scene_id.to_string(),
            shot_specific_data: data,
            generated_prompt,
            name: clean_name(name),
            timestamp: now_millis(),
            preview_image_url: None,
        };
        info!(scene_id, shot_id = %shot.id, "Added shot");

        let scene = self.scene_mut(scene_id)?;
        scene.storyboard.push(shot);
        Ok(&scene.storyboard[scene.storyboard.len() - 1])
    }

    /// Replaces the shot's data and recomputes its prompt. `name: None` keeps the old name.
    pub fn update_shot(
        &mut self,
        scene_id: &str,
        shot_id: &str,
        name: Option<&str>,
        data: ShotData,
    ) -> Result<&Shot, StoreError> {
        self.shot(scene_id, shot_id)?;
        let generated_prompt = self.serialize_prompt(&self.scene(scene_id)?.dna, &data);

        let scene = self.scene_mut(scene_id)?;
        let shot = scene
            .shot_mut(shot_id)
            .ok_or_else(|| StoreError::ShotNotFound {
                scene_id: scene_id.to_string(),
                shot_id: shot_id.to_string(),
            })?;
        shot.shot_specific_data = data;
        shot.generated_prompt = generated_prompt;
        shot.timestamp = now_millis();
        if name.is_some() {
            shot.name = clean_name(name);
        }
        info!(scene_id, shot_id, "Updated shot");
        Ok(&*shot)
    }

    pub fn delete_shot(&mut self, scene_id: &str, shot_id: &str) -> Result<Shot, StoreError> {
        let scene = self.scene_mut(scene_id)?;
        let index = scene
            .storyboard
            .iter()
            .position(|shot| shot.id == shot_id)
            .ok_or_else(|| StoreError::ShotNotFound {
                scene_id: scene_id.to_string(),
                shot_id: shot_id.to_string(),
            })?;
        let removed = scene.storyboard.remove(index);
        info!(scene_id, shot_id, "Deleted shot");
        Ok(removed)
    }

    /// Moves a shot within its storyboard; indexes past the end clamp to the last slot.
    pub fn move_shot(
        &mut self,
        scene_id: &str,
        shot_id: &str,
        new_index: usize,
    ) -> Result<usize, StoreError> {
        let scene = self.scene_mut(scene_id)?;
        let from = scene
            .storyboard
            .iter()
            .position(|shot| shot.id == shot_id)
            .ok_or_else(|| StoreError::ShotNotFound {
                scene_id: scene_id.to_string(),
                shot_id: shot_id.to_string(),
            })?;
        let shot = scene.storyboard.remove(from);
        let index = new_index.min(scene.storyboard.len());
        scene.storyboard.insert(index, shot);
        debug!(scene_id, shot_id, from, to = index, "Moved shot");
        Ok(index)
    }

    // -- templates -----------------------------------------------------------

    pub fn template(&self, template_id: &str) -> Result<&SceneTemplate, StoreError> {
        self.templates
            .iter()
            .find(|template| template.id == template_id)
            .ok_or_else(|| StoreError::TemplateNotFound(template_id.to_string()))
    }

    /// Snapshots a scene's DNA into a new user template.
    pub fn save_scene_as_template(
        &mut self,
        scene_id: &str,
        name: &str,
    ) -> Result<&SceneTemplate, StoreError> {
        let scene = self.scene(scene_id)?;
        let template = SceneTemplate {
            id: new_id("template-user"),
            name: name.trim().to_string(),
            scene_title: scene.title.clone(),
            scene_dna: scene.dna.clone(),
            is_user_defined: true,
        };
        info!(scene_id, template_id = %template.id, "Saved scene as template");
        self.templates.push(template);
        Ok(&self.templates[self.templates.len() - 1])
    }

    pub fn delete_template(&mut self, template_id: &str) -> Result<SceneTemplate, StoreError> {
        let index = self
            .templates
            .iter()
            .position(|template| template.id == template_id)
            .ok_or_else(|| StoreError::TemplateNotFound(template_id.to_string()))?;
        if !self.templates[index].is_user_defined {
            return Err(StoreError::BuiltInTemplate(template_id.to_string()));
        }
        Ok(self.templates.remove(index))
    }
}

fn clean_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, FieldValues};

    fn subject(text: &str) -> ShotData {
        let mut data = ShotData::default();
        data.set(FieldId::Subject, FieldValue::List(vec![text.to_string()]));
        data
    }

    fn scene_with_shots(state: &mut AppState, count: usize) -> String {
        let scene_id = state.create_scene("Bazaar", SceneDna::default()).id.clone();
        for index in 0..count {
            state
                .add_shot(&scene_id, None, subject(&format!("Merchant {index}")))
                .expect("scene exists");
        }
        scene_id
    }

    #[test]
    fn add_shot_stores_serialized_prompt() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 0);
        let shot = state
            .add_shot(&scene_id, Some("  Opening "), subject("A merchant"))
            .expect("scene exists");
        assert_eq!(
            shot.generated_prompt,
            "Main Subject(s) / Action: A merchant. --ar 16:9"
        );
        assert_eq!(shot.name.as_deref(), Some("Opening"));
        assert_eq!(shot.scene_id, scene_id);
    }

    #[test]
    fn deleting_scene_cascades_to_shots() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 3);
        let keep_id = scene_with_shots(&mut state, 1);
        let shot_ids: Vec<String> = state
            .scene(&scene_id)
            .expect("scene exists")
            .storyboard
            .iter()
            .map(|shot| shot.id.clone())
            .collect();

        let removed = state.delete_scene(&scene_id).expect("scene exists");
        assert_eq!(removed.storyboard.len(), 3);
        for shot_id in &shot_ids {
            assert!(state.find_shot(shot_id).is_none());
        }
        assert!(state.shots().all(|shot| shot.scene_id == keep_id));
        assert_eq!(state.shots().count(), 1);
        assert_eq!(
            state.shot(&scene_id, &shot_ids[0]),
            Err(StoreError::SceneNotFound(scene_id.clone()))
        );
    }

    #[test]
    fn prompts_stay_stale_until_refresh() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 1);
        let mut dna = SceneDna::default();
        dna.set(FieldId::AspectRatio, FieldValue::Text("21:9".into()));

        state
            .update_scene(&scene_id, "Bazaar", dna.clone(), false)
            .expect("scene exists");
        let stale = &state.scene(&scene_id).expect("scene exists").storyboard[0];
        assert!(stale.generated_prompt.ends_with("--ar 16:9"));

        state
            .update_scene(&scene_id, "Bazaar", dna, true)
            .expect("scene exists");
        let fresh = &state.scene(&scene_id).expect("scene exists").storyboard[0];
        assert!(fresh.generated_prompt.ends_with("--ar 21:9"));
    }

    #[test]
    fn update_shot_keeps_name_when_absent() {
        let mut state = AppState::new();
        let scene_id = state.create_scene("Court", SceneDna::default()).id.clone();
        let shot_id = state
            .add_shot(&scene_id, Some("Wide"), subject("A court"))
            .expect("scene exists")
            .id
            .clone();

        let updated = state
            .update_shot(&scene_id, &shot_id, None, subject("A crowded court"))
            .expect("shot exists");
        assert_eq!(updated.name.as_deref(), Some("Wide"));
        assert!(updated.generated_prompt.contains("A crowded court"));

        assert!(matches!(
            state.update_shot(&scene_id, "shot-missing", None, subject("x")),
            Err(StoreError::ShotNotFound { .. })
        ));
    }

    #[test]
    fn blank_aspect_ratio_falls_back_to_default() {
        let mut state = AppState::new().with_default_aspect_ratio("4:3");
        let mut dna = SceneDna::default();
        dna.set(FieldId::AspectRatio, FieldValue::Text(String::new()));
        let scene = state.create_scene("Night", dna);
        assert_eq!(scene.dna.aspect_ratio(), Some("4:3"));
    }

    #[test]
    fn duplicate_scene_copies_shots_with_new_ids() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 2);
        let copy = state.duplicate_scene(&scene_id).expect("scene exists").clone();
        let original = state.scene(&scene_id).expect("scene exists");

        assert_eq!(copy.title, "Bazaar (Copy)");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.storyboard.len(), 2);
        for (copied, source) in copy.storyboard.iter().zip(&original.storyboard) {
            assert_ne!(copied.id, source.id);
            assert_eq!(copied.scene_id, copy.id);
            assert_eq!(copied.generated_prompt, source.generated_prompt);
        }
    }

    #[test]
    fn move_shot_reorders_storyboard() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 3);
        let last_id = state.scene(&scene_id).expect("scene exists").storyboard[2]
            .id
            .clone();
        assert_eq!(state.move_shot(&scene_id, &last_id, 0), Ok(0));
        assert_eq!(
            state.scene(&scene_id).expect("scene exists").storyboard[0].id,
            last_id
        );
        assert_eq!(state.move_shot(&scene_id, &last_id, 99), Ok(2));
    }

    #[test]
    fn move_shot_keeps_the_shot_intact() {
        let mut state = AppState::new();
        let scene_id = scene_with_shots(&mut state, 3);
        let before = state.scene(&scene_id).expect("scene exists").storyboard[0].clone();

        assert_eq!(state.move_shot(&scene_id, &before.id, 1), Ok(1));
        let storyboard = &state.scene(&scene_id).expect("scene exists").storyboard;
        assert_eq!(storyboard.len(), 3);
        assert_eq!(storyboard[1], before);

        assert_eq!(
            state.move_shot(&scene_id, "shot-missing", 0),
            Err(StoreError::ShotNotFound {
                scene_id: scene_id.clone(),
                shot_id: "shot-missing".to_string(),
            })
        );
        assert_eq!(state.scene(&scene_id).expect("scene exists").storyboard.len(), 3);
    }

    #[test]
    fn blank_aspect_ratio_override_uses_configured_default() {
        let mut state = AppState::new().with_default_aspect_ratio("4:3");
        let mut overrides = FieldValues::new();
        overrides.set_text(FieldId::AspectRatio, "");
        overrides.set_text(FieldId::Mood, "mysterious");

        let mut dna = state.fresh_dna();
        dna.apply(overrides);
        let scene = state.create_scene("Vault", dna);
        assert_eq!(scene.dna.aspect_ratio(), Some("4:3"));
        assert_eq!(scene.dna.values().text(FieldId::Mood), Some("mysterious"));
    }

    #[test]
    fn templates_seed_scenes_and_builtins_are_protected() {
        let mut state = AppState::new();
        let scene = state
            .create_scene_from_template("template-scene-2", None)
            .expect("template exists");
        assert_eq!(scene.title, "Samurai Meditation in Spring");
        assert_eq!(scene.dna.era(), Some("edo_japan"));
        assert_eq!(scene.dna.aspect_ratio(), Some("21:9"));
        let scene_id = scene.id.clone();

        let template_id = state
            .save_scene_as_template(&scene_id, "My Garden")
            .expect("scene exists")
            .id
            .clone();
        assert!(state.template(&template_id).expect("saved").is_user_defined);

        assert_eq!(
            state.delete_template("template-scene-1"),
            Err(StoreError::BuiltInTemplate("template-scene-1".into()))
        );
        assert!(state.delete_template(&template_id).is_ok());
        assert_eq!(state.templates().len(), 2);
    }

    #[test]
    fn custom_option_added_under_active_era() {
        let mut state = AppState::new();
        let outcome =
            state.add_custom_option(FieldId::Location, "Rice Paddy", "Rice Paddy", Some("edo_japan"));
        assert!(outcome.is_added());

        let edo = state.resolve_options(FieldId::Location, Some("edo_japan"));
        assert!(edo.iter().any(|entry| entry.value == "rice_paddy"));
        let abbasid = state.resolve_options(FieldId::Location, Some("abbasid_caliphate"));
        assert!(abbasid.iter().all(|entry| entry.value != "rice_paddy"));
    }
}
