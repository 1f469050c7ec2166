use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::path::PathBuf;

use crate::app::PromptBuilderApp;
use crate::config::ConfigManager;
use crate::export::export_shots_csv_to_path;
use crate::model::{FieldId, FieldScope, FieldValue, FieldValues, ShotData};
use crate::options::AddOutcome;
use crate::store::{Direction, Theme};

#[derive(Debug, Parser)]
#[command(name = "scenedna")]
#[command(about = "Scene DNA storyboard prompt builder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create, edit and list scenes
    #[command(subcommand)]
    Scenes(SceneCommand),

    /// Manage the shots of a scene's storyboard
    #[command(subcommand)]
    Shots(ShotCommand),

    /// Built-in and saved scene templates
    #[command(subcommand)]
    Templates(TemplateCommand),

    /// Inspect or extend the option lists of select fields
    #[command(subcommand)]
    Options(OptionCommand),

    /// List creative concepts
    Concepts {
        /// Only show concepts from this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Export shots to CSV
    Export {
        /// Only export this scene's storyboard
        #[arg(short, long)]
        scene: Option<String>,

        /// Output file (defaults to the configured export path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview the prompt a shot would get, without saving anything
    Prompt {
        scene_id: String,

        #[command(flatten)]
        shot: ShotArgs,
    },

    /// Display preferences
    Prefs {
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SceneCommand {
    List,
    Show {
        scene_id: String,
    },
    Create {
        #[arg(short, long)]
        title: String,

        /// Seed the DNA from a template
        #[arg(long)]
        template: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },
    Update {
        scene_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Re-serialize every shot against the new DNA
        #[arg(long)]
        refresh: bool,
    },
    Delete {
        scene_id: String,
    },
    Duplicate {
        scene_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ShotCommand {
    List {
        scene_id: Option<String>,
    },
    Add {
        scene_id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        shot: ShotArgs,
    },
    Update {
        scene_id: String,
        shot_id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        shot: ShotArgs,
    },
    Delete {
        scene_id: String,
        shot_id: String,
    },
    Move {
        scene_id: String,
        shot_id: String,
        index: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    List,
    Save {
        scene_id: String,
        name: String,
    },
    Delete {
        template_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum OptionCommand {
    List {
        field: String,

        /// Hide options scoped to other eras
        #[arg(long)]
        era: Option<String>,
    },
    Add {
        field: String,
        label: String,

        /// Raw value; defaults to the label
        #[arg(long)]
        value: Option<String>,

        /// Scope the option to this era
        #[arg(long)]
        era: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    /// `field=value`; repeat a list field to add several items
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShotArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Creative concept id
    #[arg(long)]
    pub concept: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Ltr,
    Rtl,
}

impl FieldArgs {
    /// Parses the assignments. Each mentioned field is replaced as a whole.
    pub fn parse(&self, scope: FieldScope) -> Result<FieldValues> {
        let mut grouped: Vec<(FieldId, Vec<String>)> = Vec::new();
        for assignment in &self.assignments {
            let (field, value) = parse_assignment(assignment)?;
            if field.scope() != scope {
                bail!("field '{field}' cannot be set here");
            }
            match grouped.iter_mut().find(|(id, _)| *id == field) {
                Some((_, items)) => items.push(value),
                None => grouped.push((field, vec![value])),
            }
        }

        let mut values = FieldValues::new();
        for (field, items) in grouped {
            values.set(field, FieldValue::List(items));
        }
        Ok(values)
    }
}

impl ShotArgs {
    fn shot_data(&self, base: Option<&ShotData>) -> Result<ShotData> {
        let mut values = base.map(|data| data.values().clone()).unwrap_or_default();
        values.merge(&self.fields.parse(FieldScope::Shot)?);
        let mut data = ShotData::from_values(values);
        let concept = match (&self.concept, base) {
            (Some(concept), _) => Some(concept.clone()).filter(|id| !id.trim().is_empty()),
            (None, Some(base)) => base.concept_id().map(str::to_string),
            (None, None) => None,
        };
        data.set_concept(concept);
        Ok(data)
    }
}

fn parse_assignment(raw: &str) -> Result<(FieldId, String)> {
    let (field, value) = raw
        .split_once('=')
        .with_context(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = FieldId::parse(field).with_context(|| format!("unknown field '{field}'"))?;
    Ok((field, value.to_string()))
}

fn parse_field(raw: &str) -> Result<FieldId> {
    FieldId::parse(raw).with_context(|| format!("unknown field '{raw}'"))
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn run(cli: Cli, app: &mut PromptBuilderApp, config: &ConfigManager) -> Result<()> {
    match cli.command {
        Commands::Scenes(command) => run_scene_command(command, app),
        Commands::Shots(command) => run_shot_command(command, app),
        Commands::Templates(command) => run_template_command(command, app),
        Commands::Options(command) => run_option_command(command, app),
        Commands::Concepts { category } => {
            let registry = app.state().concepts();
            let mut table = new_table(vec!["ID", "Title", "Category", "Effect"]);
            for concept in registry.concepts() {
                if category.as_deref().is_some_and(|wanted| wanted != concept.category) {
                    continue;
                }
                let category_title = registry
                    .find_category(concept.category)
                    .map_or(concept.category, |category| category.title);
                table.add_row(vec![
                    concept.id,
                    concept.title,
                    category_title,
                    concept.psychological_effect,
                ]);
            }
            println!("{table}");
            Ok(())
        }
        Commands::Export { scene, output } => {
            let path = output.unwrap_or_else(|| config.export_path());
            let state = app.state();
            let written = match scene {
                Some(scene_id) => {
                    export_shots_csv_to_path(&state.scene(&scene_id)?.storyboard, &path)?
                }
                None => export_shots_csv_to_path(state.shots(), &path)?,
            };
            println!("Exported {written} shots to {}", path.display());
            Ok(())
        }
        Commands::Prompt { scene_id, shot } => {
            let state = app.state();
            let scene = state.scene(&scene_id)?;
            let data = shot.shot_data(None)?;
            println!("{}", state.serialize_prompt(&scene.dna, &data));
            Ok(())
        }
        Commands::Prefs { theme, direction } => {
            app.apply(|state| {
                if let Some(theme) = theme {
                    state.set_theme(match theme {
                        ThemeArg::Light => Theme::Light,
                        ThemeArg::Dark => Theme::Dark,
                    });
                }
                if let Some(direction) = direction {
                    state.set_direction(match direction {
                        DirectionArg::Ltr => Direction::Ltr,
                        DirectionArg::Rtl => Direction::Rtl,
                    });
                }
            });
            let state = app.state();
            println!("theme: {:?}, direction: {:?}", state.theme(), state.direction());
            Ok(())
        }
    }
}

fn run_scene_command(command: SceneCommand, app: &mut PromptBuilderApp) -> Result<()> {
    match command {
        SceneCommand::List => {
            let mut table = new_table(vec!["ID", "Title", "Era", "AR", "Shots"]);
            for scene in app.state().scenes() {
                table.add_row(vec![
                    scene.id.clone(),
                    scene.title.clone(),
                    scene.dna.era().unwrap_or("-").to_string(),
                    scene.dna.aspect_ratio().unwrap_or("-").to_string(),
                    scene.storyboard.len().to_string(),
                ]);
            }
            println!("{table}");
        }
        SceneCommand::Show { scene_id } => {
            let scene = app.state().scene(&scene_id)?;
            println!("{} ({})", scene.title, scene.id);
            let mut table = new_table(vec!["Field", "Value"]);
            for (field, value) in scene.dna.values().iter() {
                if value.is_empty() {
                    continue;
                }
                let rendered = match value {
                    FieldValue::Text(text) => text.clone(),
                    FieldValue::List(items) => items.join("; "),
                };
                table.add_row(vec![field.descriptor().label.to_string(), rendered]);
            }
            println!("{table}");
        }
        SceneCommand::Create {
            title,
            template,
            fields,
        } => {
            let overrides = fields.parse(FieldScope::Scene)?;
            let scene_id = match template {
                Some(template_id) => app.apply(|state| -> Result<String> {
                    let scene_id = state
                        .create_scene_from_template(&template_id, Some(title.as_str()))?
                        .id
                        .clone();
                    if overrides.iter().next().is_some() {
                        let scene = state.scene(&scene_id)?;
                        let mut dna = scene.dna.clone();
                        dna.apply(overrides);
                        let title = scene.title.clone();
                        state.update_scene(&scene_id, &title, dna, false)?;
                    }
                    Ok(scene_id)
                })?,
                None => app.apply(|state| {
                    let mut dna = state.fresh_dna();
                    dna.apply(overrides);
                    state.create_scene(&title, dna).id.clone()
                }),
            };
            println!("{scene_id}");
        }
        SceneCommand::Update {
            scene_id,
            title,
            fields,
            refresh,
        } => {
            let overrides = fields.parse(FieldScope::Scene)?;
            let refresh = refresh || app.config().refresh_prompts_on_scene_update;
            let refreshed = app.apply(|state| -> Result<usize> {
                let scene = state.scene(&scene_id)?;
                let title = title.unwrap_or_else(|| scene.title.clone());
                let mut dna = scene.dna.clone();
                dna.apply(overrides);
                let scene = state.update_scene(&scene_id, &title, dna, refresh)?;
                Ok(if refresh { scene.storyboard.len() } else { 0 })
            })?;
            println!("Updated {scene_id} (refreshed {refreshed} shot prompts)");
        }
        SceneCommand::Delete { scene_id } => {
            let removed = app.apply(|state| state.delete_scene(&scene_id))?;
            println!(
                "Deleted '{}' and {} shots",
                removed.title,
                removed.storyboard.len()
            );
        }
        SceneCommand::Duplicate { scene_id } => {
            let copy_id = app.apply(|state| {
                state
                    .duplicate_scene(&scene_id)
                    .map(|scene| scene.id.clone())
            })?;
            println!("{copy_id}");
        }
    }
    Ok(())
}

fn run_shot_command(command: ShotCommand, app: &mut PromptBuilderApp) -> Result<()> {
    match command {
        ShotCommand::List { scene_id } => {
            let state = app.state();
            let shots: Vec<_> = match &scene_id {
                Some(scene_id) => state.scene(scene_id)?.storyboard.iter().collect(),
                None => state.shots().collect(),
            };
            let mut table = new_table(vec!["ID", "Scene", "Name", "Prompt"]);
            for shot in shots {
                table.add_row(vec![
                    shot.id.clone(),
                    shot.scene_id.clone(),
                    shot.name.clone().unwrap_or_default(),
                    shot.generated_prompt.clone(),
                ]);
            }
            println!("{table}");
        }
        ShotCommand::Add {
            scene_id,
            name,
            shot,
        } => {
            let data = shot.shot_data(None)?;
            let (shot_id, prompt) = app.apply(|state| {
                state
                    .add_shot(&scene_id, name.as_deref(), data)
                    .map(|shot| (shot.id.clone(), shot.generated_prompt.clone()))
            })?;
            println!("{shot_id}\n{prompt}");
        }
        ShotCommand::Update {
            scene_id,
            shot_id,
            name,
            shot,
        } => {
            let current = app.state().shot(&scene_id, &shot_id)?;
            let data = shot.shot_data(Some(&current.shot_specific_data))?;
            let prompt = app.apply(|state| {
                state
                    .update_shot(&scene_id, &shot_id, name.as_deref(), data)
                    .map(|shot| shot.generated_prompt.clone())
            })?;
            println!("{prompt}");
        }
        ShotCommand::Delete { scene_id, shot_id } => {
            app.apply(|state| state.delete_shot(&scene_id, &shot_id))?;
            println!("Deleted {shot_id}");
        }
        ShotCommand::Move {
            scene_id,
            shot_id,
            index,
        } => {
            let index = app.apply(|state| state.move_shot(&scene_id, &shot_id, index))?;
            println!("Moved {shot_id} to position {index}");
        }
    }
    Ok(())
}

fn run_template_command(command: TemplateCommand, app: &mut PromptBuilderApp) -> Result<()> {
    match command {
        TemplateCommand::List => {
            let mut table = new_table(vec!["ID", "Name", "Scene Title", "Saved"]);
            for template in app.state().templates() {
                table.add_row(vec![
                    template.id.clone(),
                    template.name.clone(),
                    template.scene_title.clone(),
                    if template.is_user_defined { "yes" } else { "built-in" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        TemplateCommand::Save { scene_id, name } => {
            let template_id = app.apply(|state| {
                state
                    .save_scene_as_template(&scene_id, &name)
                    .map(|template| template.id.clone())
            })?;
            println!("{template_id}");
        }
        TemplateCommand::Delete { template_id } => {
            let removed = app.apply(|state| state.delete_template(&template_id))?;
            println!("Deleted template '{}'", removed.name);
        }
    }
    Ok(())
}

fn run_option_command(command: OptionCommand, app: &mut PromptBuilderApp) -> Result<()> {
    match command {
        OptionCommand::List { field, era } => {
            let field = parse_field(&field)?;
            let mut table = new_table(vec!["Value", "Label", "Eras"]);
            for entry in app.state().resolve_options(field, era.as_deref()) {
                table.add_row(vec![
                    entry.value,
                    entry.label,
                    entry.era_scope.map(|eras| eras.join(", ")).unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OptionCommand::Add {
            field,
            label,
            value,
            era,
        } => {
            let field = parse_field(&field)?;
            let raw_value = value.unwrap_or_else(|| label.clone());
            match app.apply(|state| state.add_custom_option(field, &label, &raw_value, era.as_deref()))
            {
                AddOutcome::Added(entry) => println!("Added '{}' ({})", entry.label, entry.value),
                AddOutcome::Collision { value } => {
                    bail!("option '{value}' already exists for {field}")
                }
                AddOutcome::Blank => bail!("option value must not be blank"),
            }
        }
    }
    Ok(())
}
