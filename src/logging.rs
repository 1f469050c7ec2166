use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

const PIPELINE_TARGET: &str = "scenedna::prompt_pipeline";
const MAX_DIFF_CHARS: usize = 4096;
const PREVIEW_CHAR_LIMIT: usize = 200;
const TARGET_GUTTER_WIDTH: usize = 28;
const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One serialization, from the per-part segments to the cleaned prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPipelineRecord {
    pub scene_part: String,
    pub shot_part: String,
    pub suffix: String,
    pub assembled: String,
    pub output: String,
    pub steps: Vec<CleanupStepRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupStepRecord {
    pub name: String,
    pub before: String,
    pub after: String,
    pub applied: bool,
    pub change_count: Option<usize>,
}

impl PromptPipelineRecord {
    pub fn changed_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.applied).count()
    }

    pub fn render_pretty(&self, use_color: bool) -> String {
        let mut lines = vec![format!(
            "┌─ Prompt Pipeline (cleanup steps: {}, changed: {})",
            self.steps.len(),
            self.changed_steps()
        )];

        for (tag, value) in [
            ("SCENE", &self.scene_part),
            ("SHOT ", &self.shot_part),
            ("AR   ", &self.suffix),
        ] {
            if !value.is_empty() {
                push_body_line(&mut lines, format!("{tag}: {}", preview(value, use_color)));
            }
        }

        for step in &self.steps {
            for line in step.render_lines(use_color) {
                push_body_line(&mut lines, line);
            }
        }

        push_body_line(
            &mut lines,
            format!("OUT  : {}", preview(&self.output, use_color)),
        );
        lines.push("└─".to_string());
        lines.join("\n")
    }
}

impl CleanupStepRecord {
    pub fn new(
        name: impl Into<String>,
        before: String,
        after: String,
        change_count: Option<usize>,
    ) -> Self {
        let applied = before != after;
        Self {
            name: name.into(),
            before,
            after,
            applied,
            change_count,
        }
    }

    fn render_lines(&self, use_color: bool) -> Vec<String> {
        if !self.applied {
            return Vec::new();
        }

        let mut lines = vec![match self.change_count {
            Some(count) if count > 0 => format!("• {} (passes ×{})", self.name, count),
            _ => format!("• {}", self.name),
        }];

        match self.word_diff(use_color) {
            Some(diff) => lines.extend(diff.into_iter().map(|line| format!("  {line}"))),
            None => {
                lines.push(format!("  - {}", preview(&self.before, use_color)));
                lines.push(format!("  + {}", preview(&self.after, use_color)));
            }
        }
        lines
    }

    fn word_diff(&self, use_color: bool) -> Option<Vec<String>> {
        if self.before.len() + self.after.len() > MAX_DIFF_CHARS {
            return None;
        }

        let diff = TextDiff::from_words(&self.before, &self.after);
        let mut removed = String::new();
        let mut added = String::new();
        let (mut has_delete, mut has_insert) = (false, false);

        for change in diff.iter_all_changes() {
            let fragment = escape_fragment(change.value());
            match change.tag() {
                ChangeTag::Delete => {
                    has_delete = true;
                    removed.push_str(&stylize(fragment, use_color, DiffStyle::Delete));
                }
                ChangeTag::Insert => {
                    has_insert = true;
                    added.push_str(&stylize(fragment, use_color, DiffStyle::Insert));
                }
                ChangeTag::Equal => {
                    removed.push_str(&stylize(fragment.clone(), use_color, DiffStyle::Context));
                    added.push_str(&stylize(fragment, use_color, DiffStyle::Context));
                }
            }
        }

        let mut lines = Vec::new();
        if has_delete {
            lines.push(format!("- {removed}"));
        }
        if has_insert {
            lines.push(format!("+ {added}"));
        }
        (!lines.is_empty()).then_some(lines)
    }
}

#[derive(Debug, Clone, Copy)]
enum DiffStyle {
    Delete,
    Insert,
    Context,
}

fn stylize(fragment: String, use_color: bool, style: DiffStyle) -> String {
    if !use_color {
        return fragment;
    }

    match style {
        DiffStyle::Delete => fragment.red().to_string(),
        DiffStyle::Insert => fragment.green().to_string(),
        DiffStyle::Context => fragment.dimmed().to_string(),
    }
}

fn escape_fragment(value: &str) -> String {
    let mut rendered = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => rendered.push('⏎'),
            '\t' => rendered.push('⇥'),
            c if c.is_control() => rendered.push_str(&format!("\\u{{{:04X}}}", c as u32)),
            c => rendered.push(c),
        }
    }
    rendered
}

fn push_body_line(lines: &mut Vec<String>, content: String) {
    lines.push(format!("│ {content}"));
}

fn preview(value: &str, use_color: bool) -> String {
    let mut shown: String = value.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if value.chars().count() > PREVIEW_CHAR_LIMIT {
        shown.push_str("...");
    }
    let escaped = escape_fragment(&shown);
    if use_color {
        escaped.cyan().to_string()
    } else {
        escaped
    }
}

#[derive(Debug, Default)]
struct PipelineEventVisitor {
    pipeline_json: Option<String>,
}

impl tracing::field::Visit for PipelineEventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "pipeline_json" {
            self.pipeline_json = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "pipeline_json" && self.pipeline_json.is_none() {
            self.pipeline_json = Some(format!("{value:?}"));
        }
    }
}

/// Event formatter: timestamped, colourized prefix, plus a boxed rendering of prompt
/// pipeline records.
#[derive(Debug, Default)]
pub struct PromptPipelineFormatter;

impl PromptPipelineFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl<S, N> FormatEvent<S, N> for PromptPipelineFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let use_color = writer.has_ansi_escapes();

        write_prefix(&mut writer, metadata, use_color)?;
        ctx.format_fields(writer.by_ref(), event)?;
        writer.write_char('\n')?;

        if metadata.target() != PIPELINE_TARGET {
            return Ok(());
        }

        let mut visitor = PipelineEventVisitor::default();
        event.record(&mut visitor);
        if let Some(json) = visitor.pipeline_json {
            match serde_json::from_str::<PromptPipelineRecord>(&json) {
                Ok(record) => {
                    writer.write_str(&record.render_pretty(use_color))?;
                    writer.write_char('\n')?;
                }
                Err(err) => {
                    writer.write_str("│ Failed to render prompt pipeline: ")?;
                    writer.write_str(&err.to_string())?;
                    writer.write_char('\n')?;
                }
            }
        }

        Ok(())
    }
}

pub fn pipeline_logging_enabled() -> bool {
    tracing::enabled!(target: PIPELINE_TARGET, Level::DEBUG)
}

pub fn record_prompt_pipeline(record: &PromptPipelineRecord) {
    if !pipeline_logging_enabled() {
        return;
    }
    match serde_json::to_string(record) {
        Ok(json) => tracing::event!(
            target: PIPELINE_TARGET,
            Level::DEBUG,
            pipeline_json = json.as_str(),
            applied_steps = record.changed_steps(),
            "prompt serialization pipeline"
        ),
        Err(_) => tracing::event!(
            target: PIPELINE_TARGET,
            Level::DEBUG,
            "prompt serialization pipeline (serialization failure)"
        ),
    }
}

fn write_prefix(
    writer: &mut Writer<'_>,
    metadata: &tracing::Metadata<'_>,
    use_color: bool,
) -> fmt::Result {
    let timestamp = format_timestamp();
    if use_color {
        writer.write_str(&timestamp.as_str().dimmed().to_string())?;
    } else {
        writer.write_str(&timestamp)?;
    }

    let level = format!("{:>5}", metadata.level());
    if !level.starts_with(' ') {
        writer.write_char(' ')?;
    }
    if use_color {
        writer.write_str(&color_level(&level, *metadata.level()))?;
    } else {
        writer.write_str(&level)?;
    }
    writer.write_char(' ')?;

    let target = format!("{:<width$}", metadata.target(), width = TARGET_GUTTER_WIDTH);
    if use_color {
        writer.write_str(&target.blue().dimmed().to_string())?;
    } else {
        writer.write_str(&target)?;
    }
    writer.write_str(": ")
}

fn color_level(text: &str, level: Level) -> String {
    match level {
        Level::ERROR => text.red().bold().to_string(),
        Level::WARN => text.yellow().bold().to_string(),
        Level::INFO => text.green().to_string(),
        Level::DEBUG => text.cyan().to_string(),
        Level::TRACE => text.dimmed().to_string(),
    }
}

fn format_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "0000-00-00 00:00:00".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PromptPipelineRecord {
        PromptPipelineRecord {
            scene_part: "Overall Mood: Mysterious.".to_string(),
            shot_part: "Main Subject(s) / Action: A scholar..".to_string(),
            suffix: "--ar 16:9".to_string(),
            assembled: "Overall Mood: Mysterious. Main Subject(s) / Action: A scholar.. --ar 16:9"
                .to_string(),
            output: "Overall Mood: Mysterious. Main Subject(s) / Action: A scholar. --ar 16:9"
                .to_string(),
            steps: vec![
                CleanupStepRecord::new(
                    "collapse_double_periods",
                    "A scholar..".to_string(),
                    "A scholar.".to_string(),
                    Some(1),
                ),
                CleanupStepRecord::new("trim", "x".to_string(), "x".to_string(), None),
            ],
        }
    }

    #[test]
    fn renders_only_applied_steps() {
        let rendered = record().render_pretty(false);
        assert!(rendered.starts_with("┌─ Prompt Pipeline (cleanup steps: 2, changed: 1)"));
        assert!(rendered.contains("• collapse_double_periods (passes ×1)"));
        assert!(!rendered.contains("• trim"));
        assert!(rendered.contains("│ AR   : --ar 16:9"));
        assert!(rendered.ends_with("└─"));
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_fragment("a\nb\tc"), "a⏎b⇥c");
    }
}
