use regex::Regex;
use std::sync::LazyLock;

use crate::logging::CleanupStepRecord;

static DOUBLE_PERIOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\.").expect("valid double period regex"));
static WHITESPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace collapse regex"));

/// Final pass over an assembled prompt: a period followed by optional whitespace and another
/// period becomes one period (repeated until none remain, so `...` ends as `.`), whitespace
/// runs become one space, and the ends are trimmed. Idempotent.
pub fn cleanup_prompt(input: &str) -> String {
    run_cleanup(input, false).0
}

/// Same as [`cleanup_prompt`], also returning a record per step for pipeline logging.
pub fn cleanup_prompt_with_steps(input: &str) -> (String, Vec<CleanupStepRecord>) {
    run_cleanup(input, true)
}

fn run_cleanup(input: &str, record: bool) -> (String, Vec<CleanupStepRecord>) {
    let mut steps = Vec::new();
    let mut current = input.to_string();

    let (collapsed, passes) = collapse_double_periods(&current);
    if record {
        steps.push(CleanupStepRecord::new(
            "collapse_double_periods",
            current.clone(),
            collapsed.clone(),
            (passes > 0).then_some(passes),
        ));
    }
    current = collapsed;

    let spaced = WHITESPACE_RUN_REGEX.replace_all(&current, " ").into_owned();
    if record {
        steps.push(CleanupStepRecord::new(
            "collapse_whitespace",
            current.clone(),
            spaced.clone(),
            None,
        ));
    }
    current = spaced;

    let trimmed = current.trim().to_string();
    if record {
        steps.push(CleanupStepRecord::new(
            "trim_whitespace",
            current,
            trimmed.clone(),
            None,
        ));
    }

    (trimmed, steps)
}

fn collapse_double_periods(input: &str) -> (String, usize) {
    let mut current = input.to_string();
    let mut passes = 0;
    // Each pass shortens the string, so this terminates.
    while DOUBLE_PERIOD_REGEX.is_match(&current) {
        current = DOUBLE_PERIOD_REGEX.replace_all(&current, ".").into_owned();
        passes += 1;
    }
    (current, passes)
}
