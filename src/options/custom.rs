use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::catalog::{OptionCatalog, OptionEntry};
use crate::model::FieldId;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace run regex"));

/// Result of [`CustomOptionStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(OptionEntry),
    /// The normalized value already exists for the field (catalog or custom).
    Collision { value: String },
    /// Label or value was blank after trimming.
    Blank,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Trim, lower-case, and join whitespace runs with `_`: `"My Value"` becomes `"my_value"`.
pub fn normalize_value(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    WHITESPACE_RUN.replace_all(&lowered, "_").into_owned()
}

/// User-added options, keyed by field. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomOptionStore {
    entries: BTreeMap<FieldId, Vec<OptionEntry>>,
}

impl CustomOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store without collision checks, as a persisted snapshot would.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, Vec<OptionEntry>)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn options(&self, field: FieldId) -> &[OptionEntry] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds an option for `field`. `active_era` scopes the option to that era; it is
    /// ignored for the era field itself and when blank.
    pub fn add(
        &mut self,
        catalog: &OptionCatalog,
        field: FieldId,
        label: &str,
        raw_value: &str,
        active_era: Option<&str>,
    ) -> AddOutcome {
        let label = label.trim();
        let value = normalize_value(raw_value);
        if label.is_empty() || value.is_empty() {
            debug!(%field, "Rejected blank custom option");
            return AddOutcome::Blank;
        }

        let taken = catalog.contains_value(field, &value)
            || self
                .options(field)
                .iter()
                .any(|entry| entry.value == value);
        if taken {
            debug!(%field, %value, "Custom option collides with an existing value");
            return AddOutcome::Collision { value };
        }

        let era = active_era
            .map(str::trim)
            .filter(|era| !era.is_empty() && field != FieldId::Era);
        let entry = match era {
            Some(era) => OptionEntry::scoped(label, value, [era]),
            None => OptionEntry::new(label, value),
        };

        self.entries.entry(field).or_default().push(entry.clone());
        info!(%field, value = %entry.value, "Added custom option");
        AddOutcome::Added(entry)
    }
}
