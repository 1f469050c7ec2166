use std::collections::HashMap;

use super::catalog::{OptionCatalog, OptionEntry};
use super::custom::CustomOptionStore;
use crate::model::FieldId;

/// Read-time merge of the static catalog and the custom overlay.
#[derive(Debug, Clone, Copy)]
pub struct OptionResolver<'a> {
    catalog: &'a OptionCatalog,
    custom: &'a CustomOptionStore,
}

impl<'a> OptionResolver<'a> {
    pub fn new(catalog: &'a OptionCatalog, custom: &'a CustomOptionStore) -> Self {
        Self { catalog, custom }
    }

    /// Catalog entries followed by custom entries, one per value. A custom entry replaces a
    /// catalog entry with the same value but keeps that value's first position. A non-blank
    /// `era` then drops options scoped to other eras.
    pub fn resolve(&self, field: FieldId, era: Option<&str>) -> Vec<OptionEntry> {
        let candidates = self
            .catalog
            .options(field)
            .iter()
            .chain(self.custom.options(field));

        let mut order: Vec<&str> = Vec::new();
        let mut latest: HashMap<&str, &OptionEntry> = HashMap::new();
        for entry in candidates {
            if latest.insert(entry.value.as_str(), entry).is_none() {
                order.push(entry.value.as_str());
            }
        }

        let era = era.map(str::trim).filter(|era| !era.is_empty());
        order
            .into_iter()
            .filter_map(|value| latest.get(value).copied())
            .filter(|entry| era.map_or(true, |era| entry.visible_in(era)))
            .cloned()
            .collect()
    }

    /// String-keyed variant; unknown identifiers resolve to nothing.
    pub fn resolve_by_name(&self, field: &str, era: Option<&str>) -> Vec<OptionEntry> {
        FieldId::parse(field)
            .map(|field| self.resolve(field, era))
            .unwrap_or_default()
    }

    /// Display label of the retained option carrying `value`, ignoring era scope.
    pub fn label_for(&self, field: FieldId, value: &str) -> Option<String> {
        self.custom
            .options(field)
            .iter()
            .rev()
            .chain(self.catalog.options(field).iter().rev())
            .find(|entry| entry.value == value)
            .map(|entry| entry.label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(options: &[OptionEntry]) -> Vec<&str> {
        options.iter().map(|entry| entry.value.as_str()).collect()
    }

    #[test]
    fn custom_entry_overrides_catalog_in_place() {
        let catalog = OptionCatalog::from_entries([(
            FieldId::Era,
            vec![
                OptionEntry::new("Catalog X", "x"),
                OptionEntry::new("Catalog Y", "y"),
            ],
        )]);
        let custom = CustomOptionStore::from_entries([(
            FieldId::Era,
            vec![
                OptionEntry::new("Custom Z", "z"),
                OptionEntry::new("Custom X", "x"),
            ],
        )]);
        let resolver = OptionResolver::new(&catalog, &custom);

        let resolved = resolver.resolve(FieldId::Era, None);
        assert_eq!(values(&resolved), ["x", "y", "z"]);
        assert_eq!(resolved[0].label, "Custom X");
        assert_eq!(resolver.label_for(FieldId::Era, "x").as_deref(), Some("Custom X"));
    }

    #[test]
    fn era_filter_keeps_global_and_matching_entries() {
        let catalog = OptionCatalog::from_entries([(
            FieldId::Location,
            vec![
                OptionEntry::scoped("A", "a", ["edo_japan"]),
                OptionEntry::scoped("B", "b", Vec::<String>::new()),
            ],
        )]);
        let custom = CustomOptionStore::new();
        let resolver = OptionResolver::new(&catalog, &custom);

        assert_eq!(
            values(&resolver.resolve(FieldId::Location, Some("edo_japan"))),
            ["a", "b"]
        );
        assert_eq!(
            values(&resolver.resolve(FieldId::Location, Some("abbasid_caliphate"))),
            ["b"]
        );
        assert_eq!(
            values(&resolver.resolve(FieldId::Location, Some("  "))),
            ["a", "b"]
        );
    }

    #[test]
    fn era_filter_applies_to_the_overriding_entry() {
        let catalog = OptionCatalog::from_entries([(
            FieldId::Mood,
            vec![OptionEntry::new("Global", "calm")],
        )]);
        let custom = CustomOptionStore::from_entries([(
            FieldId::Mood,
            vec![OptionEntry::scoped("Edo Calm", "calm", ["edo_japan"])],
        )]);
        let resolver = OptionResolver::new(&catalog, &custom);

        assert!(resolver
            .resolve(FieldId::Mood, Some("al_andalus"))
            .is_empty());
        assert_eq!(resolver.resolve(FieldId::Mood, Some("edo_japan")).len(), 1);
    }

    #[test]
    fn unknown_or_free_text_fields_resolve_empty() {
        let custom = CustomOptionStore::new();
        let resolver = OptionResolver::new(OptionCatalog::builtin(), &custom);
        assert!(resolver.resolve(FieldId::Subject, None).is_empty());
        assert!(resolver.resolve_by_name("colour", Some("edo_japan")).is_empty());
        assert!(!resolver.resolve_by_name("lens", None).is_empty());
    }
}
