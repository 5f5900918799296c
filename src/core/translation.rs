//! Text/value substitution applied on top of the codec.
//!
//! Matching is trimmed and case-insensitive in both directions.

use crate::error::{BridgeError, BridgeResult};
use crate::settings::{ParameterTranslation, ParametersSettings, Translation};

#[derive(Debug, Clone, Default)]
pub struct TranslationTable<'s> {
    applied: Vec<&'s ParameterTranslation>,
}

fn same(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl<'s> TranslationTable<'s> {
    /// Entries applying at `location` (exact match or the `*` wildcard).
    pub fn at(settings: &'s ParametersSettings, location: &str) -> Self {
        Self {
            applied: settings.translations_at(location).collect(),
        }
    }

    /// Whether any entry exists for `parameter_name`.
    pub fn applies_to(&self, parameter_name: &str) -> bool {
        self.applied.iter().any(|t| t.name == parameter_name)
    }

    fn entries<'a>(&'a self, parameter_name: &'a str) -> impl Iterator<Item = &'s Translation> + 'a {
        self.applied
            .iter()
            .copied()
            .filter(move |t| t.name == parameter_name)
            .flat_map(|t| t.translations.iter())
    }

    /// Stored value to displayed text; unmatched values pass through.
    pub fn value_to_text(&self, parameter_name: &str, value: &str) -> String {
        self.entries(parameter_name)
            .find(|t| same(&t.value, value))
            .map(|t| t.text.trim().to_string())
            .unwrap_or_else(|| value.to_string())
    }

    /// Displayed text to stored value. Parameters without entries pass
    /// through; an unmatched text for a translated parameter is an error.
    ///
    /// Not the inverse of [`value_to_text`](Self::value_to_text) for stored
    /// values missing from the table: those export unchanged and are then
    /// rejected here, failing the sheet on re-import.
    pub fn text_to_value(&self, parameter_name: &str, text: &str) -> BridgeResult<String> {
        if !self.applies_to(parameter_name) {
            return Ok(text.to_string());
        }
        self.entries(parameter_name)
            .find(|t| same(&t.text, text))
            .map(|t| t.value.trim().to_string())
            .ok_or_else(|| BridgeError::Translation(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schedule_location;

    fn settings() -> ParametersSettings {
        ParametersSettings {
            parameter_translations: vec![
                ParameterTranslation {
                    location: "*".into(),
                    name: "Fire Rating".into(),
                    translations: vec![
                        Translation { text: "One hour".into(), value: "1".into() },
                        Translation { text: "Two hours".into(), value: "2".into() },
                    ],
                },
                ParameterTranslation {
                    location: schedule_location("Doors"),
                    name: "Finish".into(),
                    translations: vec![Translation { text: "Painted".into(), value: "P".into() }],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_value_to_text() {
        let s = settings();
        let table = TranslationTable::at(&s, &schedule_location("Walls"));
        assert_eq!(table.value_to_text("Fire Rating", " 2 "), "Two hours");
        assert_eq!(table.value_to_text("Fire Rating", "3"), "3");
        assert_eq!(table.value_to_text("Finish", "P"), "P");
    }

    #[test]
    fn test_text_to_value() {
        let s = settings();
        let table = TranslationTable::at(&s, &schedule_location("Doors"));
        assert_eq!(table.text_to_value("Fire Rating", "one HOUR").unwrap(), "1");
        assert_eq!(table.text_to_value("Finish", "painted").unwrap(), "P");
        assert_eq!(table.text_to_value("Mark", "anything").unwrap(), "anything");
    }

    #[test]
    fn test_unmatched_text_is_an_error() {
        let s = settings();
        let table = TranslationTable::at(&s, "Project Information");
        let err = table.text_to_value("Fire Rating", "Three").unwrap_err();
        assert_eq!(err.to_string(), "Unable to find corresponding value for Three");
    }

    #[test]
    fn test_untranslated_stored_value_does_not_round_trip() {
        let s = settings();
        let table = TranslationTable::at(&s, "*");
        let text = table.value_to_text("Fire Rating", "3");
        assert_eq!(text, "3");
        assert!(matches!(
            table.text_to_value("Fire Rating", &text),
            Err(BridgeError::Translation(t)) if t == "3"
        ));
    }

    #[test]
    fn test_round_trip() {
        let s = settings();
        let table = TranslationTable::at(&s, "*");
        let text = table.value_to_text("Fire Rating", "1");
        assert_eq!(table.text_to_value("Fire Rating", &text).unwrap(), "1");
    }
}
