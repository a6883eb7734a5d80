//! Parsing and resolution helpers that turn raw options into widget configuration.
//!
//! Every function here is total: malformed input is filtered or replaced with a
//! default and reported through `tracing`, never returned as an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::defaults::{
    CODE_PLACEHOLDER, DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_LANGUAGE_CHANGE_URL,
    DEFAULT_LANGUAGES,
};
use crate::model::{SwitchOption, SwitcherOptions, WidgetConfig, WidgetKind};

/// Parse `"code|Label"` pairs into ordered options.
///
/// Entries are trimmed and empty entries or entries with an empty code are dropped.
/// The code is the text before the first `|`, the label the segment after it (up to
/// any further `|`), falling back to the code.
pub fn parse_options<I, S>(raw_pairs: I) -> Vec<SwitchOption>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_pairs
        .into_iter()
        .filter_map(|raw| {
            let pair = raw.as_ref().trim();
            if pair.is_empty() {
                return None;
            }
            let mut segments = pair.split('|');
            let code = segments.next().unwrap_or_default().trim();
            let label = segments.next().unwrap_or_default();
            if code.is_empty() {
                tracing::warn!(entry = pair, "dropping option without a code");
                return None;
            }
            Some(SwitchOption::new(code, label.trim()))
        })
        .collect()
}

/// Normalise a page language tag: trimmed, lowercased, region suffix stripped.
#[must_use]
pub fn normalize_page_language(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let base = lowered.split('-').next().unwrap_or_default();
    (!base.is_empty()).then(|| base.to_string())
}

/// Options with every default applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Active language code.
    pub language: String,
    /// Active currency code.
    pub currency: String,
    /// Whether the currency came from the options rather than the default.
    pub currency_configured: bool,
    /// Parsed language options.
    pub languages: Vec<SwitchOption>,
    /// Language trigger prefix.
    pub language_label: Option<String>,
    /// Currency trigger prefix.
    pub currency_label: Option<String>,
    /// Whether currency switchers are wired.
    pub allow_currency_change: bool,
    /// Language link template.
    pub language_change_url: String,
    /// Verbose logging toggle.
    pub debug: bool,
}

impl ResolvedOptions {
    /// Apply defaults. `page_language` is the host document's declared language.
    #[must_use]
    pub fn resolve(options: &SwitcherOptions, page_language: Option<&str>) -> Self {
        let languages = options.languages.as_ref().map_or_else(
            || parse_options(DEFAULT_LANGUAGES),
            |raw| parse_options(raw.iter()),
        );
        if languages.is_empty() {
            tracing::warn!("no usable language options; language switchers will be empty");
        }

        let language = non_empty(options.language.as_deref())
            .map(ToString::to_string)
            .or_else(|| page_language.and_then(normalize_page_language))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let configured_currency = non_empty(options.currency.as_deref());
        let currency = configured_currency.unwrap_or(DEFAULT_CURRENCY).to_string();

        let language_change_url = non_empty(options.language_change_url.as_deref())
            .unwrap_or(DEFAULT_LANGUAGE_CHANGE_URL)
            .to_string();
        if !language_change_url.contains(CODE_PLACEHOLDER) {
            tracing::warn!(
                template = %language_change_url,
                "language change url has no {{CODE}} placeholder; links will not vary"
            );
        }

        Self {
            language,
            currency,
            currency_configured: configured_currency.is_some(),
            languages,
            language_label: non_empty(options.language_label.as_deref()).map(str::to_string),
            currency_label: non_empty(options.currency_label.as_deref()).map(str::to_string),
            allow_currency_change: options.allow_currency_change != Some(false),
            language_change_url,
            debug: options.debug.unwrap_or(false),
        }
    }

    /// Widget configuration for every language root.
    #[must_use]
    pub fn language_widget(&self) -> WidgetConfig {
        WidgetConfig {
            kind: WidgetKind::Language,
            current_value: self.language.clone(),
            options: self.languages.clone(),
            label_text: self.language_label.clone(),
            navigation_url_template: Some(self.language_change_url.clone()),
        }
    }

    /// Widget configuration for a currency root whose options were read from the page.
    #[must_use]
    pub fn currency_widget(&self, options: Vec<SwitchOption>) -> WidgetConfig {
        WidgetConfig {
            kind: WidgetKind::Currency,
            current_value: self.currency.clone(),
            options,
            label_text: self.currency_label.clone(),
            navigation_url_template: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Accept a list of scalars, stringifying numbers and booleans and dropping the rest.
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.map(|values| {
        values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(text) => Some(text),
                Value::Number(number) => Some(number.to_string()),
                Value::Bool(flag) => Some(flag.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_trims_filters_and_defaults_labels() {
        let parsed = parse_options([
            " sk | Slovenčina ",
            "",
            "   ",
            "|Nameless",
            "en",
            "de|",
            "pt|Português|extra",
        ]);
        assert_eq!(
            parsed,
            vec![
                SwitchOption::new("sk", "Slovenčina"),
                SwitchOption::new("en", "en"),
                SwitchOption::new("de", "de"),
                SwitchOption::new("pt", "Português"),
            ]
        );
    }

    #[test]
    fn parse_options_keeps_duplicates_in_order() {
        let parsed = parse_options(["en|English", "en|Again"]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].label, "Again");
    }

    #[test]
    fn page_language_strips_region() {
        assert_eq!(normalize_page_language(" sk-SK "), Some("sk".to_string()));
        assert_eq!(normalize_page_language("EN"), Some("en".to_string()));
        assert_eq!(normalize_page_language("  "), None);
    }

    #[test]
    fn resolve_applies_defaults() {
        let resolved = ResolvedOptions::resolve(&SwitcherOptions::default(), None);
        assert_eq!(resolved.language, "sk");
        assert_eq!(resolved.currency, "eur");
        assert!(!resolved.currency_configured);
        assert!(resolved.allow_currency_change);
        assert_eq!(resolved.language_change_url, DEFAULT_LANGUAGE_CHANGE_URL);
        assert_eq!(
            resolved.languages,
            vec![
                SwitchOption::new("cz", "Česky"),
                SwitchOption::new("en", "English")
            ]
        );
        assert!(!resolved.debug);
    }

    #[test]
    fn resolve_prefers_options_then_page_language() {
        let from_page = ResolvedOptions::resolve(&SwitcherOptions::default(), Some("de-AT"));
        assert_eq!(from_page.language, "de");

        let options = SwitcherOptions {
            language: Some("en".into()),
            currency: Some("usd".into()),
            allow_currency_change: Some(false),
            language_label: Some(String::new()),
            ..SwitcherOptions::default()
        };
        let explicit = ResolvedOptions::resolve(&options, Some("de"));
        assert_eq!(explicit.language, "en");
        assert_eq!(explicit.currency, "usd");
        assert!(explicit.currency_configured);
        assert!(!explicit.allow_currency_change);
        assert_eq!(explicit.language_label, None);
    }

    #[test]
    fn widget_configs_carry_kind_specific_fields() {
        let resolved = ResolvedOptions::resolve(&SwitcherOptions::default(), None);
        let language = resolved.language_widget();
        assert_eq!(language.kind, WidgetKind::Language);
        assert_eq!(
            language.navigation_url_template.as_deref(),
            Some(DEFAULT_LANGUAGE_CHANGE_URL)
        );
        let currency = resolved.currency_widget(vec![SwitchOption::new("usd", "USD")]);
        assert_eq!(currency.kind, WidgetKind::Currency);
        assert_eq!(currency.current_value, "eur");
        assert!(currency.navigation_url_template.is_none());
    }
}
