//! Typed `init` options and per-widget configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::normalize::lenient_strings;

/// Options accepted by `init`, exactly as the host page supplies them.
///
/// Every field is optional; [`crate::ResolvedOptions::resolve`] applies the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwitcherOptions {
    /// Active language code.
    pub language: Option<String>,
    /// Active currency code.
    pub currency: Option<String>,
    /// Available languages as `"code|Label"` pairs.
    #[serde(deserialize_with = "lenient_strings")]
    pub languages: Option<Vec<String>>,
    /// Text prefix shown before the language code.
    pub language_label: Option<String>,
    /// Text prefix shown before the currency code.
    pub currency_label: Option<String>,
    /// When `Some(false)` currency switchers are hidden instead of wired.
    pub allow_currency_change: Option<bool>,
    /// Link template containing the `{CODE}` placeholder.
    pub language_change_url: Option<String>,
    /// Enables verbose logging.
    pub debug: Option<bool>,
}

impl SwitcherOptions {
    /// Decode options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPayload`] for malformed JSON and
    /// [`ConfigError::NotAnObject`] when the document is not an object or `null`.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| ConfigError::InvalidPayload { source })?;
        Self::from_value(value)
    }

    /// Decode options from an already parsed JSON value. `null` yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] for non-object values and
    /// [`ConfigError::InvalidPayload`] when a field has the wrong type.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        let found = match &value {
            Value::Null => return Ok(Self::default()),
            Value::Object(_) => None,
            Value::Bool(_) => Some("boolean"),
            Value::Number(_) => Some("number"),
            Value::String(_) => Some("string"),
            Value::Array(_) => Some("array"),
        };
        if let Some(found) = found {
            return Err(ConfigError::NotAnObject { found });
        }
        serde_json::from_value(value).map_err(|source| ConfigError::InvalidPayload { source })
    }
}

/// Which selector a widget root implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// Language switcher; options navigate to the language-change endpoint.
    Language,
    /// Currency switcher; selection stays client-side.
    Currency,
}

impl WidgetKind {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Currency => "currency",
        }
    }

    /// Marker class that identifies the widget root next to `switch`.
    #[must_use]
    pub const fn root_class(self) -> &'static str {
        match self {
            Self::Language => "lang",
            Self::Currency => "currency",
        }
    }

    /// Data attribute carrying an option's code.
    #[must_use]
    pub const fn code_attribute(self) -> &'static str {
        match self {
            Self::Language => "data-lang",
            Self::Currency => "data-currency",
        }
    }
}

/// One selectable entry of a widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchOption {
    /// Non-empty code, unique within a widget.
    pub code: String,
    /// Human-readable label.
    pub label: String,
}

impl SwitchOption {
    /// Build an option, falling back to the code when the label is empty.
    #[must_use]
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        let code = code.into();
        let label = label.into();
        let label = if label.is_empty() { code.clone() } else { label };
        Self { code, label }
    }

    /// Case-insensitive code comparison.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

/// Resolved configuration for a single widget instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Selector kind.
    pub kind: WidgetKind,
    /// Code selected when the page rendered.
    pub current_value: String,
    /// Ordered options.
    pub options: Vec<SwitchOption>,
    /// Optional text prefix for the trigger.
    pub label_text: Option<String>,
    /// Link template (language widgets only).
    pub navigation_url_template: Option<String>,
}

impl WidgetConfig {
    /// Position of the option matching `code`, ignoring case.
    #[must_use]
    pub fn position_of(&self, code: &str) -> Option<usize> {
        self.options.iter().position(|option| option.matches(code))
    }

    /// Trigger text: `"{label} {CODE}"` when a prefix is configured, else `"{CODE}"`.
    #[must_use]
    pub fn display_text(&self, code: &str) -> String {
        let code = code.to_uppercase();
        match self.label_text.as_deref() {
            Some(label) if !label.is_empty() => format!("{label} {code}"),
            _ => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_decode_camel_case_fields() -> Result<(), Box<dyn std::error::Error>> {
        let options = SwitcherOptions::from_json(
            r#"{"language":"en","allowCurrencyChange":false,"languageChangeUrl":"/l/{CODE}","languages":["sk|SK", 7, null]}"#,
        )?;
        assert_eq!(options.language.as_deref(), Some("en"));
        assert_eq!(options.allow_currency_change, Some(false));
        assert_eq!(options.language_change_url.as_deref(), Some("/l/{CODE}"));
        assert_eq!(
            options.languages,
            Some(vec!["sk|SK".to_string(), "7".to_string()])
        );
        Ok(())
    }

    #[test]
    fn null_and_missing_fields_use_defaults() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(SwitcherOptions::from_value(json!(null))?, SwitcherOptions::default());
        let options = SwitcherOptions::from_value(json!({ "languages": null }))?;
        assert_eq!(options.languages, None);
        Ok(())
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(matches!(
            SwitcherOptions::from_value(json!([1, 2])),
            Err(ConfigError::NotAnObject { found: "array" })
        ));
        assert!(matches!(
            SwitcherOptions::from_json("not json"),
            Err(ConfigError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn display_text_keeps_label_prefix() {
        let config = WidgetConfig {
            kind: WidgetKind::Currency,
            current_value: "eur".into(),
            options: vec![SwitchOption::new("eur", "")],
            label_text: Some("Mena:".into()),
            navigation_url_template: None,
        };
        assert_eq!(config.display_text("usd"), "Mena: USD");
        assert_eq!(config.options[0].label, "eur");
        assert_eq!(config.position_of("EUR"), Some(0));
    }

    #[test]
    fn widget_kind_markers() {
        assert_eq!(WidgetKind::Language.root_class(), "lang");
        assert_eq!(WidgetKind::Currency.code_attribute(), "data-currency");
        assert_eq!(WidgetKind::Language.as_str(), "language");
    }
}
