//! Fallback values applied when `init` options leave a field unset.
//!
//! # Design
//! - Keep defaults in one place so the wasm surface and native hosts agree.
//! - Values match what the server-rendered pages ship with today.

/// Language used when neither the options nor the page declare one.
pub const DEFAULT_LANGUAGE: &str = "sk";
/// Currency used when the options do not name one.
pub const DEFAULT_CURRENCY: &str = "eur";
/// Placeholder substituted with the URL-encoded language code.
pub const CODE_PLACEHOLDER: &str = "{CODE}";
/// Navigation target for language links.
pub const DEFAULT_LANGUAGE_CHANGE_URL: &str = "/Home/ChangeLanguage?code={CODE}";
/// Languages offered when the options omit the list entirely.
pub const DEFAULT_LANGUAGES: [&str; 2] = ["cz|Česky", "en|English"];
/// Languages used by page auto-initialisation.
pub const AUTO_INIT_LANGUAGES: [&str; 6] = [
    "sk|Slovenčina",
    "cz|Čeština",
    "en|English",
    "de|Deutsch",
    "ru|Русский",
    "hu|Magyar",
];
