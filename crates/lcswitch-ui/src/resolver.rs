//! Language-to-flag lookup and option parsing used by the initializers.

pub use lcswitch_config::parse_options;

/// Flag token shown for a language code.
///
/// Lookup ignores case; codes without an explicit mapping are returned lowercased.
#[must_use]
pub fn resolve_flag_token(language_code: &str) -> String {
    let lowered = language_code.trim().to_lowercase();
    let mapped = match lowered.as_str() {
        "en" => "gb",
        "sk" => "sk",
        "cz" => "cz",
        "de" => "de",
        "fr" => "fr",
        "es" => "es",
        "it" => "it",
        "ru" => "ru",
        "pl" => "pl",
        "hu" => "hu",
        "nl" => "nl",
        "pt" => "pt",
        _ => return lowered,
    };
    mapped.to_string()
}

/// Class list of the flag icon span for a language code.
#[must_use]
pub fn flag_class(language_code: &str) -> String {
    format!("flag-icon flag-icon-{}", resolve_flag_token(language_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_maps_to_great_britain_in_any_case() {
        assert_eq!(resolve_flag_token("en"), "gb");
        assert_eq!(resolve_flag_token("EN"), "gb");
    }

    #[test]
    fn unknown_codes_pass_through_lowercased() {
        assert_eq!(resolve_flag_token("xx"), "xx");
        assert_eq!(resolve_flag_token("UA"), "ua");
        assert_eq!(resolve_flag_token("Cz"), "cz");
    }

    #[test]
    fn flag_class_uses_icon_convention() {
        assert_eq!(flag_class("en"), "flag-icon flag-icon-gb");
        assert_eq!(flag_class("sk"), "flag-icon flag-icon-sk");
    }

    #[test]
    fn parse_options_is_reexported() {
        let parsed = parse_options(["sk|Slovenčina", " ", "en"]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].label, "en");
    }
}
