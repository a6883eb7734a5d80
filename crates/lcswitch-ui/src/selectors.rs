//! Language and currency initializers: display state, trigger patching, option lists.

use lcswitch_config::defaults::{CODE_PLACEHOLDER, DEFAULT_LANGUAGE_CHANGE_URL};
use lcswitch_config::{SwitchOption, WidgetConfig, WidgetKind};

use crate::controller::{DropdownController, SELECTED, WidgetParts};
use crate::dom::{Dom, LISTBOX, OPTION, TRIGGER};
use crate::error::WiringError;
use crate::resolver::flag_class;

/// Class of the visible language text.
pub const TEXT_CLASS: &str = "text";
/// Class of the visible currency text.
pub const CURRENCY_TEXT_CLASS: &str = "currency-text";
/// Class of screen-reader-only text.
pub const SR_ONLY_CLASS: &str = "sr-only";
/// Class of the toggle icon.
pub const ARROW_CLASS: &str = "arrow";
/// Class every flag span carries.
pub const FLAG_CLASS: &str = "flag-icon";
/// Class of language navigation links.
pub const LINK_CLASS: &str = "lang-link";

type WiringResult<T> = Result<T, WiringError>;

struct TriggerContent<'a> {
    flag_code: Option<&'a str>,
    text_class: &'static str,
    text: String,
    text_hidden: bool,
    sr_text: String,
    arrow_title: &'static str,
}

/// Wire a `.switch.lang` root: patch its trigger, rebuild its option list.
pub(crate) fn init_language_selector<D: Dom>(
    dom: &mut D,
    index: usize,
    root: D::Node,
    config: WidgetConfig,
) -> WiringResult<DropdownController<D>> {
    let kind = WidgetKind::Language;
    let (trigger, listbox) = locate(dom, &root, kind)?;

    let (code, label) = config.position_of(&config.current_value).map_or_else(
        || {
            (
                config.current_value.clone(),
                config.current_value.to_uppercase(),
            )
        },
        |position| {
            let option = &config.options[position];
            (option.code.clone(), option.label.clone())
        },
    );

    let (display, sr_text) = patch_trigger(
        dom,
        &trigger,
        kind,
        &TriggerContent {
            flag_code: Some(&code),
            text_class: TEXT_CLASS,
            text: config.display_text(&code),
            text_hidden: false,
            sr_text: format!("Current language: {label}"),
            arrow_title: "Open language options",
        },
    )?;

    for child in dom.children(&listbox) {
        dom.remove(&child);
    }
    let template = config
        .navigation_url_template
        .as_deref()
        .unwrap_or(DEFAULT_LANGUAGE_CHANGE_URL);
    let mut items = Vec::with_capacity(config.options.len());
    let mut links = Vec::with_capacity(config.options.len());
    for option in &config.options {
        let selected = option.matches(&code);
        let (item, link) = build_language_option(dom, option, template, selected)?;
        dom.append_child(&listbox, &item);
        items.push(item);
        links.push(Some(link));
    }
    tracing::debug!(
        language = %code,
        options = items.len(),
        "language switcher rendered"
    );

    let parts = WidgetParts {
        root,
        trigger,
        listbox,
        items,
        links,
        display,
        sr_text,
    };
    Ok(DropdownController::new(index, config, parts, code))
}

/// Wire a `.switch.currency` root. The option list comes from the page's
/// `[role=option][data-currency]` items and replaces `config.options`.
pub(crate) fn init_currency_selector<D: Dom>(
    dom: &mut D,
    index: usize,
    root: D::Node,
    mut config: WidgetConfig,
) -> WiringResult<DropdownController<D>> {
    let kind = WidgetKind::Currency;
    let (trigger, listbox) = locate(dom, &root, kind)?;

    let mut items = Vec::new();
    let mut options = Vec::new();
    for item in dom.find_all(&listbox, &OPTION) {
        dom.set_attribute(&item, "tabindex", "-1");
        let Some(code) = dom
            .attribute(&item, kind.code_attribute())
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
        else {
            tracing::warn!("currency option without data-currency ignored");
            continue;
        };
        let label = dom.text(&item).trim().to_string();
        options.push(SwitchOption::new(code, label));
        items.push(item);
    }
    config.options = options;

    let current = config.current_value.clone();
    let selected_position = config.position_of(&current);
    for (position, item) in items.iter().enumerate() {
        let selected = Some(position) == selected_position;
        if selected {
            dom.add_class(item, SELECTED);
        } else {
            dom.remove_class(item, SELECTED);
        }
        dom.set_attribute(item, "aria-selected", if selected { "true" } else { "false" });
    }

    let code = current.to_uppercase();
    let (display, sr_text) = patch_trigger(
        dom,
        &trigger,
        kind,
        &TriggerContent {
            flag_code: None,
            text_class: CURRENCY_TEXT_CLASS,
            text: config.display_text(&current),
            text_hidden: true,
            sr_text: format!("Current currency: {code}"),
            arrow_title: "Open currency options",
        },
    )?;
    tracing::debug!(
        currency = %current,
        options = items.len(),
        "currency switcher rendered"
    );

    let selected_code = selected_position
        .map_or(current, |position| config.options[position].code.clone());
    let links = vec![None; items.len()];
    let parts = WidgetParts {
        root,
        trigger,
        listbox,
        items,
        links,
        display,
        sr_text,
    };
    Ok(DropdownController::new(index, config, parts, selected_code))
}

/// Substitute the URL-encoded code for the first `{CODE}` placeholder.
///
/// Encoding matches `encodeURIComponent`: `!'()*` stay literal.
#[must_use]
pub fn language_href(template: &str, code: &str) -> String {
    template.replacen(CODE_PLACEHOLDER, &encode_component(code), 1)
}

/// Escapes `urlencoding` applies that `encodeURIComponent` does not.
const COMPONENT_SAFE: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

fn encode_component(raw: &str) -> String {
    COMPONENT_SAFE
        .iter()
        .fold(urlencoding::encode(raw).into_owned(), |encoded, (escape, literal)| {
            encoded.replace(escape, literal)
        })
}

/// Static markup of the toggle icon.
#[must_use]
pub fn arrow_markup(title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"18\" height=\"18\" \
         viewBox=\"0 0 18 18\" aria-hidden=\"true\" focusable=\"false\"><title>{title}</title>\
         <g fill=\"currentColor\"><path d=\"M5 8l4 4 4-4z\"></path></g></svg>"
    )
}

fn locate<D: Dom>(dom: &D, root: &D::Node, kind: WidgetKind) -> WiringResult<(D::Node, D::Node)> {
    let trigger = dom
        .find_first(root, &TRIGGER)
        .ok_or(WiringError::MissingTrigger { kind })?;
    let listbox = dom
        .find_first(root, &LISTBOX)
        .ok_or(WiringError::MissingListbox { kind })?;
    Ok((trigger, listbox))
}

fn create<D: Dom>(dom: &mut D, kind: WidgetKind, tag: &'static str) -> WiringResult<D::Node> {
    dom.create_element(tag)
        .ok_or(WiringError::CreateElement { kind, tag })
}

/// Update the trigger in place: kept nodes are reused, everything else is removed, and
/// the result is ordered flag, text, screen-reader text, arrow.
fn patch_trigger<D: Dom>(
    dom: &mut D,
    trigger: &D::Node,
    kind: WidgetKind,
    content: &TriggerContent<'_>,
) -> WiringResult<(D::Node, D::Node)> {
    let children = dom.children(trigger);
    let existing = |class: &str| {
        children
            .iter()
            .find(|child| dom.has_class(child, class))
            .cloned()
    };
    let flag = content.flag_code.and(existing(FLAG_CLASS));
    let text = existing(content.text_class);
    let sr = existing(SR_ONLY_CLASS);
    let arrow = existing(ARROW_CLASS);

    let kept = [&flag, &text, &sr, &arrow];
    for child in &children {
        if !kept.iter().any(|node| node.as_ref() == Some(child)) {
            dom.remove(child);
        }
    }

    let flag = match (content.flag_code, flag) {
        (Some(code), existing) => {
            let node = match existing {
                Some(node) => node,
                None => create(dom, kind, "span")?,
            };
            dom.set_attribute(&node, "class", &flag_class(code));
            Some(node)
        }
        (None, _) => None,
    };

    let text = match text {
        Some(node) => node,
        None => {
            let node = create(dom, kind, "span")?;
            dom.add_class(&node, content.text_class);
            node
        }
    };
    dom.set_text(&text, &content.text);
    if content.text_hidden {
        dom.set_attribute(&text, "aria-hidden", "true");
    }

    let sr = match sr {
        Some(node) => node,
        None => {
            let node = create(dom, kind, "span")?;
            dom.add_class(&node, SR_ONLY_CLASS);
            node
        }
    };
    dom.set_text(&sr, &content.sr_text);

    let arrow = match arrow {
        Some(node) => node,
        None => {
            let node = create(dom, kind, "em")?;
            dom.add_class(&node, ARROW_CLASS);
            dom.set_markup(&node, &arrow_markup(content.arrow_title));
            node
        }
    };

    for node in flag.iter().chain([&text, &sr, &arrow]) {
        dom.append_child(trigger, node);
    }
    Ok((text, sr))
}

fn build_language_option<D: Dom>(
    dom: &mut D,
    option: &SwitchOption,
    template: &str,
    selected: bool,
) -> WiringResult<(D::Node, D::Node)> {
    let kind = WidgetKind::Language;
    let item = create(dom, kind, "li")?;
    dom.set_attribute(&item, "id", &format!("opt-lang-{}", option.code));
    dom.set_attribute(&item, "role", "option");
    dom.set_attribute(&item, kind.code_attribute(), &option.code);
    dom.set_attribute(&item, "aria-selected", if selected { "true" } else { "false" });
    dom.set_attribute(&item, "tabindex", "-1");
    if selected {
        dom.add_class(&item, SELECTED);
    }

    let link = create(dom, kind, "a")?;
    dom.set_attribute(&link, "href", &language_href(template, &option.code));
    dom.add_class(&link, LINK_CLASS);

    let flag = create(dom, kind, "span")?;
    dom.set_attribute(&flag, "class", &flag_class(&option.code));
    let text = create(dom, kind, "span")?;
    dom.add_class(&text, TEXT_CLASS);
    dom.set_text(&text, &option.label);

    dom.append_child(&link, &flag);
    dom.append_child(&link, &text);
    dom.append_child(&item, &link);
    Ok((item, link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryDom, NodeId};

    fn root_with_trigger(dom: &mut MemoryDom, marker: &str) -> (NodeId, NodeId, NodeId) {
        let root = dom.append_element(dom.body(), "div");
        dom.set_attribute(&root, "class", &format!("switch {marker}"));
        let trigger = dom.append_element(root, "button");
        dom.add_class(&trigger, "current");
        let listbox = dom.append_element(root, "ul");
        dom.set_attribute(&listbox, "role", "listbox");
        (root, trigger, listbox)
    }

    fn language_config(current: &str) -> WidgetConfig {
        WidgetConfig {
            kind: WidgetKind::Language,
            current_value: current.into(),
            options: vec![
                SwitchOption::new("sk", "Slovenčina"),
                SwitchOption::new("en", "English"),
            ],
            label_text: None,
            navigation_url_template: Some(DEFAULT_LANGUAGE_CHANGE_URL.into()),
        }
    }

    #[test]
    fn href_substitutes_encoded_code_once() {
        assert_eq!(
            language_href("/Home/ChangeLanguage?code={CODE}", "en"),
            "/Home/ChangeLanguage?code=en"
        );
        assert_eq!(language_href("/l/{CODE}/{CODE}", "a b"), "/l/a%20b/{CODE}");
        assert_eq!(language_href("/static", "en"), "/static");
    }

    #[test]
    fn href_keeps_component_safe_punctuation() {
        assert_eq!(language_href("/l?c={CODE}", "it's(1)*!"), "/l?c=it's(1)*!");
        assert_eq!(language_href("/l?c={CODE}", "a&b=c/d"), "/l?c=a%26b%3Dc%2Fd");
        assert_eq!(language_href("/l?c={CODE}", "zh-Hant_~."), "/l?c=zh-Hant_~.");
    }

    #[test]
    fn language_trigger_is_patched_in_place() -> Result<(), WiringError> {
        let mut dom = MemoryDom::new();
        let (root, trigger, _) = root_with_trigger(&mut dom, "lang");
        let sr = dom.append_element(trigger, "span");
        dom.add_class(&sr, SR_ONLY_CLASS);
        let stray = dom.append_element(trigger, "b");

        let controller = init_language_selector(&mut dom, 0, root, language_config("EN"))?;
        assert_eq!(controller.state().selected_code, "en");

        let children = dom.children(&trigger);
        assert_eq!(children.len(), 4);
        assert_eq!(children[2], sr);
        assert!(!children.contains(&stray));
        assert_eq!(dom.text(&sr), "Current language: English");
        assert!(dom.has_class(&children[0], "flag-icon-gb"));
        assert_eq!(dom.text(&children[1]), "EN");
        assert!(dom.has_class(&children[3], ARROW_CLASS));
        Ok(())
    }

    #[test]
    fn unknown_language_falls_back_to_raw_value() -> Result<(), WiringError> {
        let mut dom = MemoryDom::new();
        let (root, trigger, listbox) = root_with_trigger(&mut dom, "lang");
        let controller = init_language_selector(&mut dom, 0, root, language_config("de"))?;
        assert_eq!(controller.state().selected_code, "de");
        assert!(dom.text(&trigger).contains("Current language: DE"));
        let selected = dom
            .children(&listbox)
            .iter()
            .filter(|item| dom.has_class(item, SELECTED))
            .count();
        assert_eq!(selected, 0);
        Ok(())
    }

    #[test]
    fn missing_listbox_is_reported() {
        let mut dom = MemoryDom::new();
        let root = dom.append_element(dom.body(), "div");
        let trigger = dom.append_element(root, "button");
        dom.add_class(&trigger, "current");
        let result = init_language_selector(&mut dom, 0, root, language_config("sk"));
        assert!(matches!(
            result.err(),
            Some(WiringError::MissingListbox {
                kind: WidgetKind::Language
            })
        ));
    }

    #[test]
    fn currency_options_come_from_the_page() -> Result<(), WiringError> {
        let mut dom = MemoryDom::new();
        let (root, trigger, listbox) = root_with_trigger(&mut dom, "currency");
        for code in ["eur", "usd"] {
            let item = dom.append_element(listbox, "li");
            dom.set_attribute(&item, "role", "option");
            dom.set_attribute(&item, "data-currency", code);
            dom.set_text(&item, &code.to_uppercase());
        }
        let divider = dom.append_element(listbox, "li");
        dom.set_attribute(&divider, "role", "option");

        let config = WidgetConfig {
            kind: WidgetKind::Currency,
            current_value: "USD".into(),
            options: Vec::new(),
            label_text: Some("Mena:".into()),
            navigation_url_template: None,
        };
        let controller = init_currency_selector(&mut dom, 1, root, config)?;
        assert_eq!(controller.state().selected_code, "usd");
        assert_eq!(dom.attribute(&divider, "tabindex").as_deref(), Some("-1"));

        let children = dom.children(&trigger);
        assert_eq!(children.len(), 3);
        assert_eq!(dom.text(&children[0]), "Mena: USD");
        assert_eq!(dom.attribute(&children[0], "aria-hidden").as_deref(), Some("true"));
        assert_eq!(dom.text(&children[1]), "Current currency: USD");
        let items = dom.children(&listbox);
        assert!(dom.has_class(&items[1], SELECTED));
        assert!(!dom.has_class(&items[0], SELECTED));
        Ok(())
    }
}
